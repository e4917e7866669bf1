/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use serde::{Deserialize, Serialize};

use super::SurfaceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationKind {
    WhatsApp,
    Email,
    Calendar,
    Payment,
}

impl IntegrationKind {
    pub const ALL: [IntegrationKind; 4] = [
        IntegrationKind::WhatsApp,
        IntegrationKind::Email,
        IntegrationKind::Calendar,
        IntegrationKind::Payment,
    ];

    pub fn capability_name(self) -> &'static str {
        match self {
            IntegrationKind::WhatsApp => "whatsapp",
            IntegrationKind::Email => "email",
            IntegrationKind::Calendar => "calendar",
            IntegrationKind::Payment => "payment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsAppMessage {
    pub to: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    /// RFC 3339 start time.
    pub starts_at: String,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount_cents: u64,
    pub currency: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub reference: String,
}

/// Outbound third-party integrations (messaging, email, calendar, payments).
pub trait IntegrationSurface: Send + Sync {
    fn supports(&self, kind: IntegrationKind) -> bool;

    /// Confirms the integration is configured. Runs as the probe initializer.
    fn verify(&self, kind: IntegrationKind) -> BoxFuture<'_, Result<(), SurfaceError>> {
        let _ = kind;
        future::ready(Ok(())).boxed()
    }

    fn send_whatsapp_message(
        &self,
        message: WhatsAppMessage,
    ) -> BoxFuture<'_, Result<DeliveryReceipt, SurfaceError>>;
    fn send_email(&self, message: EmailMessage)
    -> BoxFuture<'_, Result<DeliveryReceipt, SurfaceError>>;
    fn create_calendar_event(
        &self,
        event: CalendarEvent,
    ) -> BoxFuture<'_, Result<DeliveryReceipt, SurfaceError>>;
    fn create_payment(
        &self,
        request: PaymentRequest,
    ) -> BoxFuture<'_, Result<DeliveryReceipt, SurfaceError>>;
}

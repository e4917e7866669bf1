/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! In-process console surfaces for the `portalshell` binary.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::surfaces::integrations::{
    CalendarEvent, DeliveryReceipt, EmailMessage, PaymentRequest, WhatsAppMessage,
};
use crate::surfaces::ui::{
    AlertHandle, AlertOptions, CalendarOptions, CardOptions, ChartOptions, ModalHandle,
    ModalOptions, Mountable,
};
use crate::surfaces::{
    AnalyticsCollector, AnalyticsSlot, FeatureSurface, IntegrationKind, IntegrationSurface,
    PlatformCapabilities, PortalSurfaces, SurfaceError, UiSurface,
};

#[derive(Debug, Default)]
pub struct ConsoleUi {
    next_alert: AtomicU64,
}

struct ConsoleModal {
    options: ModalOptions,
}

impl ModalHandle for ConsoleModal {
    fn open(&mut self) -> Result<(), SurfaceError> {
        println!("┌ {} [{:?}]", self.options.title, self.options.tone);
        for line in self.options.body.lines() {
            println!("│ {line}");
        }
        println!("└");
        Ok(())
    }

    fn close(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }
}

struct ConsoleWidget {
    kind: &'static str,
    container: String,
}

impl Mountable for ConsoleWidget {
    fn mount(&mut self) -> Result<(), SurfaceError> {
        log::info!("mounted {} in #{}", self.kind, self.container);
        Ok(())
    }
}

impl UiSurface for ConsoleUi {
    fn show_modal(&self, options: ModalOptions) -> Result<Box<dyn ModalHandle>, SurfaceError> {
        Ok(Box::new(ConsoleModal { options }))
    }

    fn show_alert(&self, options: AlertOptions) -> Result<AlertHandle, SurfaceError> {
        println!("[{:?}] {}: {}", options.tone, options.title, options.message);
        Ok(AlertHandle {
            id: self.next_alert.fetch_add(1, Ordering::Relaxed),
        })
    }

    fn create_card(&self, options: CardOptions) -> Result<(), SurfaceError> {
        log::info!("card `{}` in #{}", options.title, options.container);
        Ok(())
    }

    fn create_chart(&self, options: ChartOptions) -> Result<Box<dyn Mountable>, SurfaceError> {
        Ok(Box::new(ConsoleWidget {
            kind: "chart",
            container: options.container,
        }))
    }

    fn create_calendar(
        &self,
        options: CalendarOptions,
    ) -> Result<Box<dyn Mountable>, SurfaceError> {
        Ok(Box::new(ConsoleWidget {
            kind: "calendar",
            container: options.container,
        }))
    }
}

#[derive(Debug, Default)]
pub struct ConsoleFeatures;

impl FeatureSurface for ConsoleFeatures {
    fn init_dashboard<'a>(&'a self, container: &'a str) -> BoxFuture<'a, Result<(), SurfaceError>> {
        log::info!("dashboard widgets attached to #{container}");
        future::ready(Ok(())).boxed()
    }

    fn init_notifications(&self) -> BoxFuture<'_, Result<(), SurfaceError>> {
        future::ready(Ok(())).boxed()
    }

    fn init_appointment_manager<'a>(
        &'a self,
        container: &'a str,
    ) -> BoxFuture<'a, Result<(), SurfaceError>> {
        log::info!("appointment manager attached to #{container}");
        future::ready(Ok(())).boxed()
    }
}

/// Messaging and email are configured; calendar and payments are not.
#[derive(Debug, Default)]
pub struct ConsoleIntegrations;

impl ConsoleIntegrations {
    fn receipt(kind: IntegrationKind) -> BoxFuture<'static, Result<DeliveryReceipt, SurfaceError>> {
        future::ready(Ok(DeliveryReceipt {
            reference: format!("demo-{}", kind.capability_name()),
        }))
        .boxed()
    }
}

impl IntegrationSurface for ConsoleIntegrations {
    fn supports(&self, kind: IntegrationKind) -> bool {
        !matches!(kind, IntegrationKind::Payment)
    }

    fn verify(&self, kind: IntegrationKind) -> BoxFuture<'_, Result<(), SurfaceError>> {
        let verified = match kind {
            IntegrationKind::Calendar => Err(SurfaceError::new("calendar API key not configured")),
            _ => Ok(()),
        };
        future::ready(verified).boxed()
    }

    fn send_whatsapp_message(
        &self,
        message: WhatsAppMessage,
    ) -> BoxFuture<'_, Result<DeliveryReceipt, SurfaceError>> {
        log::info!("whatsapp to {}", message.to);
        Self::receipt(IntegrationKind::WhatsApp)
    }

    fn send_email(
        &self,
        message: EmailMessage,
    ) -> BoxFuture<'_, Result<DeliveryReceipt, SurfaceError>> {
        log::info!("email to {}: {}", message.to, message.subject);
        Self::receipt(IntegrationKind::Email)
    }

    fn create_calendar_event(
        &self,
        event: CalendarEvent,
    ) -> BoxFuture<'_, Result<DeliveryReceipt, SurfaceError>> {
        log::info!("calendar event `{}` at {}", event.title, event.starts_at);
        Self::receipt(IntegrationKind::Calendar)
    }

    fn create_payment(
        &self,
        request: PaymentRequest,
    ) -> BoxFuture<'_, Result<DeliveryReceipt, SurfaceError>> {
        log::info!("payment of {} {}", request.amount_cents, request.currency);
        Self::receipt(IntegrationKind::Payment)
    }
}

#[derive(Debug, Default)]
pub struct ConsoleAnalytics {
    initialized: AtomicBool,
}

impl ConsoleAnalytics {
    pub fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::Release);
    }
}

impl AnalyticsCollector for ConsoleAnalytics {
    fn initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    fn track_event(&self, name: &str, properties: Value) -> Result<(), SurfaceError> {
        log::info!("analytics event `{name}`: {properties}");
        Ok(())
    }
}

/// A browser with service workers and a manifest but no Notification API.
#[derive(Debug, Default)]
pub struct ConsolePlatform;

impl PlatformCapabilities for ConsolePlatform {
    fn has_service_worker(&self) -> bool {
        true
    }

    fn has_manifest_link(&self) -> bool {
        true
    }

    fn has_notification_api(&self) -> bool {
        false
    }
}

pub fn demo_surfaces() -> PortalSurfaces {
    PortalSurfaces::empty()
        .with_ui(Arc::new(ConsoleUi::default()))
        .with_features(Arc::new(ConsoleFeatures))
        .with_integrations(Arc::new(ConsoleIntegrations))
        .with_platform(Arc::new(ConsolePlatform))
}

/// Attaches analytics after `delay`, the way an independently loaded
/// tracking script would.
pub fn attach_analytics_later(slot: AnalyticsSlot, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let collector = Arc::new(ConsoleAnalytics::default());
        collector.mark_initialized();
        slot.attach(collector);
        log::debug!("analytics attached after {} ms", delay.as_millis());
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::PortalPreferences;
    use crate::shell::portal::runtime::orchestrator::PortalOrchestrator;
    use crate::shell::portal::runtime::phases::{Phase, ProbeStatus};

    #[tokio::test(start_paused = true)]
    async fn demo_host_runs_to_completion() {
        let surfaces = demo_surfaces();
        let attach = attach_analytics_later(surfaces.analytics.clone(), Duration::from_millis(150));
        let mut orchestrator =
            PortalOrchestrator::with_standard_catalog(surfaces, PortalPreferences::default())
                .unwrap();

        let outcome = orchestrator.initialize_portal().await;
        attach.await.unwrap();

        let report = outcome.report().unwrap();
        let integrations = report.phase(Phase::Integrations).unwrap();
        assert_eq!(
            integrations.result("calendar").unwrap().status,
            ProbeStatus::Error("calendar API key not configured".to_string())
        );
        assert_eq!(
            integrations.result("payment").unwrap().status,
            ProbeStatus::Failed
        );
        assert!(report.probe_succeeded(Phase::Analytics, "page_view"));
        assert_eq!(report.stats.total_components, 17);
        assert_eq!(report.stats.success_components, 14);
    }
}

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Recording surface fakes shared by unit and scenario tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use parking_lot::Mutex;
use serde_json::Value;

use crate::surfaces::integrations::{
    CalendarEvent, DeliveryReceipt, EmailMessage, PaymentRequest, WhatsAppMessage,
};
use crate::surfaces::ui::{
    AlertHandle, AlertOptions, CalendarOptions, CardOptions, ChartOptions, ModalHandle,
    ModalOptions, Mountable,
};
use crate::surfaces::{
    AnalyticsCollector, FallbackAlert, FeatureSurface, IntegrationKind, IntegrationSurface,
    PlatformCapabilities, SurfaceError, UiComponent, UiSurface,
};

type CallLog = Arc<Mutex<Vec<String>>>;

/// UI surface that records every call as `"<what>:<detail>"`.
#[derive(Default)]
pub struct RecordingUi {
    calls: CallLog,
    alerts: Mutex<Vec<AlertOptions>>,
    unsupported: Vec<UiComponent>,
    fail_modal: bool,
    panic_on_supports: bool,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without(mut self, component: UiComponent) -> Self {
        self.unsupported.push(component);
        self
    }

    pub fn failing_modal(mut self) -> Self {
        self.fail_modal = true;
        self
    }

    pub fn panicking_supports(mut self) -> Self {
        self.panic_on_supports = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn alerts(&self) -> Vec<AlertOptions> {
        self.alerts.lock().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }
}

struct RecordingHandle {
    name: &'static str,
    calls: CallLog,
}

impl ModalHandle for RecordingHandle {
    fn open(&mut self) -> Result<(), SurfaceError> {
        self.calls.lock().push(format!("{}:open", self.name));
        Ok(())
    }

    fn close(&mut self) -> Result<(), SurfaceError> {
        self.calls.lock().push(format!("{}:close", self.name));
        Ok(())
    }
}

impl Mountable for RecordingHandle {
    fn mount(&mut self) -> Result<(), SurfaceError> {
        self.calls.lock().push(format!("mount:{}", self.name));
        Ok(())
    }
}

impl UiSurface for RecordingUi {
    fn supports(&self, component: UiComponent) -> bool {
        if self.panic_on_supports {
            panic!("ui bundle threw");
        }
        !self.unsupported.contains(&component)
    }

    fn install(&self, component: UiComponent) -> Result<(), SurfaceError> {
        self.record(format!("install:{}", component.capability_name()));
        Ok(())
    }

    fn show_modal(&self, _options: ModalOptions) -> Result<Box<dyn ModalHandle>, SurfaceError> {
        if self.fail_modal {
            return Err(SurfaceError::new("modal root missing"));
        }
        self.record("modal:show");
        Ok(Box::new(RecordingHandle {
            name: "modal",
            calls: Arc::clone(&self.calls),
        }))
    }

    fn show_alert(&self, options: AlertOptions) -> Result<AlertHandle, SurfaceError> {
        self.record(format!("alert:{}", options.title));
        let mut alerts = self.alerts.lock();
        alerts.push(options);
        Ok(AlertHandle {
            id: alerts.len() as u64,
        })
    }

    fn create_card(&self, options: CardOptions) -> Result<(), SurfaceError> {
        self.record(format!("card:{}", options.container));
        Ok(())
    }

    fn create_chart(&self, options: ChartOptions) -> Result<Box<dyn Mountable>, SurfaceError> {
        self.record(format!("chart:{}", options.container));
        Ok(Box::new(RecordingHandle {
            name: "chart",
            calls: Arc::clone(&self.calls),
        }))
    }

    fn create_calendar(
        &self,
        options: CalendarOptions,
    ) -> Result<Box<dyn Mountable>, SurfaceError> {
        self.record(format!("calendar:{}", options.container));
        Ok(Box::new(RecordingHandle {
            name: "calendar",
            calls: Arc::clone(&self.calls),
        }))
    }
}

#[derive(Default)]
pub struct RecordingFeatures {
    containers: Mutex<Vec<String>>,
    notifications_error: Option<String>,
}

impl RecordingFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_notifications(mut self, message: &str) -> Self {
        self.notifications_error = Some(message.to_string());
        self
    }

    pub fn containers(&self) -> Vec<String> {
        self.containers.lock().clone()
    }
}

impl FeatureSurface for RecordingFeatures {
    fn init_dashboard<'a>(&'a self, container: &'a str) -> BoxFuture<'a, Result<(), SurfaceError>> {
        self.containers.lock().push(container.to_string());
        future::ready(Ok(())).boxed()
    }

    fn init_notifications(&self) -> BoxFuture<'_, Result<(), SurfaceError>> {
        let result = match &self.notifications_error {
            Some(message) => Err(SurfaceError::new(message.clone())),
            None => Ok(()),
        };
        future::ready(result).boxed()
    }

    fn init_appointment_manager<'a>(
        &'a self,
        container: &'a str,
    ) -> BoxFuture<'a, Result<(), SurfaceError>> {
        self.containers.lock().push(container.to_string());
        future::ready(Ok(())).boxed()
    }
}

/// Integration surface supporting a fixed set of kinds.
pub struct RecordingIntegrations {
    supported: Vec<IntegrationKind>,
    verified: Mutex<Vec<IntegrationKind>>,
}

impl RecordingIntegrations {
    pub fn supporting(supported: &[IntegrationKind]) -> Self {
        Self {
            supported: supported.to_vec(),
            verified: Mutex::new(Vec::new()),
        }
    }

    pub fn verified(&self) -> Vec<IntegrationKind> {
        self.verified.lock().clone()
    }

    fn receipt(reference: &str) -> BoxFuture<'static, Result<DeliveryReceipt, SurfaceError>> {
        future::ready(Ok(DeliveryReceipt {
            reference: reference.to_string(),
        }))
        .boxed()
    }
}

impl IntegrationSurface for RecordingIntegrations {
    fn supports(&self, kind: IntegrationKind) -> bool {
        self.supported.contains(&kind)
    }

    fn verify(&self, kind: IntegrationKind) -> BoxFuture<'_, Result<(), SurfaceError>> {
        self.verified.lock().push(kind);
        future::ready(Ok(())).boxed()
    }

    fn send_whatsapp_message(
        &self,
        _message: WhatsAppMessage,
    ) -> BoxFuture<'_, Result<DeliveryReceipt, SurfaceError>> {
        Self::receipt("whatsapp")
    }

    fn send_email(
        &self,
        _message: EmailMessage,
    ) -> BoxFuture<'_, Result<DeliveryReceipt, SurfaceError>> {
        Self::receipt("email")
    }

    fn create_calendar_event(
        &self,
        _event: CalendarEvent,
    ) -> BoxFuture<'_, Result<DeliveryReceipt, SurfaceError>> {
        Self::receipt("calendar")
    }

    fn create_payment(
        &self,
        _request: PaymentRequest,
    ) -> BoxFuture<'_, Result<DeliveryReceipt, SurfaceError>> {
        Self::receipt("payment")
    }
}

#[derive(Default)]
pub struct RecordingAnalytics {
    initialized: AtomicBool,
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingAnalytics {
    pub fn ready() -> Self {
        let analytics = Self::default();
        analytics.mark_initialized();
        analytics
    }

    pub fn uninitialized() -> Self {
        Self::default()
    }

    pub fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().clone()
    }
}

impl AnalyticsCollector for RecordingAnalytics {
    fn initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn track_event(&self, name: &str, properties: Value) -> Result<(), SurfaceError> {
        self.events.lock().push((name.to_string(), properties));
        Ok(())
    }
}

/// Collector whose readiness check panics.
pub struct PanickingAnalytics;

impl AnalyticsCollector for PanickingAnalytics {
    fn initialized(&self) -> bool {
        panic!("analytics script crashed")
    }

    fn track_event(&self, _name: &str, _properties: Value) -> Result<(), SurfaceError> {
        Ok(())
    }
}

/// Ready collector whose `track_event` panics.
pub struct PanickingTracker;

impl AnalyticsCollector for PanickingTracker {
    fn initialized(&self) -> bool {
        true
    }

    fn track_event(&self, _name: &str, _properties: Value) -> Result<(), SurfaceError> {
        panic!("tracker threw")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPlatform {
    pub service_worker: bool,
    pub manifest_link: bool,
    pub notification_api: bool,
}

impl PlatformCapabilities for StaticPlatform {
    fn has_service_worker(&self) -> bool {
        self.service_worker
    }

    fn has_manifest_link(&self) -> bool {
        self.manifest_link
    }

    fn has_notification_api(&self) -> bool {
        self.notification_api
    }
}

#[derive(Default)]
pub struct RecordingAlertSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlertSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl FallbackAlert for RecordingAlertSink {
    fn alert(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

pub struct PanickingAlertSink;

impl FallbackAlert for PanickingAlertSink {
    fn alert(&self, _message: &str) {
        panic!("alert() is not defined")
    }
}

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Initialization report: statistics, telemetry, and summary rendering.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::registries::infrastructure::probe::panic_message;
use crate::shell::portal::runtime::channels::{
    CHANNEL_REPORT_ALERT_SHOWN, CHANNEL_REPORT_FALLBACK_USED, CHANNEL_REPORT_MODAL_SHOWN,
    CHANNEL_TELEMETRY_FAILED, CHANNEL_TELEMETRY_SENT, CHANNEL_TELEMETRY_SKIPPED,
};
use crate::shell::portal::runtime::diagnostics::emit_message;
use crate::shell::portal::runtime::orchestrator::PortalInitError;
use crate::shell::portal::runtime::phases::{Phase, PhaseReport, ProbeStatus};
use crate::surfaces::ui::{AlertAction, AlertOptions, ModalOptions, Tone};
use crate::surfaces::{AnalyticsSlot, PortalSurfaces, UiComponent};

const ALERT_DISMISS_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct InitializationStats {
    pub init_time_ms: u64,
    pub total_components: usize,
    pub success_components: usize,
    pub failed_components: usize,
    pub errored_components: usize,
    pub not_supported_components: usize,
    pub success_rate: f64,
}

impl InitializationStats {
    pub fn from_reports(reports: &[PhaseReport], init_time: Duration) -> Self {
        let mut stats = Self {
            init_time_ms: init_time.as_millis() as u64,
            ..Self::default()
        };
        for result in reports.iter().flat_map(|report| &report.results) {
            stats.total_components += 1;
            match result.status {
                ProbeStatus::Success => stats.success_components += 1,
                ProbeStatus::Failed => stats.failed_components += 1,
                ProbeStatus::Error(_) => stats.errored_components += 1,
                ProbeStatus::NotSupported => stats.not_supported_components += 1,
            }
        }
        stats.success_rate = if stats.total_components == 0 {
            1.0
        } else {
            stats.success_components as f64 / stats.total_components as f64
        };
        stats
    }

    pub fn success_percent(&self) -> f64 {
        self.success_rate * 100.0
    }

    pub fn tone(&self, success_threshold: f64) -> Tone {
        if self.success_rate >= success_threshold {
            Tone::Success
        } else {
            Tone::Warning
        }
    }

    pub fn summary_text(&self) -> String {
        if self.total_components == 0 {
            return format!(
                "No components to initialize (finished in {} ms)",
                self.init_time_ms
            );
        }
        format!(
            "{}/{} components ready ({:.1}%) in {} ms",
            self.success_components,
            self.total_components,
            self.success_percent(),
            self.init_time_ms
        )
    }
}

/// Outcome of a completed run, kept for on-demand display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializationReport {
    pub run_id: Uuid,
    /// RFC 3339 completion timestamp.
    pub completed_at: String,
    pub phases: Vec<PhaseReport>,
    pub stats: InitializationStats,
}

impl InitializationReport {
    pub fn new(phases: Vec<PhaseReport>, init_time: Duration) -> Self {
        let stats = InitializationStats::from_reports(&phases, init_time);
        let completed_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        Self {
            run_id: Uuid::new_v4(),
            completed_at,
            phases,
            stats,
        }
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases.iter().find(|report| report.phase == phase)
    }

    /// Whether the named probe of `phase` succeeded.
    pub fn probe_succeeded(&self, phase: Phase, name: &str) -> bool {
        self.phase(phase)
            .and_then(|report| report.result(name))
            .is_some_and(|result| result.status.is_success())
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn telemetry_properties(&self) -> Value {
        json!({
            "run_id": self.run_id.to_string(),
            "init_time_ms": self.stats.init_time_ms,
            "total_components": self.stats.total_components,
            "success_components": self.stats.success_components,
            "failed_components": self.stats.failed_components,
            "errored_components": self.stats.errored_components,
            "not_supported_components": self.stats.not_supported_components,
            "success_rate": self.stats.success_rate,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryOutcome {
    Sent,
    /// No collector attached, or attached but not initialized.
    Skipped,
    Failed(String),
}

pub fn emit_telemetry(
    analytics: &AnalyticsSlot,
    event_name: &str,
    report: &InitializationReport,
) -> TelemetryOutcome {
    let Some(collector) = analytics.get().filter(|collector| collector.initialized()) else {
        log::debug!("analytics unavailable; skipping `{event_name}` telemetry");
        emit_message(CHANNEL_TELEMETRY_SKIPPED, event_name);
        return TelemetryOutcome::Skipped;
    };

    match collector.track_event(event_name, report.telemetry_properties()) {
        Ok(()) => {
            emit_message(CHANNEL_TELEMETRY_SENT, event_name);
            TelemetryOutcome::Sent
        }
        Err(error) => {
            log::warn!("failed to send `{event_name}` telemetry: {error}");
            emit_message(CHANNEL_TELEMETRY_FAILED, event_name);
            TelemetryOutcome::Failed(error.to_string())
        }
    }
}

/// Which presentation tier displayed a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationTier {
    Modal,
    Alert,
    Fallback,
}

fn try_modal(surfaces: &PortalSurfaces, options: ModalOptions) -> Result<(), String> {
    let ui = surfaces.ui.as_ref().ok_or("ui surface detached")?;
    let shown = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut modal = ui.show_modal(options).map_err(|error| error.to_string())?;
        modal.open().map_err(|error| error.to_string())
    }));
    shown.unwrap_or_else(|payload| Err(panic_message(payload.as_ref())))
}

fn try_alert(surfaces: &PortalSurfaces, options: AlertOptions) -> Result<(), String> {
    let ui = surfaces.ui.as_ref().ok_or("ui surface detached")?;
    let shown = panic::catch_unwind(AssertUnwindSafe(|| {
        ui.show_alert(options)
            .map(|_| ())
            .map_err(|error| error.to_string())
    }));
    shown.unwrap_or_else(|payload| Err(panic_message(payload.as_ref())))
}

fn use_fallback(surfaces: &PortalSurfaces, message: &str) {
    let shown = panic::catch_unwind(AssertUnwindSafe(|| surfaces.fallback_alert.alert(message)));
    if let Err(payload) = shown {
        log::warn!(
            "fallback alert panicked: {}",
            panic_message(payload.as_ref())
        );
    }
}

/// Shows the completion summary through the best tier the run confirmed:
/// modal, then alert, then the fallback sink.
pub fn present_summary(
    surfaces: &PortalSurfaces,
    report: &InitializationReport,
    success_threshold: f64,
) -> PresentationTier {
    let tone = report.stats.tone(success_threshold);
    let title = match tone {
        Tone::Success => "Portal ready",
        _ => "Portal started with issues",
    };
    let summary = report.stats.summary_text();

    if report.probe_succeeded(Phase::Components, UiComponent::Modal.capability_name()) {
        let options = ModalOptions {
            title: title.to_string(),
            body: DetailsView::from_report(report).render_text(),
            tone,
            actions: vec![AlertAction::Dismiss],
        };
        match try_modal(surfaces, options) {
            Ok(()) => {
                emit_message(CHANNEL_REPORT_MODAL_SHOWN, &summary);
                return PresentationTier::Modal;
            }
            Err(error) => log::warn!("summary modal failed, falling back to alert: {error}"),
        }
    }

    if report.probe_succeeded(Phase::Components, UiComponent::Alert.capability_name()) {
        let options = AlertOptions {
            title: title.to_string(),
            message: summary.clone(),
            tone,
            actions: vec![AlertAction::ShowDetails],
            dismiss_after: Some(ALERT_DISMISS_AFTER),
        };
        match try_alert(surfaces, options) {
            Ok(()) => {
                emit_message(CHANNEL_REPORT_ALERT_SHOWN, &summary);
                return PresentationTier::Alert;
            }
            Err(error) => log::warn!("summary alert failed, using fallback: {error}"),
        }
    }

    use_fallback(surfaces, &format!("{title}: {summary}"));
    emit_message(CHANNEL_REPORT_FALLBACK_USED, &summary);
    PresentationTier::Fallback
}

/// Shows a run-level failure with reload and details actions.
pub fn present_error(surfaces: &PortalSurfaces, error: &PortalInitError) -> PresentationTier {
    let message = format!("The portal could not finish starting: {error}");
    let alert_available = surfaces.ui.as_ref().is_some_and(|ui| {
        panic::catch_unwind(AssertUnwindSafe(|| ui.supports(UiComponent::Alert))).unwrap_or(false)
    });

    if alert_available {
        let options = AlertOptions {
            title: "Initialization error".to_string(),
            message: message.clone(),
            tone: Tone::Error,
            actions: vec![AlertAction::Reload, AlertAction::ShowDetails],
            dismiss_after: None,
        };
        match try_alert(surfaces, options) {
            Ok(()) => {
                emit_message(CHANNEL_REPORT_ALERT_SHOWN, &message);
                return PresentationTier::Alert;
            }
            Err(alert_error) => log::warn!("error alert failed, using fallback: {alert_error}"),
        }
    }

    use_fallback(surfaces, &message);
    emit_message(CHANNEL_REPORT_FALLBACK_USED, &message);
    PresentationTier::Fallback
}

/// Per-phase breakdown of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailsView {
    NotInitialized,
    Ready {
        phases: Vec<PhaseReport>,
        stats: InitializationStats,
    },
}

impl DetailsView {
    pub fn from_report(report: &InitializationReport) -> Self {
        DetailsView::Ready {
            phases: report.phases.clone(),
            stats: report.stats,
        }
    }

    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DetailsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let DetailsView::Ready { phases, stats } = self else {
            return f.write_str("Portal not initialized yet");
        };

        writeln!(f, "Portal initialization details")?;
        for report in phases {
            writeln!(
                f,
                "{}: {}/{} passed ({} ms)",
                report.phase.title(),
                report.passed(),
                report.results.len(),
                report.elapsed.as_millis()
            )?;
            for result in &report.results {
                match &result.status {
                    ProbeStatus::Error(message) => writeln!(
                        f,
                        "  {} {}: {message}",
                        result.status.icon(),
                        result.name
                    )?,
                    status => writeln!(f, "  {} {}", status.icon(), result.name)?,
                }
            }
        }
        write!(f, "{}", stats.summary_text())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;
    use crate::shell::portal::runtime::phases::ProbeResult;
    use crate::test_utils::{
        PanickingAlertSink, RecordingAlertSink, RecordingAnalytics, RecordingUi,
    };

    fn phase(phase: Phase, statuses: &[(&str, ProbeStatus)], elapsed_ms: u64) -> PhaseReport {
        PhaseReport {
            phase,
            results: statuses
                .iter()
                .map(|(name, status)| ProbeResult::new(*name, status.clone()))
                .collect(),
            elapsed: Duration::from_millis(elapsed_ms),
        }
    }

    fn components(modal: ProbeStatus, alert: ProbeStatus) -> InitializationReport {
        InitializationReport::new(
            vec![phase(
                Phase::Components,
                &[("modal", modal), ("alert", alert)],
                3,
            )],
            Duration::from_millis(40),
        )
    }

    fn status_strategy() -> impl Strategy<Value = ProbeStatus> {
        prop_oneof![
            Just(ProbeStatus::Success),
            Just(ProbeStatus::Failed),
            "[a-z ]{1,12}".prop_map(ProbeStatus::Error),
            Just(ProbeStatus::NotSupported),
        ]
    }

    proptest! {
        #[test]
        fn counts_partition_the_total(
            outcomes in proptest::collection::vec(proptest::collection::vec(status_strategy(), 0..6), 0..5)
        ) {
            let reports = outcomes
                .into_iter()
                .enumerate()
                .map(|(index, statuses)| PhaseReport {
                    phase: Phase::ORDER[index % Phase::ORDER.len()],
                    results: statuses
                        .into_iter()
                        .enumerate()
                        .map(|(probe, status)| ProbeResult::new(format!("probe-{probe}"), status))
                        .collect(),
                    elapsed: Duration::ZERO,
                })
                .collect::<Vec<_>>();
            let expected_total = reports.iter().map(|report| report.results.len()).sum::<usize>();

            let stats = InitializationStats::from_reports(&reports, Duration::ZERO);

            prop_assert_eq!(stats.total_components, expected_total);
            prop_assert_eq!(
                stats.total_components,
                stats.success_components
                    + stats.failed_components
                    + stats.errored_components
                    + stats.not_supported_components
            );
            prop_assert!((0.0..=1.0).contains(&stats.success_rate));
        }
    }

    #[test]
    fn success_rate_is_successes_over_total() {
        let reports = vec![phase(
            Phase::Components,
            &[
                ("modal", ProbeStatus::Success),
                ("alert", ProbeStatus::Failed),
                ("card", ProbeStatus::Success),
            ],
            0,
        )];
        let stats = InitializationStats::from_reports(&reports, Duration::from_millis(12));

        assert!((stats.success_rate - 2.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(stats.summary_text(), "2/3 components ready (66.7%) in 12 ms");
        assert_eq!(stats.tone(0.8), Tone::Warning);
        assert_eq!(stats.tone(0.5), Tone::Success);
    }

    #[test]
    fn zero_components_is_full_success() {
        let stats = InitializationStats::from_reports(&[], Duration::from_millis(3));
        assert_eq!(stats.total_components, 0);
        assert_eq!(stats.success_rate, 1.0);
        assert_eq!(stats.tone(0.8), Tone::Success);
        assert_eq!(stats.summary_text(), "No components to initialize (finished in 3 ms)");
    }

    #[test]
    fn telemetry_requires_an_initialized_collector() {
        let report = components(ProbeStatus::Success, ProbeStatus::Success);

        let slot = AnalyticsSlot::empty();
        assert_eq!(
            emit_telemetry(&slot, "portal_initialized", &report),
            TelemetryOutcome::Skipped
        );

        let collector = Arc::new(RecordingAnalytics::uninitialized());
        slot.attach(collector.clone());
        assert_eq!(
            emit_telemetry(&slot, "portal_initialized", &report),
            TelemetryOutcome::Skipped
        );
        assert!(collector.events().is_empty());

        collector.mark_initialized();
        assert_eq!(
            emit_telemetry(&slot, "portal_initialized", &report),
            TelemetryOutcome::Sent
        );
        let events = collector.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "portal_initialized");
        assert_eq!(events[0].1["total_components"], 2);
        assert_eq!(events[0].1["success_rate"], 1.0);
    }

    #[test]
    fn summary_prefers_modal_when_confirmed() {
        let ui = Arc::new(RecordingUi::new());
        let sink = Arc::new(RecordingAlertSink::default());
        let surfaces = PortalSurfaces::empty()
            .with_ui(ui.clone())
            .with_fallback_alert(sink.clone());

        let report = components(ProbeStatus::Success, ProbeStatus::Success);
        assert_eq!(present_summary(&surfaces, &report, 0.8), PresentationTier::Modal);
        assert!(ui.calls().contains(&"modal:open".to_string()));
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn failing_modal_falls_through_to_alert() {
        let ui = Arc::new(RecordingUi::new().failing_modal());
        let surfaces = PortalSurfaces::empty().with_ui(ui.clone());

        let report = components(ProbeStatus::Success, ProbeStatus::Success);
        assert_eq!(present_summary(&surfaces, &report, 0.8), PresentationTier::Alert);
        assert_eq!(ui.alerts()[0].actions, vec![AlertAction::ShowDetails]);
    }

    #[test]
    fn unconfirmed_components_use_the_fallback_sink() {
        let ui = Arc::new(RecordingUi::new());
        let sink = Arc::new(RecordingAlertSink::default());
        let surfaces = PortalSurfaces::empty()
            .with_ui(ui.clone())
            .with_fallback_alert(sink.clone());

        let report = components(ProbeStatus::Failed, ProbeStatus::Error("no css".into()));
        assert_eq!(
            present_summary(&surfaces, &report, 0.8),
            PresentationTier::Fallback
        );
        assert!(ui.calls().is_empty());
        assert_eq!(
            sink.messages(),
            vec!["Portal started with issues: 0/2 components ready (0.0%) in 40 ms"]
        );
    }

    #[test]
    fn run_errors_offer_reload_and_details() {
        let ui = Arc::new(RecordingUi::new());
        let surfaces = PortalSurfaces::empty().with_ui(ui.clone());
        let error = PortalInitError::RegistryUnavailable {
            phase: Phase::Integrations,
        };

        assert_eq!(present_error(&surfaces, &error), PresentationTier::Alert);
        let alert = &ui.alerts()[0];
        assert_eq!(alert.tone, Tone::Error);
        assert_eq!(
            alert.actions,
            vec![AlertAction::Reload, AlertAction::ShowDetails]
        );
        assert_eq!(alert.dismiss_after, None);
    }

    #[test]
    fn error_presentation_survives_panicking_surfaces() {
        let ui = Arc::new(RecordingUi::new().panicking_supports());
        let surfaces = PortalSurfaces::empty()
            .with_ui(ui.clone())
            .with_fallback_alert(Arc::new(PanickingAlertSink));
        let error = PortalInitError::AlreadyStarted;

        assert_eq!(present_error(&surfaces, &error), PresentationTier::Fallback);
        assert!(ui.alerts().is_empty());

        let report = components(ProbeStatus::Failed, ProbeStatus::Failed);
        assert_eq!(
            present_summary(&surfaces, &report, 0.8),
            PresentationTier::Fallback
        );
    }

    #[test]
    fn details_group_results_by_phase() {
        let reports = vec![
            phase(
                Phase::Components,
                &[
                    ("modal", ProbeStatus::Success),
                    ("chart", ProbeStatus::Error("mount failed".into())),
                ],
                4,
            ),
            phase(
                Phase::Pwa,
                &[
                    ("manifest", ProbeStatus::Failed),
                    ("notifications", ProbeStatus::NotSupported),
                ],
                1,
            ),
        ];
        let view = DetailsView::Ready {
            stats: InitializationStats::from_reports(&reports, Duration::from_millis(25)),
            phases: reports,
        };

        insta::assert_snapshot!(view.render_text(), @r"
        Portal initialization details
        UI components: 1/2 passed (4 ms)
          ✓ modal
          ⚠ chart: mount failed
        PWA: 0/2 passed (1 ms)
          ✗ manifest
          – notifications
        1/4 components ready (25.0%) in 25 ms
        ");
        assert_eq!(
            DetailsView::NotInitialized.render_text(),
            "Portal not initialized yet"
        );
    }
}

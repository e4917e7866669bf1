/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Portal initialization orchestrator.
//!
//! Drives the phases in order against a [`RegistrySet`], collects one
//! [`PhaseReport`] per phase and hands the result to the report emitter.
//! Probe failures are data; only run-level failures abort a run.

use futures_util::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tokio::time::Instant;

use crate::prefs::PortalPreferences;
use crate::registries::atomic::capability::RegistrationError;
use crate::registries::infrastructure::catalog::RegistrySet;
use crate::registries::infrastructure::probe::{panic_message, run_registry};
use crate::shell::portal::runtime::channels::{CHANNEL_RUN_COMPLETED, CHANNEL_RUN_FAILED};
use crate::shell::portal::runtime::diagnostics::{emit_message, emit_span_duration};
use crate::shell::portal::runtime::phases::{Phase, PhaseReport, RunState};
use crate::shell::portal::runtime::readiness::ReadinessBudget;
use crate::shell::portal::runtime::report::{
    DetailsView, InitializationReport, InitializationStats, PresentationTier, TelemetryOutcome,
    emit_telemetry, present_error, present_summary,
};
use crate::surfaces::PortalSurfaces;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalInitError {
    #[error("{phase} registry is unavailable")]
    RegistryUnavailable { phase: Phase },
    #[error("{phase} phase panicked: {message}")]
    PhasePanicked { phase: RunState, message: String },
    #[error("portal initialization already started")]
    AlreadyStarted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InitializationOutcome {
    Completed(InitializationReport),
    Aborted(PortalInitError),
}

impl InitializationOutcome {
    pub fn report(&self) -> Option<&InitializationReport> {
        match self {
            InitializationOutcome::Completed(report) => Some(report),
            InitializationOutcome::Aborted(_) => None,
        }
    }

    pub fn error(&self) -> Option<&PortalInitError> {
        match self {
            InitializationOutcome::Completed(_) => None,
            InitializationOutcome::Aborted(error) => Some(error),
        }
    }
}

pub struct PortalOrchestrator {
    registries: RegistrySet,
    surfaces: PortalSurfaces,
    prefs: PortalPreferences,
    state: RunState,
    started: bool,
    phase_reports: Vec<PhaseReport>,
    report: Option<InitializationReport>,
    last_error: Option<PortalInitError>,
    telemetry: Option<TelemetryOutcome>,
    presentation: Option<PresentationTier>,
}

impl PortalOrchestrator {
    pub fn new(registries: RegistrySet, surfaces: PortalSurfaces, prefs: PortalPreferences) -> Self {
        Self {
            registries,
            surfaces,
            prefs,
            state: RunState::Idle,
            started: false,
            phase_reports: Vec::new(),
            report: None,
            last_error: None,
            telemetry: None,
            presentation: None,
        }
    }

    /// Orchestrator over the standard catalog built from `surfaces`.
    pub fn with_standard_catalog(
        surfaces: PortalSurfaces,
        prefs: PortalPreferences,
    ) -> Result<Self, RegistrationError> {
        let registries = RegistrySet::standard(&surfaces, &prefs)?;
        Ok(Self::new(registries, surfaces, prefs))
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn report(&self) -> Option<&InitializationReport> {
        self.report.as_ref()
    }

    pub fn stats(&self) -> Option<InitializationStats> {
        self.report.as_ref().map(|report| report.stats)
    }

    pub fn last_error(&self) -> Option<&PortalInitError> {
        self.last_error.as_ref()
    }

    pub fn telemetry(&self) -> Option<&TelemetryOutcome> {
        self.telemetry.as_ref()
    }

    pub fn presentation(&self) -> Option<PresentationTier> {
        self.presentation
    }

    pub fn registries_mut(&mut self) -> &mut RegistrySet {
        &mut self.registries
    }

    pub fn preferences(&self) -> &PortalPreferences {
        &self.prefs
    }

    /// Runs every phase once and presents the result.
    ///
    /// A second call returns [`PortalInitError::AlreadyStarted`] and leaves
    /// the first run's state and report untouched.
    pub async fn initialize_portal(&mut self) -> InitializationOutcome {
        if self.started {
            log::warn!("initialize_portal called again; ignoring");
            return InitializationOutcome::Aborted(PortalInitError::AlreadyStarted);
        }
        self.started = true;
        log::info!("initializing portal");
        let started = Instant::now();

        let run = AssertUnwindSafe(self.run_phases()).catch_unwind().await;
        let result = match run {
            Ok(result) => result,
            Err(payload) => Err(PortalInitError::PhasePanicked {
                phase: self.state,
                message: panic_message(payload.as_ref()),
            }),
        };

        let result = result.and_then(|()| {
            panic::catch_unwind(AssertUnwindSafe(|| self.finalize(started))).map_err(|payload| {
                PortalInitError::PhasePanicked {
                    phase: RunState::Finalizing,
                    message: panic_message(payload.as_ref()),
                }
            })
        });

        match result {
            Ok(report) => InitializationOutcome::Completed(report),
            Err(error) => {
                self.fail(&error);
                InitializationOutcome::Aborted(error)
            }
        }
    }

    async fn run_phases(&mut self) -> Result<(), PortalInitError> {
        for phase in Phase::ORDER {
            self.state = phase.state();
            let report = self.run_phase(phase).await?;
            self.phase_reports.push(report);
        }
        Ok(())
    }

    /// Runs a single phase against its registry.
    pub async fn run_phase(&self, phase: Phase) -> Result<PhaseReport, PortalInitError> {
        let registry = self
            .registries
            .registry(phase)
            .ok_or(PortalInitError::RegistryUnavailable { phase })?;

        if phase == Phase::Analytics {
            let analytics = self.surfaces.analytics.clone();
            ReadinessBudget::from_preferences(&self.prefs)
                .wait("analytics", || analytics.is_ready())
                .await;
        }

        let probes = run_registry(phase, registry);
        #[cfg(feature = "tracing")]
        let probes = tracing::Instrument::instrument(
            probes,
            tracing::info_span!("portal_phase", phase = phase.label()),
        );
        Ok(probes.await)
    }

    fn finalize(&mut self, started: Instant) -> InitializationReport {
        self.state = RunState::Finalizing;
        let phases = std::mem::take(&mut self.phase_reports);
        let report = InitializationReport::new(phases, started.elapsed());

        self.telemetry = Some(emit_telemetry(
            &self.surfaces.analytics,
            &self.prefs.telemetry_event,
            &report,
        ));
        self.presentation = Some(present_summary(
            &self.surfaces,
            &report,
            self.prefs.success_threshold,
        ));

        let summary = report.stats.summary_text();
        log::info!("portal initialized: {summary}");
        emit_message(CHANNEL_RUN_COMPLETED, &summary);
        emit_span_duration("portal.run", started.elapsed().as_micros() as u64);

        self.report = Some(report.clone());
        self.state = RunState::Complete;
        report
    }

    fn fail(&mut self, error: &PortalInitError) {
        log::error!("portal initialization failed: {error}");
        self.state = RunState::Error;
        emit_message(CHANNEL_RUN_FAILED, &error.to_string());
        self.presentation = Some(present_error(&self.surfaces, error));
        self.last_error = Some(error.clone());
    }

    /// Per-phase breakdown of the stored report.
    pub fn show_initialization_details(&self) -> DetailsView {
        match &self.report {
            Some(report) => DetailsView::from_report(report),
            None => DetailsView::NotInitialized,
        }
    }
}

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Staged bootstrap orchestrator for the clinic portal.
//!
//! The portal's optional subsystems (UI components, professional features,
//! third-party integrations, analytics and PWA capabilities) load
//! independently. [`PortalOrchestrator`] probes each of them in ordered
//! phases, tolerates partial failure, and produces an
//! [`InitializationReport`] that is sent to analytics and shown to the user.

pub mod prefs;
pub mod registries;
pub mod shell;
pub mod surfaces;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use prefs::{PortalPreferences, PreferencesError};
pub use registries::atomic::capability::{
    CapabilityDescriptor, CapabilityRegistry, ProbeAbsence, ProbeError, RegistrationError,
    RegistrationOutcome, RegistrationPolicy,
};
pub use registries::infrastructure::catalog::RegistrySet;
pub use shell::portal::host::EntryTrigger;
pub use shell::portal::runtime::{
    DetailsView, InitializationOutcome, InitializationReport, InitializationStats, Phase,
    PhaseReport, PortalInitError, PortalOrchestrator, PresentationTier, ProbeResult,
    ProbeStatus, RunState, wait_for,
};
pub use surfaces::PortalSurfaces;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Installs the fmt subscriber. `filter` wins over `PORTAL_TRACING_FILTER`,
/// which wins over `info`. `log` records are bridged into the subscriber.
#[cfg(feature = "tracing")]
pub fn init_tracing(filter: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_env(prefs::ENV_TRACING_FILTER)
            .unwrap_or_else(|_| EnvFilter::new("info")),
    };
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        log::debug!("tracing subscriber already installed");
    }
}

#[cfg(not(feature = "tracing"))]
pub fn init_tracing(filter: Option<&str>) {
    if filter.is_some() {
        log::warn!("tracing filter ignored: built without the `tracing` feature");
    }
}

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

pub mod channels;
pub mod cli;
pub mod diagnostics;
pub mod orchestrator;
pub mod phases;
pub mod readiness;
pub mod report;

pub use orchestrator::{InitializationOutcome, PortalInitError, PortalOrchestrator};
pub use phases::{Phase, PhaseReport, ProbeResult, ProbeStatus, RunState};
pub use readiness::{ReadinessBudget, wait_for};
pub use report::{DetailsView, InitializationReport, InitializationStats, PresentationTier};

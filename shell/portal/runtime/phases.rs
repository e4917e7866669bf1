/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Phase and probe outcome types shared by the runner and the report.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// A probing phase. Phases run in [`Phase::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Components,
    Features,
    Integrations,
    Analytics,
    Pwa,
}

impl Phase {
    pub const ORDER: [Phase; 5] = [
        Phase::Components,
        Phase::Features,
        Phase::Integrations,
        Phase::Analytics,
        Phase::Pwa,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Phase::Components => "components",
            Phase::Features => "features",
            Phase::Integrations => "integrations",
            Phase::Analytics => "analytics",
            Phase::Pwa => "pwa",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Phase::Components => "UI components",
            Phase::Features => "Professional features",
            Phase::Integrations => "Integrations",
            Phase::Analytics => "Analytics",
            Phase::Pwa => "PWA",
        }
    }

    pub(crate) fn span_name(self) -> &'static str {
        match self {
            Phase::Components => "portal.phase.components",
            Phase::Features => "portal.phase.features",
            Phase::Integrations => "portal.phase.integrations",
            Phase::Analytics => "portal.phase.analytics",
            Phase::Pwa => "portal.phase.pwa",
        }
    }

    pub fn state(self) -> RunState {
        match self {
            Phase::Components => RunState::Components,
            Phase::Features => RunState::Features,
            Phase::Integrations => RunState::Integrations,
            Phase::Analytics => RunState::Analytics,
            Phase::Pwa => RunState::Pwa,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of one orchestrator run.
///
/// `Idle → Components → Features → Integrations → Analytics → Pwa →
/// Finalizing → Complete`, or `Error` once a run-level failure escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Components,
    Features,
    Integrations,
    Analytics,
    Pwa,
    Finalizing,
    Complete,
    Error,
}

impl RunState {
    pub fn label(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Components => "components",
            RunState::Features => "features",
            RunState::Integrations => "integrations",
            RunState::Analytics => "analytics",
            RunState::Pwa => "pwa",
            RunState::Finalizing => "finalizing",
            RunState::Complete => "complete",
            RunState::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Complete | RunState::Error)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ProbeStatus {
    Success,
    /// The capability was not present.
    Failed,
    /// The initializer returned an error or panicked.
    Error(String),
    NotSupported,
}

impl ProbeStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            ProbeStatus::Success => "✓",
            ProbeStatus::Failed => "✗",
            ProbeStatus::Error(_) => "⚠",
            ProbeStatus::NotSupported => "–",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeStatus::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub name: String,
    #[serde(flatten)]
    pub status: ProbeStatus,
}

impl ProbeResult {
    pub fn new(name: impl Into<String>, status: ProbeStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

/// Results of one phase, in registration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub results: Vec<ProbeResult>,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl PhaseReport {
    pub fn passed(&self) -> usize {
        self.results
            .iter()
            .filter(|result| result.status.is_success())
            .count()
    }

    pub fn result(&self, name: &str) -> Option<&ProbeResult> {
        self.results.iter().find(|result| result.name == name)
    }
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn phase_order_matches_run_states() {
        let states = Phase::ORDER.map(Phase::state);
        assert_eq!(
            states,
            [
                RunState::Components,
                RunState::Features,
                RunState::Integrations,
                RunState::Analytics,
                RunState::Pwa,
            ]
        );
        assert!(!RunState::Finalizing.is_terminal());
        assert!(RunState::Error.is_terminal());
    }

    #[test]
    fn phase_report_serializes_flat_statuses() {
        let report = PhaseReport {
            phase: Phase::Components,
            results: vec![
                ProbeResult::new("modal", ProbeStatus::Success),
                ProbeResult::new("chart", ProbeStatus::Error("mount failed".into())),
            ],
            elapsed: Duration::from_millis(12),
        };

        assert_eq!(report.passed(), 1);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "phase": "components",
                "results": [
                    { "name": "modal", "status": "success" },
                    { "name": "chart", "status": "error", "message": "mount failed" },
                ],
                "elapsed_ms": 12,
            })
        );
    }
}

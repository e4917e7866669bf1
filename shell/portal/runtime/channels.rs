/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

pub const CHANNEL_CAPABILITY_REGISTERED: &str = "registry.capability.registered";
pub const CHANNEL_CAPABILITY_OVERWRITTEN: &str = "registry.capability.overwritten";
pub const CHANNEL_CAPABILITY_REJECTED: &str = "registry.capability.rejected";
pub const CHANNEL_PHASE_STARTED: &str = "portal.phase.started";
pub const CHANNEL_PHASE_COMPLETED: &str = "portal.phase.completed";
pub const CHANNEL_PROBE_SUCCEEDED: &str = "portal.probe.succeeded";
pub const CHANNEL_PROBE_FAILED: &str = "portal.probe.failed";
pub const CHANNEL_PROBE_ERRORED: &str = "portal.probe.errored";
pub const CHANNEL_PROBE_NOT_SUPPORTED: &str = "portal.probe.not_supported";
pub const CHANNEL_READINESS_SATISFIED: &str = "portal.readiness.satisfied";
pub const CHANNEL_READINESS_TIMEOUT: &str = "portal.readiness.timeout";
pub const CHANNEL_TELEMETRY_SENT: &str = "portal.telemetry.sent";
pub const CHANNEL_TELEMETRY_SKIPPED: &str = "portal.telemetry.skipped";
pub const CHANNEL_TELEMETRY_FAILED: &str = "portal.telemetry.failed";
pub const CHANNEL_REPORT_MODAL_SHOWN: &str = "portal.report.modal_shown";
pub const CHANNEL_REPORT_ALERT_SHOWN: &str = "portal.report.alert_shown";
pub const CHANNEL_REPORT_FALLBACK_USED: &str = "portal.report.fallback_used";
pub const CHANNEL_RUN_COMPLETED: &str = "portal.run.completed";
pub const CHANNEL_RUN_FAILED: &str = "portal.run.failed";
pub const CHANNEL_ENTRY_FIRED: &str = "startup.entry.fired";
pub const CHANNEL_ENTRY_IGNORED: &str = "startup.entry.ignored";
pub const CHANNEL_STARTUP_CONFIG_SNAPSHOT: &str = "startup.config.snapshot";
pub const CHANNEL_STARTUP_CONFIG_INVALID: &str = "startup.config.invalid_env";

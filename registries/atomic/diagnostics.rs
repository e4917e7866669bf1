/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::Mutex;
use serde::Serialize;

use crate::shell::portal::runtime::channels::{
    CHANNEL_CAPABILITY_OVERWRITTEN, CHANNEL_CAPABILITY_REGISTERED, CHANNEL_CAPABILITY_REJECTED,
    CHANNEL_ENTRY_FIRED, CHANNEL_ENTRY_IGNORED, CHANNEL_PHASE_COMPLETED, CHANNEL_PHASE_STARTED,
    CHANNEL_PROBE_ERRORED, CHANNEL_PROBE_FAILED, CHANNEL_PROBE_NOT_SUPPORTED,
    CHANNEL_PROBE_SUCCEEDED, CHANNEL_READINESS_SATISFIED, CHANNEL_READINESS_TIMEOUT,
    CHANNEL_REPORT_ALERT_SHOWN, CHANNEL_REPORT_FALLBACK_USED, CHANNEL_REPORT_MODAL_SHOWN,
    CHANNEL_RUN_COMPLETED, CHANNEL_RUN_FAILED, CHANNEL_STARTUP_CONFIG_INVALID,
    CHANNEL_STARTUP_CONFIG_SNAPSHOT, CHANNEL_TELEMETRY_FAILED, CHANNEL_TELEMETRY_SENT,
    CHANNEL_TELEMETRY_SKIPPED,
};

/// Severity tier used to roll channel counts up in the diagnostics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelSeverity {
    #[default]
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticChannelDescriptor {
    pub channel_id: &'static str,
    pub schema_version: u16,
    pub severity: ChannelSeverity,
}

const fn channel(channel_id: &'static str, severity: ChannelSeverity) -> DiagnosticChannelDescriptor {
    DiagnosticChannelDescriptor {
        channel_id,
        schema_version: 1,
        severity,
    }
}

const PORTAL_CHANNELS: [DiagnosticChannelDescriptor; 23] = [
    channel(CHANNEL_CAPABILITY_REGISTERED, ChannelSeverity::Info),
    channel(CHANNEL_CAPABILITY_OVERWRITTEN, ChannelSeverity::Warn),
    channel(CHANNEL_CAPABILITY_REJECTED, ChannelSeverity::Error),
    channel(CHANNEL_PHASE_STARTED, ChannelSeverity::Info),
    channel(CHANNEL_PHASE_COMPLETED, ChannelSeverity::Info),
    channel(CHANNEL_PROBE_SUCCEEDED, ChannelSeverity::Info),
    channel(CHANNEL_PROBE_FAILED, ChannelSeverity::Warn),
    channel(CHANNEL_PROBE_ERRORED, ChannelSeverity::Error),
    channel(CHANNEL_PROBE_NOT_SUPPORTED, ChannelSeverity::Info),
    channel(CHANNEL_READINESS_SATISFIED, ChannelSeverity::Info),
    channel(CHANNEL_READINESS_TIMEOUT, ChannelSeverity::Warn),
    channel(CHANNEL_TELEMETRY_SENT, ChannelSeverity::Info),
    channel(CHANNEL_TELEMETRY_SKIPPED, ChannelSeverity::Info),
    channel(CHANNEL_TELEMETRY_FAILED, ChannelSeverity::Warn),
    channel(CHANNEL_REPORT_MODAL_SHOWN, ChannelSeverity::Info),
    channel(CHANNEL_REPORT_ALERT_SHOWN, ChannelSeverity::Info),
    channel(CHANNEL_REPORT_FALLBACK_USED, ChannelSeverity::Warn),
    channel(CHANNEL_RUN_COMPLETED, ChannelSeverity::Info),
    channel(CHANNEL_RUN_FAILED, ChannelSeverity::Error),
    channel(CHANNEL_ENTRY_FIRED, ChannelSeverity::Info),
    channel(CHANNEL_ENTRY_IGNORED, ChannelSeverity::Warn),
    channel(CHANNEL_STARTUP_CONFIG_SNAPSHOT, ChannelSeverity::Info),
    channel(CHANNEL_STARTUP_CONFIG_INVALID, ChannelSeverity::Warn),
];

static CHANNEL_ENABLED: OnceLock<Mutex<HashMap<String, bool>>> = OnceLock::new();

fn channel_enabled_map() -> &'static Mutex<HashMap<String, bool>> {
    CHANNEL_ENABLED.get_or_init(|| Mutex::new(HashMap::new()))
}

pub fn channel_descriptors() -> &'static [DiagnosticChannelDescriptor] {
    &PORTAL_CHANNELS
}

pub fn describe_channel(channel_id: &str) -> Option<DiagnosticChannelDescriptor> {
    PORTAL_CHANNELS
        .iter()
        .find(|descriptor| descriptor.channel_id == channel_id)
        .copied()
}

/// Unknown channels report as `Info`.
pub fn channel_severity(channel_id: &str) -> ChannelSeverity {
    describe_channel(channel_id)
        .map(|descriptor| descriptor.severity)
        .unwrap_or_default()
}

pub fn set_channel_enabled(channel_id: &str, enabled: bool) {
    channel_enabled_map()
        .lock()
        .insert(channel_id.to_ascii_lowercase(), enabled);
}

/// Channels are enabled unless explicitly muted.
pub fn should_emit(channel_id: &str) -> bool {
    channel_enabled_map()
        .lock()
        .get(&channel_id.to_ascii_lowercase())
        .copied()
        .unwrap_or(true)
}

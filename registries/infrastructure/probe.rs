/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Probe execution: presence check, then initializer, with fault isolation.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use futures_util::FutureExt;
use tokio::time::Instant;

use crate::registries::atomic::capability::{CapabilityDescriptor, CapabilityRegistry, ProbeAbsence};
use crate::shell::portal::runtime::channels::{
    CHANNEL_PHASE_COMPLETED, CHANNEL_PHASE_STARTED, CHANNEL_PROBE_ERRORED, CHANNEL_PROBE_FAILED,
    CHANNEL_PROBE_NOT_SUPPORTED, CHANNEL_PROBE_SUCCEEDED,
};
use crate::shell::portal::runtime::diagnostics::{emit_message, emit_span_duration};
use crate::shell::portal::runtime::phases::{Phase, PhaseReport, ProbeResult, ProbeStatus};

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Runs one capability probe.
///
/// The initializer is only invoked after the presence check returned true.
/// Errors and panics from either step are captured in the returned status.
pub async fn run_probe(name: &str, descriptor: &CapabilityDescriptor) -> ProbeResult {
    let status = match panic::catch_unwind(AssertUnwindSafe(|| descriptor.is_present())) {
        Err(payload) => ProbeStatus::Error(format!(
            "presence check panicked: {}",
            panic_message(payload.as_ref())
        )),
        Ok(false) => match descriptor.absence() {
            ProbeAbsence::Failed => ProbeStatus::Failed,
            ProbeAbsence::NotSupported => ProbeStatus::NotSupported,
        },
        Ok(true) => {
            let initialized = AssertUnwindSafe(async { descriptor.initialize().await })
                .catch_unwind()
                .await;
            match initialized {
                Ok(Ok(())) => ProbeStatus::Success,
                Ok(Err(error)) => ProbeStatus::Error(error.message().to_string()),
                Err(payload) => ProbeStatus::Error(format!(
                    "initializer panicked: {}",
                    panic_message(payload.as_ref())
                )),
            }
        }
    };

    match &status {
        ProbeStatus::Success => {
            log::debug!("probe `{name}` succeeded");
            emit_message(CHANNEL_PROBE_SUCCEEDED, name);
        }
        ProbeStatus::Failed => {
            log::debug!("probe `{name}` found nothing to initialize");
            emit_message(CHANNEL_PROBE_FAILED, name);
        }
        ProbeStatus::NotSupported => {
            log::debug!("probe `{name}` is not supported on this platform");
            emit_message(CHANNEL_PROBE_NOT_SUPPORTED, name);
        }
        ProbeStatus::Error(message) => {
            log::warn!("probe `{name}` errored: {message}");
            emit_message(CHANNEL_PROBE_ERRORED, message);
        }
    }

    ProbeResult::new(name, status)
}

/// Probes every descriptor of `registry` sequentially, in registration order.
pub async fn run_registry(phase: Phase, registry: &CapabilityRegistry) -> PhaseReport {
    emit_message(CHANNEL_PHASE_STARTED, phase.label());
    let started = Instant::now();

    let mut results = Vec::with_capacity(registry.len());
    for (name, descriptor) in registry.iter() {
        results.push(run_probe(name, descriptor).await);
    }

    let elapsed = started.elapsed();
    emit_span_duration(phase.span_name(), elapsed.as_micros() as u64);
    emit_message(CHANNEL_PHASE_COMPLETED, phase.label());
    log::debug!(
        "{} phase: {}/{} probes succeeded in {} ms",
        phase.label(),
        results.iter().filter(|result| result.status.is_success()).count(),
        results.len(),
        elapsed.as_millis()
    );

    PhaseReport {
        phase,
        results,
        elapsed,
    }
}

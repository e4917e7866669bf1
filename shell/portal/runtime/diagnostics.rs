/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Process-wide diagnostics channel.
//!
//! Runtime code reports lifecycle signals through [`emit_event`] without
//! holding a handle; a [`DiagnosticsState`] owns the receiving end and folds
//! events into per-channel counters that can be rendered as JSON.

use std::collections::HashMap;
use std::sync::OnceLock;

use crossbeam_channel::{Receiver, Sender, unbounded};
use serde_json::{Value, json};

use crate::registries::atomic::diagnostics::{self as diagnostics_registry, ChannelSeverity};

static GLOBAL_DIAGNOSTICS_TX: OnceLock<Sender<DiagnosticEvent>> = OnceLock::new();

#[cfg(test)]
thread_local! {
    static TEST_DIAGNOSTICS_TX: std::cell::RefCell<Option<Sender<DiagnosticEvent>>> =
        const { std::cell::RefCell::new(None) };
}

pub(crate) fn install_global_sender(sender: Sender<DiagnosticEvent>) {
    let _ = GLOBAL_DIAGNOSTICS_TX.set(sender.clone());

    #[cfg(test)]
    {
        TEST_DIAGNOSTICS_TX.with(|slot| {
            *slot.borrow_mut() = Some(sender);
        });
    }
}

pub(crate) fn emit_event(event: DiagnosticEvent) {
    // Tests only observe events from their own thread.
    #[cfg(test)]
    {
        TEST_DIAGNOSTICS_TX.with(|slot| {
            if let Some(tx) = slot.borrow().as_ref() {
                emit_event_with_sender(tx, event);
            }
        });
    }

    #[cfg(not(test))]
    {
        if let Some(tx) = GLOBAL_DIAGNOSTICS_TX.get() {
            emit_event_with_sender(tx, event);
        }
    }
}

fn emit_event_with_sender(tx: &Sender<DiagnosticEvent>, event: DiagnosticEvent) {
    let allowed = match &event {
        DiagnosticEvent::MessageSent { channel_id, .. } => {
            diagnostics_registry::should_emit(channel_id)
        }
        DiagnosticEvent::Span { .. } => true,
    };
    if allowed {
        let _ = tx.send(event);
    }
}

pub(crate) fn emit_message(channel_id: &'static str, payload: &str) {
    emit_event(DiagnosticEvent::MessageSent {
        channel_id,
        byte_len: payload.len(),
    });
}

pub(crate) fn emit_span_duration(name: &'static str, duration_us: u64) {
    emit_event(DiagnosticEvent::Span { name, duration_us });
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// A completed span and its wall-clock duration.
    Span {
        name: &'static str,
        duration_us: u64,
    },
    MessageSent {
        channel_id: &'static str,
        byte_len: usize,
    },
}

#[derive(Clone, Debug, Default)]
struct DiagnosticGraph {
    message_counts: HashMap<&'static str, u64>,
    message_bytes_sent: HashMap<&'static str, u64>,
    span_exit_counts: HashMap<&'static str, u64>,
    last_span_duration_us: HashMap<&'static str, u64>,
}

/// Receiving end of the diagnostics channel.
///
/// Creating a state installs its sender as the process-wide target (first
/// install wins). Under `cfg(test)` events are routed per thread instead, so
/// parallel tests do not observe each other's events.
pub struct DiagnosticsState {
    event_rx: Receiver<DiagnosticEvent>,
    graph: DiagnosticGraph,
}

impl DiagnosticsState {
    pub fn new() -> Self {
        let (event_tx, event_rx) = unbounded();
        install_global_sender(event_tx);
        Self {
            event_rx,
            graph: DiagnosticGraph::default(),
        }
    }

    /// Folds every pending event into the counters and returns how many were read.
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            drained += 1;
            match event {
                DiagnosticEvent::MessageSent {
                    channel_id,
                    byte_len,
                } => {
                    *self.graph.message_counts.entry(channel_id).or_insert(0) += 1;
                    *self.graph.message_bytes_sent.entry(channel_id).or_insert(0) +=
                        byte_len as u64;
                }
                DiagnosticEvent::Span { name, duration_us } => {
                    *self.graph.span_exit_counts.entry(name).or_insert(0) += 1;
                    self.graph.last_span_duration_us.insert(name, duration_us);
                }
            }
        }
        drained
    }

    pub fn channel_count(&self, channel_id: &str) -> u64 {
        self.graph
            .message_counts
            .get(channel_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn last_span_duration_us(&self, name: &str) -> Option<u64> {
        self.graph.last_span_duration_us.get(name).copied()
    }

    fn severity_totals(&self) -> HashMap<ChannelSeverity, u64> {
        let mut totals = HashMap::new();
        for (channel_id, count) in &self.graph.message_counts {
            *totals
                .entry(diagnostics_registry::channel_severity(channel_id))
                .or_insert(0) += count;
        }
        totals
    }

    pub fn snapshot_json(&self) -> Value {
        let totals = self.severity_totals();
        json!({
            "channels": {
                "message_counts": self.graph.message_counts,
                "message_bytes_sent": self.graph.message_bytes_sent,
            },
            "spans": {
                "exit_counts": self.graph.span_exit_counts,
                "last_duration_us": self.graph.last_span_duration_us,
            },
            "severity_totals": {
                "info": totals.get(&ChannelSeverity::Info).copied().unwrap_or(0),
                "warn": totals.get(&ChannelSeverity::Warn).copied().unwrap_or(0),
                "error": totals.get(&ChannelSeverity::Error).copied().unwrap_or(0),
            },
        })
    }
}

impl Default for DiagnosticsState {
    fn default() -> Self {
        Self::new()
    }
}

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

pub mod demo;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::prefs::PortalPreferences;
use crate::shell::portal::runtime::channels::{CHANNEL_ENTRY_FIRED, CHANNEL_ENTRY_IGNORED};
use crate::shell::portal::runtime::diagnostics::emit_message;
use crate::shell::portal::runtime::orchestrator::{InitializationOutcome, PortalOrchestrator};

/// Starts the orchestrator once the host signals readiness.
///
/// Fires at most once; later calls return `None` without waiting.
#[derive(Debug, Default)]
pub struct EntryTrigger {
    fired: AtomicBool,
    settle_delay: Duration,
}

impl EntryTrigger {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            fired: AtomicBool::new(false),
            settle_delay,
        }
    }

    pub fn from_preferences(prefs: &PortalPreferences) -> Self {
        Self::new(prefs.settle_delay())
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    pub async fn fire_when_ready<R>(
        &self,
        ready: R,
        orchestrator: &mut PortalOrchestrator,
    ) -> Option<InitializationOutcome>
    where
        R: Future<Output = ()>,
    {
        if self.fired.swap(true, Ordering::AcqRel) {
            log::debug!("entry trigger already fired; ignoring");
            emit_message(CHANNEL_ENTRY_IGNORED, "entry");
            return None;
        }

        ready.await;
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        emit_message(CHANNEL_ENTRY_FIRED, "entry");
        Some(orchestrator.initialize_portal().await)
    }
}

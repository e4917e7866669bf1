/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Bounded polling for collaborators that attach asynchronously.

use std::time::Duration;

use tokio::time::{Instant, sleep};

use crate::prefs::PortalPreferences;
use crate::shell::portal::runtime::channels::{
    CHANNEL_READINESS_SATISFIED, CHANNEL_READINESS_TIMEOUT,
};
use crate::shell::portal::runtime::diagnostics::emit_message;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Resolves `true` as soon as `predicate` holds, or `false` once `timeout`
/// has elapsed. Never errors.
///
/// The predicate is evaluated before any sleep, so an already-satisfied
/// condition resolves without suspending. A zero `poll_interval` is clamped
/// to one millisecond.
pub async fn wait_for<P>(mut predicate: P, timeout: Duration, poll_interval: Duration) -> bool
where
    P: FnMut() -> bool,
{
    let poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
    let started = Instant::now();
    loop {
        if predicate() {
            return true;
        }
        let elapsed = started.elapsed();
        if elapsed >= timeout {
            return false;
        }
        sleep(poll_interval.min(timeout - elapsed)).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessBudget {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl ReadinessBudget {
    pub fn from_preferences(prefs: &PortalPreferences) -> Self {
        Self {
            timeout: prefs.readiness_timeout(),
            poll_interval: prefs.readiness_poll_interval(),
        }
    }

    /// [`wait_for`] within this budget, reporting the outcome on the
    /// readiness channels under `subject`.
    pub async fn wait<P>(&self, subject: &str, predicate: P) -> bool
    where
        P: FnMut() -> bool,
    {
        let ready = wait_for(predicate, self.timeout, self.poll_interval).await;
        if ready {
            emit_message(CHANNEL_READINESS_SATISFIED, subject);
        } else {
            log::debug!(
                "{subject} not ready after {} ms",
                self.timeout.as_millis()
            );
            emit_message(CHANNEL_READINESS_TIMEOUT, subject);
        }
        ready
    }
}

impl Default for ReadinessBudget {
    fn default() -> Self {
        Self::from_preferences(&PortalPreferences::default())
    }
}

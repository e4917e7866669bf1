/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use super::SurfaceError;

/// Analytics collaborator. Its script loads independently of the portal, so
/// it may attach after initialization has already started.
pub trait AnalyticsCollector: Send + Sync {
    fn initialized(&self) -> bool;
    fn track_event(&self, name: &str, properties: Value) -> Result<(), SurfaceError>;
}

/// Late-attachable analytics handle shared between the embedder and the
/// orchestrator. Cloning shares the slot.
#[derive(Clone, Default)]
pub struct AnalyticsSlot {
    inner: Arc<RwLock<Option<Arc<dyn AnalyticsCollector>>>>,
}

impl AnalyticsSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn attach(&self, collector: Arc<dyn AnalyticsCollector>) {
        *self.inner.write() = Some(collector);
    }

    pub fn detach(&self) -> Option<Arc<dyn AnalyticsCollector>> {
        self.inner.write().take()
    }

    pub fn get(&self) -> Option<Arc<dyn AnalyticsCollector>> {
        self.inner.read().clone()
    }

    pub fn is_attached(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Attached and reporting itself initialized.
    pub fn is_ready(&self) -> bool {
        self.inner
            .read()
            .as_ref()
            .is_some_and(|collector| collector.initialized())
    }
}

impl std::fmt::Debug for AnalyticsSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsSlot")
            .field("attached", &self.is_attached())
            .finish()
    }
}

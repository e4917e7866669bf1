/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Capability surfaces the portal consumes from independently loaded modules.
//!
//! Every surface is optional. The orchestrator receives one
//! `Option<Arc<dyn Surface>>` per slot and derives presence checks from those
//! slots instead of probing ambient state by name.

pub mod analytics;
pub mod features;
pub mod integrations;
pub mod platform;
pub mod ui;

use std::sync::Arc;

use thiserror::Error;

use crate::registries::atomic::capability::ProbeError;

pub use analytics::{AnalyticsCollector, AnalyticsSlot};
pub use features::{FeatureSurface, ProfessionalFeature};
pub use integrations::{IntegrationKind, IntegrationSurface};
pub use platform::PlatformCapabilities;
pub use ui::{FallbackAlert, LogAlert, UiComponent, UiSurface};

/// Error raised by a capability surface call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SurfaceError(pub String);

impl SurfaceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<SurfaceError> for ProbeError {
    fn from(error: SurfaceError) -> Self {
        ProbeError::new(error.0)
    }
}

/// The full set of capability slots handed to the orchestrator.
#[derive(Clone)]
pub struct PortalSurfaces {
    pub ui: Option<Arc<dyn UiSurface>>,
    pub features: Option<Arc<dyn FeatureSurface>>,
    pub integrations: Option<Arc<dyn IntegrationSurface>>,
    pub analytics: AnalyticsSlot,
    pub platform: Option<Arc<dyn PlatformCapabilities>>,
    pub fallback_alert: Arc<dyn FallbackAlert>,
}

impl PortalSurfaces {
    /// No optional surface attached; reports go to the log-backed fallback.
    pub fn empty() -> Self {
        Self {
            ui: None,
            features: None,
            integrations: None,
            analytics: AnalyticsSlot::empty(),
            platform: None,
            fallback_alert: Arc::new(LogAlert),
        }
    }

    pub fn with_ui(mut self, ui: Arc<dyn UiSurface>) -> Self {
        self.ui = Some(ui);
        self
    }

    pub fn with_features(mut self, features: Arc<dyn FeatureSurface>) -> Self {
        self.features = Some(features);
        self
    }

    pub fn with_integrations(mut self, integrations: Arc<dyn IntegrationSurface>) -> Self {
        self.integrations = Some(integrations);
        self
    }

    pub fn with_analytics(self, collector: Arc<dyn AnalyticsCollector>) -> Self {
        self.analytics.attach(collector);
        self
    }

    pub fn with_platform(mut self, platform: Arc<dyn PlatformCapabilities>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_fallback_alert(mut self, fallback_alert: Arc<dyn FallbackAlert>) -> Self {
        self.fallback_alert = fallback_alert;
        self
    }
}

impl Default for PortalSurfaces {
    fn default() -> Self {
        Self::empty()
    }
}

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use futures_util::future::BoxFuture;
use serde::Serialize;

use super::SurfaceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfessionalFeature {
    Dashboard,
    Notifications,
    AppointmentManager,
}

impl ProfessionalFeature {
    pub const ALL: [ProfessionalFeature; 3] = [
        ProfessionalFeature::Dashboard,
        ProfessionalFeature::Notifications,
        ProfessionalFeature::AppointmentManager,
    ];

    pub fn capability_name(self) -> &'static str {
        match self {
            ProfessionalFeature::Dashboard => "dashboard",
            ProfessionalFeature::Notifications => "notifications",
            ProfessionalFeature::AppointmentManager => "appointment_manager",
        }
    }
}

/// Practitioner-facing widgets that attach to containers created by the
/// components phase.
pub trait FeatureSurface: Send + Sync {
    fn supports(&self, feature: ProfessionalFeature) -> bool {
        let _ = feature;
        true
    }

    fn init_dashboard<'a>(&'a self, container: &'a str) -> BoxFuture<'a, Result<(), SurfaceError>>;
    fn init_notifications(&self) -> BoxFuture<'_, Result<(), SurfaceError>>;
    fn init_appointment_manager<'a>(
        &'a self,
        container: &'a str,
    ) -> BoxFuture<'a, Result<(), SurfaceError>>;
}

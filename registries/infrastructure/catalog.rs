/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Standard capability catalog.
//!
//! Builds one registry per phase from the attached surfaces. Every presence
//! check consults a surface slot captured at construction time.

use std::sync::Arc;

use serde_json::json;

use crate::prefs::PortalPreferences;
use crate::registries::atomic::capability::{
    CapabilityDescriptor, CapabilityRegistry, ProbeError, RegistrationError, RegistrationPolicy,
};
use crate::shell::portal::runtime::phases::Phase;
use crate::surfaces::ui::{CalendarOptions, CardOptions, ChartOptions};
use crate::surfaces::{
    AnalyticsSlot, FeatureSurface, IntegrationKind, IntegrationSurface, PlatformCapabilities,
    PortalSurfaces, ProfessionalFeature, SurfaceError, UiComponent, UiSurface,
};

/// One registry slot per phase. A `None` slot is a run-level failure when
/// the runner reaches that phase.
#[derive(Debug, Clone, Default)]
pub struct RegistrySet {
    pub components: Option<CapabilityRegistry>,
    pub features: Option<CapabilityRegistry>,
    pub integrations: Option<CapabilityRegistry>,
    pub analytics: Option<CapabilityRegistry>,
    pub pwa: Option<CapabilityRegistry>,
}

impl RegistrySet {
    /// Every phase present with an empty registry.
    pub fn empty(policy: RegistrationPolicy) -> Self {
        Self {
            components: Some(CapabilityRegistry::with_policy("components", policy)),
            features: Some(CapabilityRegistry::with_policy("features", policy)),
            integrations: Some(CapabilityRegistry::with_policy("integrations", policy)),
            analytics: Some(CapabilityRegistry::with_policy("analytics", policy)),
            pwa: Some(CapabilityRegistry::with_policy("pwa", policy)),
        }
    }

    pub fn standard(
        surfaces: &PortalSurfaces,
        prefs: &PortalPreferences,
    ) -> Result<Self, RegistrationError> {
        let policy = prefs.registration_policy;
        Ok(Self {
            components: Some(component_registry(surfaces.ui.clone(), prefs, policy)?),
            features: Some(feature_registry(surfaces.features.clone(), prefs, policy)?),
            integrations: Some(integration_registry(surfaces.integrations.clone(), policy)?),
            analytics: Some(analytics_registry(surfaces.analytics.clone(), prefs, policy)?),
            pwa: Some(pwa_registry(surfaces.platform.clone(), policy)?),
        })
    }

    pub fn registry(&self, phase: Phase) -> Option<&CapabilityRegistry> {
        self.slot(phase).as_ref()
    }

    pub fn registry_mut(&mut self, phase: Phase) -> Option<&mut CapabilityRegistry> {
        match phase {
            Phase::Components => self.components.as_mut(),
            Phase::Features => self.features.as_mut(),
            Phase::Integrations => self.integrations.as_mut(),
            Phase::Analytics => self.analytics.as_mut(),
            Phase::Pwa => self.pwa.as_mut(),
        }
    }

    pub fn set(&mut self, phase: Phase, registry: Option<CapabilityRegistry>) {
        match phase {
            Phase::Components => self.components = registry,
            Phase::Features => self.features = registry,
            Phase::Integrations => self.integrations = registry,
            Phase::Analytics => self.analytics = registry,
            Phase::Pwa => self.pwa = registry,
        }
    }

    pub fn total_capabilities(&self) -> usize {
        Phase::ORDER
            .iter()
            .filter_map(|phase| self.registry(*phase))
            .map(CapabilityRegistry::len)
            .sum()
    }

    fn slot(&self, phase: Phase) -> &Option<CapabilityRegistry> {
        match phase {
            Phase::Components => &self.components,
            Phase::Features => &self.features,
            Phase::Integrations => &self.integrations,
            Phase::Analytics => &self.analytics,
            Phase::Pwa => &self.pwa,
        }
    }
}

fn missing(surface: &str) -> ProbeError {
    ProbeError::new(format!("{surface} surface detached"))
}

fn ui_descriptor<F>(
    ui: Option<Arc<dyn UiSurface>>,
    component: UiComponent,
    init: F,
) -> CapabilityDescriptor
where
    F: Fn(&dyn UiSurface) -> Result<(), SurfaceError> + Send + Sync + 'static,
{
    let presence_ui = ui.clone();
    CapabilityDescriptor::from_sync(
        move || presence_ui.as_ref().is_some_and(|ui| ui.supports(component)),
        move || match &ui {
            Some(ui) => init(ui.as_ref()).map_err(ProbeError::from),
            None => Err(missing("ui")),
        },
    )
}

fn component_registry(
    ui: Option<Arc<dyn UiSurface>>,
    prefs: &PortalPreferences,
    policy: RegistrationPolicy,
) -> Result<CapabilityRegistry, RegistrationError> {
    let mut registry = CapabilityRegistry::with_policy("components", policy);
    let dashboard = prefs.dashboard_container.clone();
    let appointments = prefs.appointments_container.clone();

    registry.register(
        UiComponent::Modal.capability_name(),
        ui_descriptor(ui.clone(), UiComponent::Modal, |ui| {
            ui.install(UiComponent::Modal)
        }),
    )?;
    registry.register(
        UiComponent::Alert.capability_name(),
        ui_descriptor(ui.clone(), UiComponent::Alert, |ui| {
            ui.install(UiComponent::Alert)
        }),
    )?;
    let card_container = dashboard.clone();
    registry.register(
        UiComponent::Card.capability_name(),
        ui_descriptor(ui.clone(), UiComponent::Card, move |ui| {
            ui.install(UiComponent::Card)?;
            ui.create_card(CardOptions {
                container: card_container.clone(),
                title: "Today".to_string(),
                body: "Appointments, budgets and patient follow-ups".to_string(),
            })
        }),
    )?;
    registry.register(
        UiComponent::Chart.capability_name(),
        ui_descriptor(ui.clone(), UiComponent::Chart, move |ui| {
            ui.create_chart(ChartOptions {
                container: dashboard.clone(),
                title: "Appointments this week".to_string(),
                series: Vec::new(),
            })?
            .mount()
        }),
    )?;
    registry.register(
        UiComponent::Calendar.capability_name(),
        ui_descriptor(ui, UiComponent::Calendar, move |ui| {
            ui.create_calendar(CalendarOptions {
                container: appointments.clone(),
            })?
            .mount()
        }),
    )?;

    Ok(registry)
}

fn feature_descriptor(
    features: Option<Arc<dyn FeatureSurface>>,
    feature: ProfessionalFeature,
    container: String,
) -> CapabilityDescriptor {
    let presence = features.clone();
    CapabilityDescriptor::new(
        move || presence.as_ref().is_some_and(|surface| surface.supports(feature)),
        move || {
            let features = features.clone();
            let container = container.clone();
            async move {
                let surface = features.ok_or_else(|| missing("features"))?;
                let initialized = match feature {
                    ProfessionalFeature::Dashboard => surface.init_dashboard(&container).await,
                    ProfessionalFeature::Notifications => surface.init_notifications().await,
                    ProfessionalFeature::AppointmentManager => {
                        surface.init_appointment_manager(&container).await
                    }
                };
                initialized.map_err(ProbeError::from)
            }
        },
    )
}

fn feature_registry(
    features: Option<Arc<dyn FeatureSurface>>,
    prefs: &PortalPreferences,
    policy: RegistrationPolicy,
) -> Result<CapabilityRegistry, RegistrationError> {
    let mut registry = CapabilityRegistry::with_policy("features", policy);
    for feature in ProfessionalFeature::ALL {
        let container = match feature {
            ProfessionalFeature::AppointmentManager => prefs.appointments_container.clone(),
            _ => prefs.dashboard_container.clone(),
        };
        registry.register(
            feature.capability_name(),
            feature_descriptor(features.clone(), feature, container),
        )?;
    }
    Ok(registry)
}

fn integration_registry(
    integrations: Option<Arc<dyn IntegrationSurface>>,
    policy: RegistrationPolicy,
) -> Result<CapabilityRegistry, RegistrationError> {
    let mut registry = CapabilityRegistry::with_policy("integrations", policy);
    for kind in IntegrationKind::ALL {
        let presence = integrations.clone();
        let surface = integrations.clone();
        registry.register(
            kind.capability_name(),
            CapabilityDescriptor::new(
                move || presence.as_ref().is_some_and(|surface| surface.supports(kind)),
                move || {
                    let surface = surface.clone();
                    async move {
                        let surface = surface.ok_or_else(|| missing("integrations"))?;
                        surface.verify(kind).await.map_err(ProbeError::from)
                    }
                },
            ),
        )?;
    }
    Ok(registry)
}

fn analytics_registry(
    analytics: AnalyticsSlot,
    prefs: &PortalPreferences,
    policy: RegistrationPolicy,
) -> Result<CapabilityRegistry, RegistrationError> {
    let mut registry = CapabilityRegistry::with_policy("analytics", policy);

    let tracker = analytics.clone();
    registry.register(
        "tracker",
        CapabilityDescriptor::presence_only(move || tracker.is_ready()),
    )?;

    let presence = analytics.clone();
    let page_name = prefs.page_name.clone();
    registry.register(
        "page_view",
        CapabilityDescriptor::from_sync(
            move || presence.is_ready(),
            move || {
                let collector = analytics.get().ok_or_else(|| missing("analytics"))?;
                collector
                    .track_event("page_view", json!({ "page": page_name }))
                    .map_err(ProbeError::from)
            },
        ),
    )?;

    Ok(registry)
}

fn pwa_registry(
    platform: Option<Arc<dyn PlatformCapabilities>>,
    policy: RegistrationPolicy,
) -> Result<CapabilityRegistry, RegistrationError> {
    let mut registry = CapabilityRegistry::with_policy("pwa", policy);

    let service_worker = platform.clone();
    registry.register(
        "service_worker",
        CapabilityDescriptor::presence_only(move || {
            service_worker
                .as_ref()
                .is_some_and(|platform| platform.has_service_worker())
        })
        .not_supported_when_absent(),
    )?;

    let manifest = platform.clone();
    registry.register(
        "manifest",
        CapabilityDescriptor::presence_only(move || {
            manifest
                .as_ref()
                .is_some_and(|platform| platform.has_manifest_link())
        }),
    )?;

    registry.register(
        "notifications",
        CapabilityDescriptor::presence_only(move || {
            platform
                .as_ref()
                .is_some_and(|platform| platform.has_notification_api())
        })
        .not_supported_when_absent(),
    )?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registries::infrastructure::probe::run_registry;
    use crate::shell::portal::runtime::phases::ProbeStatus;
    use crate::test_utils::{
        RecordingAnalytics, RecordingFeatures, RecordingIntegrations, RecordingUi, StaticPlatform,
    };

    fn statuses(report: &crate::shell::portal::runtime::phases::PhaseReport) -> Vec<(&str, ProbeStatus)> {
        report
            .results
            .iter()
            .map(|result| (result.name.as_str(), result.status.clone()))
            .collect()
    }

    #[test]
    fn standard_catalog_registers_every_phase_in_order() {
        let registries =
            RegistrySet::standard(&PortalSurfaces::empty(), &PortalPreferences::default())
                .unwrap();

        let names = |phase| {
            registries
                .registry(phase)
                .unwrap()
                .names()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(
            names(Phase::Components),
            ["modal", "alert", "card", "chart", "calendar"]
        );
        assert_eq!(
            names(Phase::Components),
            UiComponent::ALL.map(UiComponent::capability_name)
        );
        assert_eq!(
            names(Phase::Features),
            ["dashboard", "notifications", "appointment_manager"]
        );
        assert_eq!(
            names(Phase::Integrations),
            ["whatsapp", "email", "calendar", "payment"]
        );
        assert_eq!(names(Phase::Analytics), ["tracker", "page_view"]);
        assert_eq!(names(Phase::Pwa), ["service_worker", "manifest", "notifications"]);
        assert_eq!(registries.total_capabilities(), 17);
    }

    #[tokio::test]
    async fn components_mount_into_configured_containers() {
        let ui = Arc::new(RecordingUi::new());
        let surfaces = PortalSurfaces::empty().with_ui(ui.clone());
        let registries = RegistrySet::standard(&surfaces, &PortalPreferences::default()).unwrap();

        let report = run_registry(
            Phase::Components,
            registries.registry(Phase::Components).unwrap(),
        )
        .await;

        assert!(report.results.iter().all(|result| result.status.is_success()));
        assert_eq!(
            ui.calls(),
            vec![
                "install:modal",
                "install:alert",
                "install:card",
                "card:dashboard-container",
                "chart:dashboard-container",
                "mount:chart",
                "calendar:appointments-container",
                "mount:calendar",
            ]
        );
    }

    #[tokio::test]
    async fn detached_surfaces_fail_and_platform_gaps_are_not_supported() {
        let registries =
            RegistrySet::standard(&PortalSurfaces::empty(), &PortalPreferences::default())
                .unwrap();

        let features = run_registry(Phase::Features, registries.registry(Phase::Features).unwrap()).await;
        assert!(features
            .results
            .iter()
            .all(|result| result.status == ProbeStatus::Failed));

        let pwa = run_registry(Phase::Pwa, registries.registry(Phase::Pwa).unwrap()).await;
        assert_eq!(
            statuses(&pwa),
            vec![
                ("service_worker", ProbeStatus::NotSupported),
                ("manifest", ProbeStatus::Failed),
                ("notifications", ProbeStatus::NotSupported),
            ]
        );
    }

    #[tokio::test]
    async fn feature_errors_and_partial_platforms_are_reported_per_probe() {
        let features = Arc::new(RecordingFeatures::new().failing_notifications("permission denied"));
        let platform = Arc::new(StaticPlatform {
            service_worker: true,
            manifest_link: true,
            notification_api: false,
        });
        let surfaces = PortalSurfaces::empty()
            .with_features(features.clone())
            .with_platform(platform);
        let registries = RegistrySet::standard(&surfaces, &PortalPreferences::default()).unwrap();

        let report = run_registry(Phase::Features, registries.registry(Phase::Features).unwrap()).await;
        assert_eq!(
            statuses(&report),
            vec![
                ("dashboard", ProbeStatus::Success),
                ("notifications", ProbeStatus::Error("permission denied".to_string())),
                ("appointment_manager", ProbeStatus::Success),
            ]
        );
        assert_eq!(
            features.containers(),
            vec!["dashboard-container", "appointments-container"]
        );

        let pwa = run_registry(Phase::Pwa, registries.registry(Phase::Pwa).unwrap()).await;
        assert_eq!(pwa.passed(), 2);
    }

    #[tokio::test]
    async fn only_supported_integrations_are_verified() {
        let integrations = Arc::new(RecordingIntegrations::supporting(&[
            IntegrationKind::WhatsApp,
            IntegrationKind::Calendar,
        ]));
        let surfaces = PortalSurfaces::empty().with_integrations(integrations.clone());
        let registries = RegistrySet::standard(&surfaces, &PortalPreferences::default()).unwrap();

        let report = run_registry(
            Phase::Integrations,
            registries.registry(Phase::Integrations).unwrap(),
        )
        .await;

        assert_eq!(
            integrations.verified(),
            vec![IntegrationKind::WhatsApp, IntegrationKind::Calendar]
        );
        assert_eq!(
            statuses(&report),
            vec![
                ("whatsapp", ProbeStatus::Success),
                ("email", ProbeStatus::Failed),
                ("calendar", ProbeStatus::Success),
                ("payment", ProbeStatus::Failed),
            ]
        );
    }

    #[tokio::test]
    async fn page_view_is_tracked_with_the_configured_page_name() {
        let analytics = Arc::new(RecordingAnalytics::ready());
        let surfaces = PortalSurfaces::empty().with_analytics(analytics.clone());
        let prefs = PortalPreferences {
            page_name: "agenda".to_string(),
            ..PortalPreferences::default()
        };
        let registries = RegistrySet::standard(&surfaces, &prefs).unwrap();

        let report = run_registry(
            Phase::Analytics,
            registries.registry(Phase::Analytics).unwrap(),
        )
        .await;

        assert_eq!(report.passed(), 2);
        assert_eq!(
            analytics.events(),
            vec![("page_view".to_string(), json!({ "page": "agenda" }))]
        );
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use portalshell::surfaces::{IntegrationKind, UiComponent};
use portalshell::test_utils::{
    RecordingAlertSink, RecordingAnalytics, RecordingFeatures, RecordingIntegrations, RecordingUi,
    StaticPlatform,
};
use portalshell::{
    CapabilityDescriptor, DetailsView, EntryTrigger, Phase, PortalOrchestrator, PortalPreferences,
    PortalSurfaces, PresentationTier, ProbeStatus, RegistrationError, RegistrationPolicy,
    RegistrySet, RunState, VERSION,
};

#[test]
fn scenarios_binary_smoke_runs() {
    assert!(!VERSION.is_empty());
}

fn full_surfaces(analytics: Arc<RecordingAnalytics>) -> PortalSurfaces {
    PortalSurfaces::empty()
        .with_ui(Arc::new(RecordingUi::new()))
        .with_features(Arc::new(RecordingFeatures::new()))
        .with_integrations(Arc::new(RecordingIntegrations::supporting(&IntegrationKind::ALL)))
        .with_analytics(analytics)
        .with_platform(Arc::new(StaticPlatform {
            service_worker: true,
            manifest_link: true,
            notification_api: true,
        }))
}

#[tokio::test(start_paused = true)]
async fn fully_equipped_portal_initializes_every_capability() {
    let analytics = Arc::new(RecordingAnalytics::ready());
    let mut orchestrator = PortalOrchestrator::with_standard_catalog(
        full_surfaces(analytics.clone()),
        PortalPreferences::default(),
    )
    .unwrap();

    let outcome = orchestrator.initialize_portal().await;

    let report = outcome.report().unwrap();
    let phases = report
        .phases
        .iter()
        .map(|report| report.phase)
        .collect::<Vec<_>>();
    assert_eq!(phases, Phase::ORDER.to_vec());
    assert_eq!(report.stats.total_components, 17);
    assert_eq!(report.stats.success_rate, 1.0);
    assert_eq!(orchestrator.state(), RunState::Complete);
    assert_eq!(orchestrator.presentation(), Some(PresentationTier::Modal));

    let events = analytics.events();
    assert_eq!(events.last().unwrap().0, "portal_initialized");
    assert_eq!(events.last().unwrap().1["success_components"], 17);
}

#[tokio::test(start_paused = true)]
async fn partial_ui_bundle_degrades_summary_to_alert() {
    let ui = Arc::new(
        RecordingUi::new()
            .without(UiComponent::Modal)
            .without(UiComponent::Chart),
    );
    let mut orchestrator = PortalOrchestrator::with_standard_catalog(
        PortalSurfaces::empty().with_ui(ui.clone()),
        PortalPreferences::default(),
    )
    .unwrap();

    let outcome = orchestrator.initialize_portal().await;

    let components = outcome.report().unwrap().phase(Phase::Components).unwrap().clone();
    let statuses = components
        .results
        .iter()
        .map(|result| (result.name.as_str(), result.status.clone()))
        .collect::<Vec<_>>();
    assert_eq!(
        statuses,
        vec![
            ("modal", ProbeStatus::Failed),
            ("alert", ProbeStatus::Success),
            ("card", ProbeStatus::Success),
            ("chart", ProbeStatus::Failed),
            ("calendar", ProbeStatus::Success),
        ]
    );
    assert_eq!(orchestrator.presentation(), Some(PresentationTier::Alert));
    assert!(!ui.calls().iter().any(|call| call.starts_with("modal")));
}

#[tokio::test(start_paused = true)]
async fn missing_analytics_still_computes_stats() {
    let sink = Arc::new(RecordingAlertSink::default());
    let mut orchestrator = PortalOrchestrator::with_standard_catalog(
        PortalSurfaces::empty().with_fallback_alert(sink.clone()),
        PortalPreferences {
            readiness_timeout_ms: 300,
            ..PortalPreferences::default()
        },
    )
    .unwrap();

    let outcome = orchestrator.initialize_portal().await;

    let stats = outcome.report().unwrap().stats;
    assert_eq!(stats.total_components, 17);
    assert_eq!(stats.success_components, 0);
    assert_eq!(
        stats.total_components,
        stats.failed_components + stats.not_supported_components
    );
    assert_eq!(stats.init_time_ms, 300);
    assert_eq!(orchestrator.presentation(), Some(PresentationTier::Fallback));
    assert_eq!(sink.messages().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failing_probe_does_not_stop_later_phases() {
    let mut registries = RegistrySet::empty(RegistrationPolicy::default());
    let later = Arc::new(AtomicUsize::new(0));
    registries
        .registry_mut(Phase::Components)
        .unwrap()
        .register(
            "chart",
            CapabilityDescriptor::from_sync(|| true, || Err("chart bundle 404".into())),
        )
        .unwrap();
    let counter = Arc::clone(&later);
    registries
        .registry_mut(Phase::Integrations)
        .unwrap()
        .register(
            "email",
            CapabilityDescriptor::from_sync(
                || true,
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
            ),
        )
        .unwrap();
    let mut orchestrator = PortalOrchestrator::new(
        registries,
        PortalSurfaces::empty(),
        PortalPreferences {
            readiness_timeout_ms: 0,
            ..PortalPreferences::default()
        },
    );

    let outcome = orchestrator.initialize_portal().await;

    let report = outcome.report().unwrap();
    assert_eq!(later.load(Ordering::SeqCst), 1);
    assert_eq!(
        report.phase(Phase::Components).unwrap().results[0].status,
        ProbeStatus::Error("chart bundle 404".to_string())
    );
    assert!(report.probe_succeeded(Phase::Integrations, "email"));
    assert_eq!(report.stats.success_rate, 0.5);
}

#[test]
fn strict_preferences_reject_duplicate_registrations() {
    let prefs = PortalPreferences {
        registration_policy: RegistrationPolicy::RejectDuplicates,
        ..PortalPreferences::default()
    };
    let mut registries = RegistrySet::standard(&PortalSurfaces::empty(), &prefs).unwrap();

    let error = registries
        .registry_mut(Phase::Components)
        .unwrap()
        .register("modal", CapabilityDescriptor::presence_only(|| true))
        .unwrap_err();
    assert!(matches!(error, RegistrationError::Duplicate { .. }));
}

#[tokio::test(start_paused = true)]
async fn entry_trigger_runs_once_and_details_render_after() {
    let mut orchestrator = PortalOrchestrator::with_standard_catalog(
        full_surfaces(Arc::new(RecordingAnalytics::ready())),
        PortalPreferences {
            settle_delay_ms: 20,
            ..PortalPreferences::default()
        },
    )
    .unwrap();
    let trigger = EntryTrigger::from_preferences(orchestrator.preferences());

    assert_eq!(
        orchestrator.show_initialization_details(),
        DetailsView::NotInitialized
    );
    let first = trigger
        .fire_when_ready(tokio::time::sleep(Duration::from_millis(5)), &mut orchestrator)
        .await;
    let second = trigger
        .fire_when_ready(std::future::ready(()), &mut orchestrator)
        .await;

    assert!(first.is_some());
    assert!(second.is_none());
    let details = orchestrator.show_initialization_details().render_text();
    assert!(details.starts_with("Portal initialization details\nUI components: 5/5 passed"));
    assert!(details.ends_with("17/17 components ready (100.0%) in 0 ms"));
}

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use std::{env, io};

use bpaf::Bpaf;

use crate::prefs::{ENV_KEYS, ENV_TRACING_FILTER, PortalPreferences};
use crate::shell::portal::host::EntryTrigger;
use crate::shell::portal::host::demo::{attach_analytics_later, demo_surfaces};
use crate::shell::portal::runtime::channels::CHANNEL_STARTUP_CONFIG_SNAPSHOT;
use crate::shell::portal::runtime::diagnostics::{DiagnosticsState, emit_message};
use crate::shell::portal::runtime::orchestrator::{
    InitializationOutcome, PortalInitError, PortalOrchestrator,
};

const DEMO_ANALYTICS_DELAY: Duration = Duration::from_millis(300);

/// Runs the portal initialization sequence against in-process demo surfaces.
#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
pub struct CliOptions {
    /// Preferences file (defaults to the user config dir)
    #[bpaf(long, argument("PATH"))]
    pub config: Option<PathBuf>,
    /// Tracing filter directives, e.g. `portalshell=debug`
    #[bpaf(long("tracing-filter"), argument("FILTER"))]
    pub tracing_filter: Option<String>,
    /// Never attach the demo analytics collector
    #[bpaf(long("without-analytics"), switch)]
    pub without_analytics: bool,
    /// Print the per-phase breakdown after the run
    #[bpaf(long, switch)]
    pub details: bool,
    /// Print the report and diagnostics snapshot as JSON
    #[bpaf(long, switch)]
    pub json: bool,
}

pub fn main() -> ExitCode {
    let options = cli_options().run();

    let prefs = match PortalPreferences::load(options.config.as_deref()) {
        Ok(prefs) => prefs,
        Err(error) => {
            eprintln!("portalshell: {error}");
            return ExitCode::FAILURE;
        }
    };

    let filter = options
        .tracing_filter
        .clone()
        .or_else(|| prefs.tracing_filter.clone());
    crate::init_tracing(filter.as_deref());

    let mut diagnostics = DiagnosticsState::new();
    emit_startup_env_snapshot();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("portalshell: failed to start runtime: {error}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = match runtime.block_on(run_demo(&options, prefs)) {
        Ok(outcome) => outcome,
        Err(error) => {
            eprintln!("portalshell: {error}");
            return ExitCode::FAILURE;
        }
    };
    diagnostics.drain();

    match &outcome {
        InitializationOutcome::Completed(report) if options.json => {
            let document = serde_json::json!({
                "report": report.to_json(),
                "diagnostics": diagnostics.snapshot_json(),
            });
            println!("{document:#}");
        }
        InitializationOutcome::Completed(report) => {
            println!("{}", report.stats.summary_text());
        }
        InitializationOutcome::Aborted(error) => {
            eprintln!("portalshell: initialization aborted: {error}");
        }
    }

    match outcome {
        InitializationOutcome::Completed(_) => ExitCode::SUCCESS,
        InitializationOutcome::Aborted(_) => ExitCode::FAILURE,
    }
}

async fn run_demo(
    options: &CliOptions,
    prefs: PortalPreferences,
) -> Result<InitializationOutcome, io::Error> {
    let surfaces = demo_surfaces();
    let attach = (!options.without_analytics)
        .then(|| attach_analytics_later(surfaces.analytics.clone(), DEMO_ANALYTICS_DELAY));

    let trigger = EntryTrigger::from_preferences(&prefs);
    let mut orchestrator = PortalOrchestrator::with_standard_catalog(surfaces, prefs)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

    let outcome = trigger
        .fire_when_ready(std::future::ready(()), &mut orchestrator)
        .await
        .unwrap_or(InitializationOutcome::Aborted(PortalInitError::AlreadyStarted));

    if options.details && !options.json {
        println!("{}", orchestrator.show_initialization_details());
    }
    if let Some(attach) = attach {
        attach.abort();
    }
    Ok(outcome)
}

fn emit_startup_env_snapshot() {
    let keys = ENV_KEYS
        .into_iter()
        .filter(|key| env::var(key).is_ok())
        .collect::<Vec<_>>();
    if keys.is_empty() {
        return;
    }
    if keys.contains(&ENV_TRACING_FILTER) {
        log::debug!("tracing filter taken from {ENV_TRACING_FILTER}");
    }
    emit_message(CHANNEL_STARTUP_CONFIG_SNAPSHOT, &keys.join(","));
}

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Portal preferences.
//!
//! Layered as defaults, then an optional TOML file, then `PORTAL_*`
//! environment overrides. Malformed files are errors; malformed environment
//! values are logged and ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registries::atomic::capability::RegistrationPolicy;
use crate::shell::portal::runtime::channels::CHANNEL_STARTUP_CONFIG_INVALID;
use crate::shell::portal::runtime::diagnostics::emit_message;

pub const ENV_READINESS_TIMEOUT_MS: &str = "PORTAL_READINESS_TIMEOUT_MS";
pub const ENV_READINESS_POLL_MS: &str = "PORTAL_READINESS_POLL_MS";
pub const ENV_SETTLE_DELAY_MS: &str = "PORTAL_SETTLE_DELAY_MS";
pub const ENV_SUCCESS_THRESHOLD: &str = "PORTAL_SUCCESS_THRESHOLD";
pub const ENV_REGISTRATION_POLICY: &str = "PORTAL_REGISTRATION_POLICY";
pub const ENV_TRACING_FILTER: &str = "PORTAL_TRACING_FILTER";

pub const ENV_KEYS: [&str; 6] = [
    ENV_READINESS_TIMEOUT_MS,
    ENV_READINESS_POLL_MS,
    ENV_SETTLE_DELAY_MS,
    ENV_SUCCESS_THRESHOLD,
    ENV_REGISTRATION_POLICY,
    ENV_TRACING_FILTER,
];

const CONFIG_DIR_NAME: &str = "portalshell";
const CONFIG_FILE_NAME: &str = "portal.toml";

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to read preferences from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid preferences file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for `{key}`: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalPreferences {
    pub readiness_timeout_ms: u64,
    pub readiness_poll_interval_ms: u64,
    /// Delay between the readiness signal and the first phase.
    pub settle_delay_ms: u64,
    /// Minimum success rate for a "success" toned summary.
    pub success_threshold: f64,
    pub registration_policy: RegistrationPolicy,
    pub dashboard_container: String,
    pub appointments_container: String,
    pub telemetry_event: String,
    pub page_name: String,
    pub tracing_filter: Option<String>,
}

impl Default for PortalPreferences {
    fn default() -> Self {
        Self {
            readiness_timeout_ms: 2000,
            readiness_poll_interval_ms: 100,
            settle_delay_ms: 0,
            success_threshold: 0.8,
            registration_policy: RegistrationPolicy::LastWriterWins,
            dashboard_container: "dashboard-container".to_string(),
            appointments_container: "appointments-container".to_string(),
            telemetry_event: "portal_initialized".to_string(),
            page_name: "portal".to_string(),
            tracing_filter: None,
        }
    }
}

impl PortalPreferences {
    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }

    pub fn readiness_poll_interval(&self) -> Duration {
        Duration::from_millis(self.readiness_poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// `$CONFIG_DIR/portalshell/portal.toml`, when the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn from_toml_str(path: &Path, contents: &str) -> Result<Self, PreferencesError> {
        let prefs: Self = toml::from_str(contents).map_err(|source| PreferencesError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        prefs.validate()?;
        Ok(prefs)
    }

    pub fn from_file(path: &Path) -> Result<Self, PreferencesError> {
        let contents = fs::read_to_string(path).map_err(|source| PreferencesError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(path, &contents)
    }

    /// Loads preferences for the current process.
    ///
    /// An explicit path must exist. Without one, the default config path is
    /// used when present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, PreferencesError> {
        let mut prefs = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        prefs.apply_env_overrides(|key| env::var(key).ok());
        Ok(prefs)
    }

    pub fn validate(&self) -> Result<(), PreferencesError> {
        if !(0.0..=1.0).contains(&self.success_threshold) {
            return Err(PreferencesError::InvalidValue {
                key: "success_threshold",
                value: self.success_threshold.to_string(),
            });
        }
        if self.dashboard_container.trim().is_empty() {
            return Err(PreferencesError::InvalidValue {
                key: "dashboard_container",
                value: self.dashboard_container.clone(),
            });
        }
        if self.appointments_container.trim().is_empty() {
            return Err(PreferencesError::InvalidValue {
                key: "appointments_container",
                value: self.appointments_container.clone(),
            });
        }
        Ok(())
    }

    /// Applies `PORTAL_*` overrides read through `lookup` and returns the keys
    /// that took effect.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Vec<&'static str>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = Vec::new();
        for key in ENV_KEYS {
            let Some(raw) = lookup(key) else {
                continue;
            };
            let value = raw.trim();
            let accepted = match key {
                ENV_READINESS_TIMEOUT_MS => parse_millis(value)
                    .map(|ms| self.readiness_timeout_ms = ms)
                    .is_some(),
                ENV_READINESS_POLL_MS => parse_millis(value)
                    .map(|ms| self.readiness_poll_interval_ms = ms)
                    .is_some(),
                ENV_SETTLE_DELAY_MS => parse_millis(value)
                    .map(|ms| self.settle_delay_ms = ms)
                    .is_some(),
                ENV_SUCCESS_THRESHOLD => value
                    .parse::<f64>()
                    .ok()
                    .filter(|threshold| (0.0..=1.0).contains(threshold))
                    .map(|threshold| self.success_threshold = threshold)
                    .is_some(),
                ENV_REGISTRATION_POLICY => parse_policy(value)
                    .map(|policy| self.registration_policy = policy)
                    .is_some(),
                ENV_TRACING_FILTER => {
                    if value.is_empty() {
                        false
                    } else {
                        self.tracing_filter = Some(value.to_string());
                        true
                    }
                }
                _ => false,
            };

            if accepted {
                applied.push(key);
            } else {
                log::warn!("{key} invalid ('{value}'); keeping configured value");
                emit_message(CHANNEL_STARTUP_CONFIG_INVALID, key);
            }
        }
        applied
    }
}

fn parse_millis(value: &str) -> Option<u64> {
    value.parse::<u64>().ok()
}

fn parse_policy(value: &str) -> Option<RegistrationPolicy> {
    match value.to_ascii_lowercase().as_str() {
        "last_writer_wins" | "last-writer-wins" | "overwrite" => {
            Some(RegistrationPolicy::LastWriterWins)
        }
        "reject_duplicates" | "reject-duplicates" | "strict" => {
            Some(RegistrationPolicy::RejectDuplicates)
        }
        "keep_existing" | "keep-existing" | "first" => Some(RegistrationPolicy::KeepExisting),
        _ => None,
    }
}

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Named capability registries.
//!
//! A registry maps a symbolic capability name to a [`CapabilityDescriptor`]
//! and remembers registration order. The phase runner walks a registry front
//! to back, so this order is also the order of the rendered report.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shell::portal::runtime::channels::{
    CHANNEL_CAPABILITY_OVERWRITTEN, CHANNEL_CAPABILITY_REGISTERED, CHANNEL_CAPABILITY_REJECTED,
};
use crate::shell::portal::runtime::diagnostics::{DiagnosticEvent, emit_event};

pub type PresenceCheck = Arc<dyn Fn() -> bool + Send + Sync>;
pub type InitFuture = BoxFuture<'static, Result<(), ProbeError>>;
pub type Initializer = Arc<dyn Fn() -> InitFuture + Send + Sync>;

/// Failure reported by a capability initializer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProbeError {
    message: String,
}

impl ProbeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for ProbeError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ProbeError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Status recorded when a capability's presence check returns false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeAbsence {
    #[default]
    Failed,
    /// Reserved for platform features the browser may simply lack
    /// (Notification API, service workers).
    NotSupported,
}

/// A presence check paired with the initializer it guards.
#[derive(Clone)]
pub struct CapabilityDescriptor {
    presence_check: PresenceCheck,
    initializer: Initializer,
    absence: ProbeAbsence,
}

impl CapabilityDescriptor {
    pub fn new<P, I, F>(presence_check: P, initializer: I) -> Self
    where
        P: Fn() -> bool + Send + Sync + 'static,
        I: Fn() -> F + Send + Sync + 'static,
        F: Future<Output = Result<(), ProbeError>> + Send + 'static,
    {
        Self {
            presence_check: Arc::new(presence_check),
            initializer: Arc::new(move || initializer().boxed()),
            absence: ProbeAbsence::Failed,
        }
    }

    /// Wraps a synchronous initializer so it shares the async invocation path.
    pub fn from_sync<P, I>(presence_check: P, initializer: I) -> Self
    where
        P: Fn() -> bool + Send + Sync + 'static,
        I: Fn() -> Result<(), ProbeError> + Send + Sync + 'static,
    {
        Self::new(presence_check, move || future::ready(initializer()))
    }

    /// Presence-only capability: nothing to initialize once detected.
    pub fn presence_only<P>(presence_check: P) -> Self
    where
        P: Fn() -> bool + Send + Sync + 'static,
    {
        Self::from_sync(presence_check, || Ok(()))
    }

    pub fn not_supported_when_absent(mut self) -> Self {
        self.absence = ProbeAbsence::NotSupported;
        self
    }

    pub fn is_present(&self) -> bool {
        (self.presence_check)()
    }

    pub fn initialize(&self) -> InitFuture {
        (self.initializer)()
    }

    pub fn absence(&self) -> ProbeAbsence {
        self.absence
    }
}

impl fmt::Debug for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityDescriptor")
            .field("absence", &self.absence)
            .finish_non_exhaustive()
    }
}

/// How a registry treats a second registration under an existing name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationPolicy {
    /// Replace the descriptor in place and log a warning.
    #[default]
    LastWriterWins,
    /// Strict mode: refuse the second registration.
    RejectDuplicates,
    /// Ignore the second registration.
    KeepExisting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Inserted,
    Replaced,
    Kept,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("capability name must not be empty")]
    EmptyName,
    #[error("capability `{name}` is already registered in the {registry} registry")]
    Duplicate { registry: &'static str, name: String },
}

/// Ordered name → descriptor map for one category of optional subsystem.
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    label: &'static str,
    policy: RegistrationPolicy,
    entries: Vec<(String, CapabilityDescriptor)>,
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    pub fn new(label: &'static str) -> Self {
        Self::with_policy(label, RegistrationPolicy::default())
    }

    pub fn with_policy(label: &'static str, policy: RegistrationPolicy) -> Self {
        Self {
            label,
            policy,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    /// Registers `descriptor` under `name`.
    ///
    /// A replaced descriptor keeps the slot of the original registration, so
    /// report order stays stable across overwrites.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        descriptor: CapabilityDescriptor,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistrationError::EmptyName);
        }

        let existing = self.index.get(&name).copied();
        let Some(slot) = existing else {
            emit_event(DiagnosticEvent::MessageSent {
                channel_id: CHANNEL_CAPABILITY_REGISTERED,
                byte_len: self.label.len() + name.len(),
            });
            self.index.insert(name.clone(), self.entries.len());
            self.entries.push((name, descriptor));
            return Ok(RegistrationOutcome::Inserted);
        };

        match self.policy {
            RegistrationPolicy::LastWriterWins => {
                log::warn!(
                    "{} registry: `{name}` registered twice; keeping the latest descriptor",
                    self.label
                );
                emit_event(DiagnosticEvent::MessageSent {
                    channel_id: CHANNEL_CAPABILITY_OVERWRITTEN,
                    byte_len: self.label.len() + name.len(),
                });
                self.entries[slot].1 = descriptor;
                Ok(RegistrationOutcome::Replaced)
            }
            RegistrationPolicy::KeepExisting => {
                log::debug!(
                    "{} registry: ignoring second registration of `{name}`",
                    self.label
                );
                Ok(RegistrationOutcome::Kept)
            }
            RegistrationPolicy::RejectDuplicates => {
                emit_event(DiagnosticEvent::MessageSent {
                    channel_id: CHANNEL_CAPABILITY_REJECTED,
                    byte_len: self.label.len() + name.len(),
                });
                Err(RegistrationError::Duplicate {
                    registry: self.label,
                    name,
                })
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&CapabilityDescriptor> {
        self.index
            .get(name)
            .and_then(|slot| self.entries.get(*slot))
            .map(|(_, descriptor)| descriptor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CapabilityDescriptor)> {
        self.entries
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn marker(counter: &Arc<AtomicUsize>) -> CapabilityDescriptor {
        let counter = Arc::clone(counter);
        CapabilityDescriptor::from_sync(
            || true,
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
    }

    #[test]
    fn registry_preserves_registration_order() {
        let mut registry = CapabilityRegistry::new("components");
        for name in ["modal", "alert", "card", "chart", "calendar"] {
            registry
                .register(name, CapabilityDescriptor::presence_only(|| true))
                .expect("fresh names register");
        }

        let names = registry.names().collect::<Vec<_>>();
        assert_eq!(names, vec!["modal", "alert", "card", "chart", "calendar"]);
        assert_eq!(registry.len(), 5);
        assert!(registry.get("chart").is_some());
        assert!(registry.get("spreadsheet").is_none());
    }

    #[tokio::test]
    async fn last_writer_wins_replaces_in_place() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut registry = CapabilityRegistry::new("features");
        registry.register("dashboard", marker(&first)).unwrap();
        registry
            .register("notifications", CapabilityDescriptor::presence_only(|| true))
            .unwrap();

        let outcome = registry.register("dashboard", marker(&second)).unwrap();
        assert_eq!(outcome, RegistrationOutcome::Replaced);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["dashboard", "notifications"]
        );

        registry
            .get("dashboard")
            .unwrap()
            .initialize()
            .await
            .unwrap();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn strict_policy_rejects_duplicates() {
        let mut registry =
            CapabilityRegistry::with_policy("integrations", RegistrationPolicy::RejectDuplicates);
        registry
            .register("email", CapabilityDescriptor::presence_only(|| true))
            .unwrap();

        let error = registry
            .register("email", CapabilityDescriptor::presence_only(|| false))
            .expect_err("duplicate must be rejected");
        assert_eq!(
            error,
            RegistrationError::Duplicate {
                registry: "integrations",
                name: "email".to_string(),
            }
        );
        assert!(registry.get("email").unwrap().is_present());
    }

    #[test]
    fn keep_existing_ignores_second_registration() {
        let mut registry =
            CapabilityRegistry::with_policy("integrations", RegistrationPolicy::KeepExisting);
        registry
            .register("payment", CapabilityDescriptor::presence_only(|| true))
            .unwrap();
        let outcome = registry
            .register("payment", CapabilityDescriptor::presence_only(|| false))
            .unwrap();

        assert_eq!(outcome, RegistrationOutcome::Kept);
        assert!(registry.get("payment").unwrap().is_present());
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut registry = CapabilityRegistry::new("components");
        assert_eq!(
            registry.register("  ", CapabilityDescriptor::presence_only(|| true)),
            Err(RegistrationError::EmptyName)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn absence_defaults_to_failed() {
        let descriptor = CapabilityDescriptor::presence_only(|| false);
        assert_eq!(descriptor.absence(), ProbeAbsence::Failed);
        assert_eq!(
            descriptor.not_supported_when_absent().absence(),
            ProbeAbsence::NotSupported
        );
    }
}

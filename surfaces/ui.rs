/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Duration;

use serde::Serialize;

use super::SurfaceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UiComponent {
    Modal,
    Alert,
    Card,
    Chart,
    Calendar,
}

impl UiComponent {
    pub const ALL: [UiComponent; 5] = [
        UiComponent::Modal,
        UiComponent::Alert,
        UiComponent::Card,
        UiComponent::Chart,
        UiComponent::Calendar,
    ];

    pub fn capability_name(self) -> &'static str {
        match self {
            UiComponent::Modal => "modal",
            UiComponent::Alert => "alert",
            UiComponent::Card => "card",
            UiComponent::Chart => "chart",
            UiComponent::Calendar => "calendar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertAction {
    Dismiss,
    /// Reload the page and run the whole initialization sequence again.
    Reload,
    ShowDetails,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModalOptions {
    pub title: String,
    pub body: String,
    pub tone: Tone,
    pub actions: Vec<AlertAction>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlertOptions {
    pub title: String,
    pub message: String,
    pub tone: Tone,
    pub actions: Vec<AlertAction>,
    pub dismiss_after: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardOptions {
    pub container: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartOptions {
    pub container: String,
    pub title: String,
    pub series: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalendarOptions {
    pub container: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertHandle {
    pub id: u64,
}

pub trait ModalHandle: Send {
    fn open(&mut self) -> Result<(), SurfaceError>;
    fn close(&mut self) -> Result<(), SurfaceError>;
}

pub trait Mountable: Send {
    fn mount(&mut self) -> Result<(), SurfaceError>;
}

/// Component library exposed by the portal's UI bundle.
pub trait UiSurface: Send + Sync {
    /// Whether this bundle ships `component`. Bundles may be partial.
    fn supports(&self, component: UiComponent) -> bool {
        let _ = component;
        true
    }

    /// Prepares a component for use (styles, root nodes). Called once during
    /// the components phase for modal, alert and card.
    fn install(&self, component: UiComponent) -> Result<(), SurfaceError> {
        let _ = component;
        Ok(())
    }

    fn show_modal(&self, options: ModalOptions) -> Result<Box<dyn ModalHandle>, SurfaceError>;
    fn show_alert(&self, options: AlertOptions) -> Result<AlertHandle, SurfaceError>;
    fn create_card(&self, options: CardOptions) -> Result<(), SurfaceError>;
    fn create_chart(&self, options: ChartOptions) -> Result<Box<dyn Mountable>, SurfaceError>;
    fn create_calendar(&self, options: CalendarOptions)
    -> Result<Box<dyn Mountable>, SurfaceError>;
}

/// Last-resort message sink used when no UI component could be confirmed.
pub trait FallbackAlert: Send + Sync {
    fn alert(&self, message: &str);
}

/// Writes fallback alerts to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlert;

impl FallbackAlert for LogAlert {
    fn alert(&self, message: &str) {
        log::warn!("portal alert: {message}");
    }
}

//! Commands that drive host-side UI chrome and settings

use serde::{Deserialize, Serialize};

use super::{Command, SHOW_SETTINGS, UPDATE_CONFIGURATION, UPDATE_STATUS_BAR};

/// Body of commands that carry no data (`{}` on the wire)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// Persist the UI's settings form on the host
pub struct UpdateConfiguration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateConfigurationRequest {
    pub configuration: BridgeConfiguration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BridgeConfiguration {
    pub skip_restore: bool,
    pub enable_package_version_inline_info: bool,
    pub prerelease: bool,
    #[serde(default)]
    pub sources: Vec<SourceConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceConfiguration {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_script_path: Option<String>,
}

impl Command for UpdateConfiguration {
    const NAME: &'static str = UPDATE_CONFIGURATION;
    type Request = UpdateConfigurationRequest;
    type Response = Empty;
}

/// Host asks the UI to navigate to its settings view
pub struct ShowSettings;

impl Command for ShowSettings {
    const NAME: &'static str = SHOW_SETTINGS;
    type Request = Empty;
    type Response = Empty;
}

/// UI reports long-running progress for the host's status bar
pub struct UpdateStatusBar;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateStatusBarRequest {
    /// `None` hides the indicator
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Command for UpdateStatusBar {
    const NAME: &'static str = UPDATE_STATUS_BAR;
    type Request = UpdateStatusBarRequest;
    type Response = Empty;
}

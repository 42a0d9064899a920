//! Typed command triples
//!
//! A command is a `(name, request schema, response schema)` triple. The
//! mediator only ever sees the name and opaque JSON bodies; these types let
//! both sides agree on the body shapes at compile time.

use serde::Serialize;
use serde::de::DeserializeOwned;

mod diagnostics;
mod host;
mod packages;

pub use diagnostics::{Echo, Ping, PingResponse};
pub use host::{
    BridgeConfiguration, Empty, ShowSettings, SourceConfiguration, UpdateConfiguration, UpdateConfigurationRequest,
    UpdateStatusBar, UpdateStatusBarRequest,
};
pub use packages::{
    BatchUpdatePackages, BatchUpdateRequest, BatchUpdateResponse, ConsolidatePackages, ConsolidateRequest,
    ConsolidateResponse, GetInconsistentPackages, GetInconsistentPackagesRequest, GetInconsistentPackagesResponse,
    GetOutdatedPackages, GetOutdatedPackagesRequest, GetOutdatedPackagesResponse, GetProjects, GetProjectsRequest,
    GetProjectsResponse, HttpError, InconsistentPackage, InstalledPackage, OutdatedPackage, PackageUpdate,
    PackageUpdateResult, Project, ProjectRef, VersionUsage,
};

pub const ECHO: &str = "ECHO";
pub const PING: &str = "PING";
pub const GET_PROJECTS: &str = "GET_PROJECTS";
pub const GET_OUTDATED_PACKAGES: &str = "GET_OUTDATED_PACKAGES";
pub const GET_INCONSISTENT_PACKAGES: &str = "GET_INCONSISTENT_PACKAGES";
pub const BATCH_UPDATE_PACKAGES: &str = "BATCH_UPDATE_PACKAGES";
pub const CONSOLIDATE_PACKAGES: &str = "CONSOLIDATE_PACKAGES";
pub const UPDATE_CONFIGURATION: &str = "UPDATE_CONFIGURATION";
pub const SHOW_SETTINGS: &str = "SHOW_SETTINGS";
pub const UPDATE_STATUS_BAR: &str = "UPDATE_STATUS_BAR";

/// A command known to both sides of the bridge
pub trait Command: Send + Sync + 'static {
    /// Wire name carried in the `Command` header
    const NAME: &'static str;

    type Request: Serialize + DeserializeOwned + Send + Sync + 'static;
    type Response: Serialize + DeserializeOwned + Send + Sync + 'static;
}

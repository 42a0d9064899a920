//! Package-management commands answered by the host
//!
//! Only the schemas live here; resolving projects and talking to package
//! feeds is the business of whichever handler the host registers.

use serde::{Deserialize, Serialize};

use super::{
    BATCH_UPDATE_PACKAGES, CONSOLIDATE_PACKAGES, Command, GET_INCONSISTENT_PACKAGES, GET_OUTDATED_PACKAGES,
    GET_PROJECTS,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstalledPackage {
    pub id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub packages: Vec<InstalledPackage>,
    #[serde(default)]
    pub cpm_enabled: bool,
}

/// Project reference inside package reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectRef {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

pub struct GetProjects;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetProjectsRequest {
    #[serde(default)]
    pub force_reload: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetProjectsResponse {
    pub projects: Vec<Project>,
}

impl Command for GetProjects {
    const NAME: &'static str = GET_PROJECTS;
    type Request = GetProjectsRequest;
    type Response = GetProjectsResponse;
}

pub struct GetOutdatedPackages;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetOutdatedPackagesRequest {
    pub prerelease: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_paths: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutdatedPackage {
    pub id: String,
    pub installed_version: String,
    pub latest_version: String,
    pub projects: Vec<ProjectRef>,
    pub source_url: String,
    pub source_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetOutdatedPackagesResponse {
    pub is_failure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<OutdatedPackage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<HttpError>,
}

impl Command for GetOutdatedPackages {
    const NAME: &'static str = GET_OUTDATED_PACKAGES;
    type Request = GetOutdatedPackagesRequest;
    type Response = GetOutdatedPackagesResponse;
}

pub struct GetInconsistentPackages;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetInconsistentPackagesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_paths: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionUsage {
    pub version: String,
    pub projects: Vec<ProjectRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InconsistentPackage {
    pub id: String,
    pub versions: Vec<VersionUsage>,
    pub latest_installed_version: String,
    pub cpm_managed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetInconsistentPackagesResponse {
    pub is_failure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<InconsistentPackage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<HttpError>,
}

impl Command for GetInconsistentPackages {
    const NAME: &'static str = GET_INCONSISTENT_PACKAGES;
    type Request = GetInconsistentPackagesRequest;
    type Response = GetInconsistentPackagesResponse;
}

pub struct BatchUpdatePackages;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageUpdate {
    pub package_id: String,
    pub version: String,
    pub project_paths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchUpdateRequest {
    pub updates: Vec<PackageUpdate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageUpdateResult {
    pub package_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchUpdateResponse {
    pub results: Vec<PackageUpdateResult>,
}

impl Command for BatchUpdatePackages {
    const NAME: &'static str = BATCH_UPDATE_PACKAGES;
    type Request = BatchUpdateRequest;
    type Response = BatchUpdateResponse;
}

pub struct ConsolidatePackages;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConsolidateRequest {
    pub package_id: String,
    pub target_version: String,
    pub project_paths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConsolidateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Command for ConsolidatePackages {
    const NAME: &'static str = CONSOLIDATE_PACKAGES;
    type Request = ConsolidateRequest;
    type Response = ConsolidateResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outdated_request_omits_absent_project_paths() {
        let req = GetOutdatedPackagesRequest {
            prerelease: true,
            project_paths: None,
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"Prerelease":true}"#);
    }

    #[test]
    fn test_batch_update_response_deserialize() {
        let json = r#"{"Results":[{"PackageId":"Newtonsoft.Json","Success":false,"Error":"restore failed"}]}"#;
        let res: BatchUpdateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(res.results.len(), 1);
        assert_eq!(res.results[0].package_id, "Newtonsoft.Json");
        assert_eq!(res.results[0].error.as_deref(), Some("restore failed"));
    }

    #[test]
    fn test_failure_response_carries_error() {
        let json = r#"{"IsFailure":true,"Error":{"Message":"Failed to check for outdated packages"}}"#;
        let res: GetOutdatedPackagesResponse = serde_json::from_str(json).unwrap();
        assert!(res.is_failure);
        assert!(res.packages.is_none());
        assert_eq!(res.error.unwrap().message, "Failed to check for outdated packages");
    }
}

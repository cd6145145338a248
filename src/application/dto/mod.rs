use crate::domain::entities::{InstallationResult, Package, SystemInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDto {
    pub name: String,
    pub source: String,
    pub method: String,
    pub version: String,
    pub group: Option<String>,
}

impl From<Package> for PackageDto {
    fn from(package: Package) -> Self {
        Self {
            name: package.name,
            source: package.source,
            method: package.method.to_string(),
            version: package.version,
            group: package.group,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationResultDto {
    pub package: PackageDto,
    pub success: bool,
    pub outcome: String,
    pub error: Option<String>,
    pub output: String,
    pub duration_ms: u128,
    pub finished_at: DateTime<Utc>,
}

impl From<&InstallationResult> for InstallationResultDto {
    fn from(result: &InstallationResult) -> Self {
        Self {
            package: result.package.clone().into(),
            success: result.success,
            outcome: result.outcome.to_string(),
            error: result.error_message(),
            output: result.output.clone(),
            duration_ms: result.duration_ms(),
            finished_at: result.finished_at,
        }
    }
}

/// Everything a `--json` run prints for a batch of installations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationReportDto {
    pub results: Vec<InstallationResultDto>,
    pub succeeded: usize,
    pub failed: usize,
}

impl InstallationReportDto {
    pub fn from_results(results: &[InstallationResult]) -> Self {
        let results: Vec<InstallationResultDto> = results.iter().map(Into::into).collect();
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            failed: results.len() - succeeded,
            succeeded,
            results,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfoDto {
    pub distribution: String,
    pub version: String,
    pub codename: String,
    pub family: String,
    pub package_manager: String,
    pub preferred_method: String,
    pub desktop_environment: Option<String>,
    pub architecture: String,
    pub kernel: String,
}

impl From<&SystemInfo> for SystemInfoDto {
    fn from(info: &SystemInfo) -> Self {
        Self {
            distribution: info.distribution.id.clone(),
            version: info.distribution.version.clone(),
            codename: info.distribution.codename.clone(),
            family: info.distribution.family.to_string(),
            package_manager: info.package_manager.name.clone(),
            preferred_method: info.preferred_method().to_string(),
            desktop_environment: info.desktop_environment.clone(),
            architecture: info.architecture.clone(),
            kernel: info.kernel.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{InstallMethod, InstallOutcome};
    use crate::domain::errors::InstallError;

    #[test]
    fn report_counts_and_serializes_errors_as_text() {
        let ok = InstallationResult::begin(Package::new("vim", "vim", InstallMethod::Apt))
            .succeed(InstallOutcome::AlreadyPresent);
        let failed = InstallationResult::begin(Package::new("gradle", "gradle/gradle", InstallMethod::GitHubJava))
            .fail(InstallError::not_implemented("GitHubJava installation for gradle"));

        let report = InstallationReportDto::from_results(&[ok, failed]);
        assert_eq!((report.succeeded, report.failed), (1, 1));
        assert!(!report.all_succeeded());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"][0]["outcome"], "already present");
        assert_eq!(json["results"][1]["package"]["method"], "github-java");
        assert_eq!(
            json["results"][1]["error"],
            "GitHubJava installation for gradle is not implemented"
        );
    }
}

use super::Installer;
use crate::application::detection::aqua_environment;
use crate::domain::context::Context;
use crate::domain::entities::{InstallAttempt, InstallMethod, Package};
use crate::domain::errors::{InstallError, InstallResult};
use crate::domain::ports::Invocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The subset of `aqua.yaml` the installer edits; other keys are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AquaConfig {
    #[serde(default)]
    pub registries: Vec<AquaRegistry>,
    #[serde(default)]
    pub packages: Vec<AquaPackage>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AquaRegistry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AquaPackage {
    pub name: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl AquaConfig {
    /// A config that only knows the standard registry at `reference`.
    pub fn standard(reference: &str) -> Self {
        Self {
            registries: vec![AquaRegistry {
                kind: "standard".to_string(),
                reference: Some(reference.to_string()),
                extra: BTreeMap::new(),
            }],
            ..Self::default()
        }
    }

    /// Whether a package with this registry name is listed, pinned or not.
    pub fn contains(&self, source: &str) -> bool {
        self.packages
            .iter()
            .any(|p| p.name.split('@').next() == Some(source))
    }

    /// Appends `entry` unless its package is already listed.
    pub fn add(&mut self, entry: &str) -> bool {
        let source = entry.split('@').next().unwrap_or(entry);
        if self.contains(source) {
            return false;
        }
        self.packages.push(AquaPackage {
            name: entry.to_string(),
            extra: BTreeMap::new(),
        });
        true
    }
}

/// `owner/tool` or `owner/tool@version`.
pub(super) fn entry_name(package: &Package) -> String {
    match package.pinned_version() {
        Some(version) => format!("{}@{}", package.source, version),
        None => package.source.clone(),
    }
}

impl Installer {
    async fn load_aqua_config(&self) -> InstallResult<AquaConfig> {
        let path = self.paths.aqua_config();
        if !self.files.file_exists(&path).await {
            return Ok(AquaConfig::standard(&self.config.aqua_registry_ref));
        }
        let raw = self.files.read_file(&path).await?;
        serde_yaml::from_slice(&raw).map_err(|e| InstallError::Parse {
            what: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub(super) async fn install_aqua(
        &self,
        ctx: &Context,
        package: &Package,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<()> {
        self.require_tool("aqua", InstallMethod::Aqua)?;

        let path = self.paths.aqua_config();
        let mut config = self.load_aqua_config().await?;
        let entry = entry_name(package);
        if config.add(&entry) || !self.files.file_exists(&path).await {
            let yaml = serde_yaml::to_string(&config).map_err(|e| InstallError::Parse {
                what: "aqua configuration".to_string(),
                message: e.to_string(),
            })?;
            self.files.write_file(&path, yaml.as_bytes()).await?;
            attempt.log(format!("added {} to {}", entry, path.display()));
        }

        let install = Invocation::new("aqua")
            .args(["install", "--all"])
            .envs(&aqua_environment(&self.paths));
        self.run_logged(ctx, install, attempt).await?;
        Ok(())
    }
}

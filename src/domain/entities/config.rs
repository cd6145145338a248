use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_AQUA_REGISTRY_REF: &str = "v4.155.1";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct InstallerConfig {
    pub dry_run: bool,
    pub user_agent: String,
    pub download_timeout_secs: u64,
    pub large_download_timeout_secs: u64,
    pub aqua_registry_ref: String,
    pub local_bin_dir: Option<PathBuf>,
    pub local_share_dir: Option<PathBuf>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            user_agent: format!("devstrap/{}", env!("CARGO_PKG_VERSION")),
            download_timeout_secs: 120,
            large_download_timeout_secs: 15 * 60,
            aqua_registry_ref: DEFAULT_AQUA_REGISTRY_REF.to_string(),
            local_bin_dir: None,
            local_share_dir: None,
        }
    }
}

impl InstallerConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn large_download_timeout(&self) -> Duration {
        Duration::from_secs(self.large_download_timeout_secs)
    }
}

/// Filesystem locations the installer reads and writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallPaths {
    pub home: PathBuf,
    pub local_bin: PathBuf,
    pub local_share: PathBuf,
    pub config_home: PathBuf,
    pub temp_dir: PathBuf,
}

impl InstallPaths {
    pub fn resolve(config: &InstallerConfig, home: &Path, config_home: &Path, temp_dir: &Path) -> Self {
        Self {
            home: home.to_path_buf(),
            local_bin: config
                .local_bin_dir
                .clone()
                .unwrap_or_else(|| home.join(".local").join("bin")),
            local_share: config
                .local_share_dir
                .clone()
                .unwrap_or_else(|| home.join(".local").join("share")),
            config_home: config_home.to_path_buf(),
            temp_dir: temp_dir.to_path_buf(),
        }
    }

    /// Layout rooted entirely below `root`, used for sandboxed runs.
    pub fn under(root: &Path) -> Self {
        Self {
            home: root.to_path_buf(),
            local_bin: root.join(".local").join("bin"),
            local_share: root.join(".local").join("share"),
            config_home: root.join(".config"),
            temp_dir: root.join("tmp"),
        }
    }

    pub fn bin_path(&self, name: &str) -> PathBuf {
        self.local_bin.join(name)
    }

    pub fn share_path(&self, name: &str) -> PathBuf {
        self.local_share.join(name)
    }

    pub fn mise_config(&self) -> PathBuf {
        self.config_home.join("mise").join("config.toml")
    }

    pub fn aqua_config(&self) -> PathBuf {
        self.config_home.join("aquaproj-aqua").join("aqua.yaml")
    }

    pub fn aqua_root(&self) -> PathBuf {
        self.local_share.join("aquaproj-aqua")
    }
}

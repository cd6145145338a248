use crate::domain::entities::{
    DistroFamily, Distribution, InstallMethod, PackageManagerInfo, SystemInfo,
};
use crate::domain::ports::{CommandRunner, SystemDetector};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

const OS_RELEASE_FILES: [&str; 2] = ["etc/os-release", "usr/lib/os-release"];
const LSB_RELEASE_FILE: &str = "etc/lsb-release";
const KERNEL_RELEASE_FILE: &str = "proc/sys/kernel/osrelease";

/// (manager name, method, binary probed and invoked)
const KNOWN_MANAGERS: [(&str, InstallMethod, &str); 5] = [
    ("apt", InstallMethod::Apt, "apt-get"),
    ("dnf", InstallMethod::Dnf, "dnf"),
    ("yum", InstallMethod::Yum, "yum"),
    ("pacman", InstallMethod::Pacman, "pacman"),
    ("zypper", InstallMethod::Zypper, "zypper"),
];

pub struct OsSystemDetector {
    root: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl OsSystemDetector {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_root(PathBuf::from("/"), runner)
    }

    /// Reads release files relative to `root` instead of `/`.
    pub fn with_root(root: PathBuf, runner: Arc<dyn CommandRunner>) -> Self {
        Self { root, runner }
    }

    fn parse_key_values(content: &str) -> HashMap<String, String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                (key.trim().to_string(), value.to_string())
            })
            .collect()
    }

    pub fn parse_os_release(content: &str) -> Distribution {
        let fields = Self::parse_key_values(content);
        let get = |key: &str| fields.get(key).cloned().unwrap_or_default();

        let id = get("ID").to_ascii_lowercase();
        let codename = fields
            .get("VERSION_CODENAME")
            .or_else(|| fields.get("UBUNTU_CODENAME"))
            .cloned()
            .unwrap_or_default();

        Distribution {
            family: DistroFamily::classify(&id, &get("ID_LIKE")),
            id,
            version: get("VERSION_ID"),
            codename,
        }
    }

    pub fn parse_lsb_release(content: &str) -> Distribution {
        let fields = Self::parse_key_values(content);
        let get = |key: &str| fields.get(key).cloned().unwrap_or_default();
        let id = get("DISTRIB_ID").to_ascii_lowercase();

        Distribution {
            family: DistroFamily::classify(&id, ""),
            id,
            version: get("DISTRIB_RELEASE"),
            codename: get("DISTRIB_CODENAME"),
        }
    }

    /// First entry of `XDG_CURRENT_DESKTOP`, then the session variables.
    pub fn desktop_from_env<F>(lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        ["XDG_CURRENT_DESKTOP", "DESKTOP_SESSION", "GDMSESSION"]
            .iter()
            .filter_map(|key| lookup(key))
            .filter_map(|value| {
                value
                    .split(':')
                    .map(str::trim)
                    .find(|part| !part.is_empty())
                    .map(str::to_string)
            })
            .next()
    }

    async fn read_kernel(&self) -> String {
        match tokio::fs::read_to_string(self.root.join(KERNEL_RELEASE_FILE)).await {
            Ok(release) => release.trim().to_string(),
            Err(_) => "unknown".to_string(),
        }
    }
}

#[async_trait]
impl SystemDetector for OsSystemDetector {
    async fn detect_system(&self) -> Result<SystemInfo> {
        let distribution = self.detect_distribution().await?;
        let package_manager = self.detect_package_manager().await?;
        let info = SystemInfo {
            distribution,
            package_manager,
            desktop_environment: self.detect_desktop_environment().await,
            architecture: std::env::consts::ARCH.to_string(),
            kernel: self.read_kernel().await,
        };
        tracing::debug!(
            "Detected {} {} ({}) using {}",
            info.distribution.id,
            info.distribution.version,
            info.distribution.family,
            info.package_manager.name
        );
        Ok(info)
    }

    async fn detect_distribution(&self) -> Result<Distribution> {
        for file in OS_RELEASE_FILES {
            if let Ok(content) = tokio::fs::read_to_string(self.root.join(file)).await {
                return Ok(Self::parse_os_release(&content));
            }
        }
        if let Ok(content) = tokio::fs::read_to_string(self.root.join(LSB_RELEASE_FILE)).await {
            return Ok(Self::parse_lsb_release(&content));
        }
        tracing::warn!("No os-release or lsb-release file found under {}", self.root.display());
        Ok(Distribution::unknown())
    }

    async fn detect_desktop_environment(&self) -> Option<String> {
        Self::desktop_from_env(|key| std::env::var(key).ok())
    }

    async fn detect_package_manager(&self) -> Result<PackageManagerInfo> {
        let family = self.detect_distribution().await?.family;
        let preferred = PackageManagerInfo::default_for(family);
        if self.runner.command_exists(&preferred.command) {
            return Ok(preferred);
        }

        for (name, method, command) in KNOWN_MANAGERS {
            if self.runner.command_exists(command) {
                return Ok(PackageManagerInfo::new(name, method, command));
            }
        }

        tracing::warn!(
            "No known package manager found, assuming {} for the {} family",
            preferred.name,
            family
        );
        Ok(preferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockCommandRunner;

    const UBUNTU: &str = r#"PRETTY_NAME="Ubuntu 24.04 LTS"
NAME="Ubuntu"
VERSION_ID="24.04"
VERSION_CODENAME=noble
ID=ubuntu
ID_LIKE=debian
UBUNTU_CODENAME=noble
"#;

    const FEDORA: &str = "NAME=\"Fedora Linux\"\nVERSION_ID=40\nID=fedora\n";

    #[test]
    fn parses_ubuntu_os_release() {
        let distro = OsSystemDetector::parse_os_release(UBUNTU);
        assert_eq!(distro.id, "ubuntu");
        assert_eq!(distro.version, "24.04");
        assert_eq!(distro.codename, "noble");
        assert_eq!(distro.family, DistroFamily::Debian);
    }

    #[test]
    fn parses_lsb_release() {
        let distro = OsSystemDetector::parse_lsb_release(
            "DISTRIB_ID=Ubuntu\nDISTRIB_RELEASE=22.04\nDISTRIB_CODENAME=jammy\n",
        );
        assert_eq!(distro.id, "ubuntu");
        assert_eq!(distro.codename, "jammy");
        assert_eq!(distro.family, DistroFamily::Debian);
    }

    #[test]
    fn desktop_takes_first_xdg_entry() {
        let env = |key: &str| match key {
            "XDG_CURRENT_DESKTOP" => Some("ubuntu:GNOME".to_string()),
            _ => None,
        };
        assert_eq!(OsSystemDetector::desktop_from_env(env), Some("ubuntu".into()));

        let session_only = |key: &str| (key == "DESKTOP_SESSION").then(|| "plasma".to_string());
        assert_eq!(
            OsSystemDetector::desktop_from_env(session_only),
            Some("plasma".into())
        );
        assert_eq!(OsSystemDetector::desktop_from_env(|_| None), None);
    }

    #[tokio::test]
    async fn detects_distribution_and_manager_from_root() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("etc")).unwrap();
        std::fs::write(root.path().join("etc/os-release"), FEDORA).unwrap();
        std::fs::create_dir_all(root.path().join("proc/sys/kernel")).unwrap();
        std::fs::write(root.path().join("proc/sys/kernel/osrelease"), "6.9.4-200.fc40\n").unwrap();

        let runner = Arc::new(MockCommandRunner::new().with_commands(&["yum"]));
        let detector = OsSystemDetector::with_root(root.path().to_path_buf(), runner);

        let info = detector.detect_system().await.unwrap();
        assert_eq!(info.distribution.family, DistroFamily::Rhel);
        assert_eq!(info.package_manager.method, InstallMethod::Yum);
        assert_eq!(info.kernel, "6.9.4-200.fc40");
        assert_eq!(info.preferred_method(), InstallMethod::Yum);
    }

    #[tokio::test]
    async fn missing_release_files_yield_unknown() {
        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockCommandRunner::new());
        let detector = OsSystemDetector::with_root(root.path().to_path_buf(), runner);

        let distro = detector.detect_distribution().await.unwrap();
        assert_eq!(distro.family, DistroFamily::Unknown);
        let manager = detector.detect_package_manager().await.unwrap();
        assert_eq!(manager.method, InstallMethod::Apt);
    }
}

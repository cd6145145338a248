use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const LATEST_VERSION: &str = "latest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallMethod {
    Apt,
    Snap,
    Flatpak,
    Deb,
    Script,
    Mise,
    Aqua,
    Binary,
    #[serde(rename = "github")]
    GitHub,
    #[serde(rename = "github-binary")]
    GitHubBinary,
    #[serde(rename = "github-bundle")]
    GitHubBundle,
    #[serde(rename = "github-java")]
    GitHubJava,
    Dnf,
    Yum,
    Pacman,
    Zypper,
}

impl InstallMethod {
    pub const ALL: [InstallMethod; 16] = [
        InstallMethod::Apt,
        InstallMethod::Snap,
        InstallMethod::Flatpak,
        InstallMethod::Deb,
        InstallMethod::Script,
        InstallMethod::Mise,
        InstallMethod::Aqua,
        InstallMethod::Binary,
        InstallMethod::GitHub,
        InstallMethod::GitHubBinary,
        InstallMethod::GitHubBundle,
        InstallMethod::GitHubJava,
        InstallMethod::Dnf,
        InstallMethod::Yum,
        InstallMethod::Pacman,
        InstallMethod::Zypper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstallMethod::Apt => "apt",
            InstallMethod::Snap => "snap",
            InstallMethod::Flatpak => "flatpak",
            InstallMethod::Deb => "deb",
            InstallMethod::Script => "script",
            InstallMethod::Mise => "mise",
            InstallMethod::Aqua => "aqua",
            InstallMethod::Binary => "binary",
            InstallMethod::GitHub => "github",
            InstallMethod::GitHubBinary => "github-binary",
            InstallMethod::GitHubBundle => "github-bundle",
            InstallMethod::GitHubJava => "github-java",
            InstallMethod::Dnf => "dnf",
            InstallMethod::Yum => "yum",
            InstallMethod::Pacman => "pacman",
            InstallMethod::Zypper => "zypper",
        }
    }

    /// Resolves the legacy `GitHub` alias to the method that actually handles it.
    pub fn normalized(self) -> Self {
        match self {
            InstallMethod::GitHub => InstallMethod::GitHubBinary,
            other => other,
        }
    }

    /// Methods whose installed state can be queried cheaply before installing.
    pub fn has_precheck(&self) -> bool {
        matches!(
            self,
            InstallMethod::Apt
                | InstallMethod::Snap
                | InstallMethod::Flatpak
                | InstallMethod::Mise
                | InstallMethod::Aqua
                | InstallMethod::Binary
        )
    }

    pub fn is_system_manager(&self) -> bool {
        matches!(
            self,
            InstallMethod::Apt
                | InstallMethod::Dnf
                | InstallMethod::Yum
                | InstallMethod::Pacman
                | InstallMethod::Zypper
        )
    }
}

impl fmt::Display for InstallMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InstallMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        InstallMethod::ALL
            .iter()
            .copied()
            .find(|method| method.as_str() == wanted)
            .ok_or_else(|| format!("unknown installation method: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub source: String,
    pub method: InstallMethod,
    pub version: String,
    pub group: Option<String>,
}

impl Package {
    pub fn new(name: impl Into<String>, source: impl Into<String>, method: InstallMethod) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            method,
            version: LATEST_VERSION.to_string(),
            group: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.version = if version.trim().is_empty() {
            LATEST_VERSION.to_string()
        } else {
            version
        };
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn is_latest(&self) -> bool {
        self.version == LATEST_VERSION
    }

    /// Version pin to append to a tool reference, `None` when tracking latest.
    pub fn pinned_version(&self) -> Option<&str> {
        if self.is_latest() {
            None
        } else {
            Some(self.version.as_str())
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.method)
    }
}

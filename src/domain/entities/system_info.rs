use super::InstallMethod;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistroFamily {
    Debian,
    Rhel,
    Arch,
    Suse,
    Unknown,
}

impl DistroFamily {
    /// Classifies an os-release `ID` together with its `ID_LIKE` list.
    pub fn classify(id: &str, id_like: &str) -> Self {
        let id = id.to_ascii_lowercase();
        let id_like = id_like.to_ascii_lowercase();

        match id.as_str() {
            "debian" | "ubuntu" | "pop" | "linuxmint" | "elementary" | "zorin" | "kali"
            | "raspbian" | "neon" => return DistroFamily::Debian,
            "fedora" | "rhel" | "centos" | "rocky" | "almalinux" | "ol" | "amzn" => {
                return DistroFamily::Rhel;
            }
            "arch" | "manjaro" | "endeavouros" | "garuda" | "artix" | "cachyos" => {
                return DistroFamily::Arch;
            }
            "opensuse" | "opensuse-leap" | "opensuse-tumbleweed" | "sles" | "suse" => {
                return DistroFamily::Suse;
            }
            _ => {}
        }

        let like: Vec<&str> = id_like.split_whitespace().collect();
        if like.iter().any(|l| *l == "debian" || *l == "ubuntu") {
            DistroFamily::Debian
        } else if like.iter().any(|l| matches!(*l, "rhel" | "fedora" | "centos")) {
            DistroFamily::Rhel
        } else if like.contains(&"arch") {
            DistroFamily::Arch
        } else if like.iter().any(|l| l.starts_with("suse") || l.starts_with("opensuse")) {
            DistroFamily::Suse
        } else {
            DistroFamily::Unknown
        }
    }
}

impl fmt::Display for DistroFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DistroFamily::Debian => "debian",
            DistroFamily::Rhel => "rhel",
            DistroFamily::Arch => "arch",
            DistroFamily::Suse => "suse",
            DistroFamily::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub id: String,
    pub version: String,
    pub codename: String,
    pub family: DistroFamily,
}

impl Distribution {
    pub fn unknown() -> Self {
        Self {
            id: "unknown".to_string(),
            version: String::new(),
            codename: String::new(),
            family: DistroFamily::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManagerInfo {
    pub name: String,
    pub method: InstallMethod,
    pub command: String,
}

impl PackageManagerInfo {
    pub fn new(name: impl Into<String>, method: InstallMethod, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            command: command.into(),
        }
    }

    /// The manager a family ships with, used when probing finds nothing.
    pub fn default_for(family: DistroFamily) -> Self {
        match family {
            DistroFamily::Rhel => Self::new("dnf", InstallMethod::Dnf, "dnf"),
            DistroFamily::Arch => Self::new("pacman", InstallMethod::Pacman, "pacman"),
            DistroFamily::Suse => Self::new("zypper", InstallMethod::Zypper, "zypper"),
            DistroFamily::Debian | DistroFamily::Unknown => {
                Self::new("apt", InstallMethod::Apt, "apt-get")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub distribution: Distribution,
    pub package_manager: PackageManagerInfo,
    pub desktop_environment: Option<String>,
    pub architecture: String,
    pub kernel: String,
}

impl SystemInfo {
    /// Picks the installation method for a plain application name on this system.
    pub fn preferred_method(&self) -> InstallMethod {
        let detected = self.package_manager.method;
        match self.distribution.family {
            DistroFamily::Debian if detected == InstallMethod::Apt => InstallMethod::Apt,
            DistroFamily::Rhel if detected == InstallMethod::Yum => InstallMethod::Yum,
            DistroFamily::Rhel => InstallMethod::Dnf,
            DistroFamily::Arch => InstallMethod::Pacman,
            _ => detected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(family: DistroFamily, manager: PackageManagerInfo) -> SystemInfo {
        SystemInfo {
            distribution: Distribution {
                id: "test".into(),
                version: "1".into(),
                codename: String::new(),
                family,
            },
            package_manager: manager,
            desktop_environment: None,
            architecture: "x86_64".into(),
            kernel: "6.8.0".into(),
        }
    }

    #[test]
    fn classify_by_id_and_id_like() {
        assert_eq!(DistroFamily::classify("ubuntu", ""), DistroFamily::Debian);
        assert_eq!(DistroFamily::classify("rocky", ""), DistroFamily::Rhel);
        assert_eq!(DistroFamily::classify("manjaro", ""), DistroFamily::Arch);
        assert_eq!(DistroFamily::classify("opensuse-tumbleweed", ""), DistroFamily::Suse);
        assert_eq!(DistroFamily::classify("tuxedo", "ubuntu debian"), DistroFamily::Debian);
        assert_eq!(DistroFamily::classify("nobara", "fedora"), DistroFamily::Rhel);
        assert_eq!(DistroFamily::classify("gentoo", ""), DistroFamily::Unknown);
    }

    #[test]
    fn preferred_method_follows_family() {
        let apt = PackageManagerInfo::new("apt", InstallMethod::Apt, "apt-get");
        assert_eq!(
            system(DistroFamily::Debian, apt.clone()).preferred_method(),
            InstallMethod::Apt
        );

        let yum = PackageManagerInfo::new("yum", InstallMethod::Yum, "yum");
        assert_eq!(system(DistroFamily::Rhel, yum).preferred_method(), InstallMethod::Yum);
        assert_eq!(
            system(DistroFamily::Rhel, apt.clone()).preferred_method(),
            InstallMethod::Dnf
        );

        assert_eq!(
            system(DistroFamily::Arch, apt.clone()).preferred_method(),
            InstallMethod::Pacman
        );

        let zypper = PackageManagerInfo::new("zypper", InstallMethod::Zypper, "zypper");
        assert_eq!(
            system(DistroFamily::Suse, zypper).preferred_method(),
            InstallMethod::Zypper
        );
    }
}

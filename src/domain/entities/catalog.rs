use super::{InstallMethod, Package};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
    pub method: InstallMethod,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, method: InstallMethod) -> Self {
        Self {
            name: name.into(),
            source: None,
            method,
            version: None,
            group: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Builds the package; the source falls back to the name.
    pub fn to_package(&self) -> Package {
        let source = self.source.clone().unwrap_or_else(|| self.name.clone());
        let mut package = Package::new(self.name.clone(), source, self.method);
        if let Some(version) = &self.version {
            package = package.with_version(version.clone());
        }
        if let Some(group) = &self.group {
            package = package.with_group(group.clone());
        }
        package
    }
}

/// A declarative list of applications to provision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    pub fn packages(&self) -> Vec<Package> {
        self.entries.iter().map(CatalogEntry::to_package).collect()
    }

    pub fn group(&self, group: &str) -> Vec<Package> {
        self.entries
            .iter()
            .filter(|e| e.group.as_deref() == Some(group))
            .map(CatalogEntry::to_package)
            .collect()
    }

    pub fn total_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_with_defaults() {
        let json = r#"{
            "entries": [
                {"name": "lazygit", "source": "jesseduffield/lazygit", "method": "github-binary", "group": "cli"},
                {"name": "vim", "method": "apt", "group": "editors"},
                {"name": "node", "method": "mise", "version": "20"}
            ]
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.total_count(), 3);

        let packages = catalog.packages();
        assert_eq!(packages[0].source, "jesseduffield/lazygit");
        assert_eq!(packages[1].source, "vim");
        assert_eq!(packages[2].version, "20");
        assert!(packages[1].is_latest());

        let editors = catalog.group("editors");
        assert_eq!(editors.len(), 1);
        assert_eq!(editors[0].name, "vim");
    }
}

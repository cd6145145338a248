use crate::domain::entities::Catalog;
use anyhow::{Context, Result};
use std::path::Path;

/// Reads and writes catalogs stored as JSON files.
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn load(&self, path: &Path) -> Result<Catalog> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;

        let catalog: Catalog = serde_json::from_str(&json).context("Failed to parse catalog JSON")?;
        tracing::debug!("Loaded {} catalog entries from {}", catalog.total_count(), path.display());
        Ok(catalog)
    }

    pub async fn save(&self, path: &Path, catalog: &Catalog) -> Result<()> {
        let json = serde_json::to_string_pretty(catalog).context("Failed to serialize catalog to JSON")?;

        tokio::fs::write(path, json)
            .await
            .context("Failed to write catalog to file")?;

        Ok(())
    }
}

impl Default for CatalogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CatalogEntry, InstallMethod};

    #[tokio::test]
    async fn saved_catalog_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let mut catalog = Catalog::new();
        catalog.add(CatalogEntry::new("lazygit", InstallMethod::GitHubBinary).with_source("jesseduffield/lazygit"));

        let repository = CatalogRepository::new();
        repository.save(&path, &catalog).await.unwrap();
        let loaded = repository.load(&path).await.unwrap();
        assert_eq!(loaded.entries, catalog.entries);
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        tokio::fs::write(&path, r#"{"entries":[{"name":"x","method":"brew"}]}"#)
            .await
            .unwrap();
        assert!(CatalogRepository::new().load(&path).await.is_err());
    }
}

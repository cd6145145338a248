use crate::domain::ports::FileManager;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub struct LocalFileManager;

impl LocalFileManager {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFileManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileManager for LocalFileManager {
    async fn file_exists(&self, path: &Path) -> bool {
        // symlink_metadata so that dangling links still count as present
        tokio::fs::symlink_metadata(path).await.is_ok()
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory {}", path.display()))
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        if let Some(parent) = to.parent() {
            self.ensure_dir(parent).await?;
        }
        tokio::fs::copy(from, to)
            .await
            .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
        Ok(())
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent).await?;
        }
        tokio::fs::write(path, contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_file(path)
            .await
            .with_context(|| format!("Failed to remove {}", path.display()))
    }

    async fn remove_dir_all(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_dir_all(path)
            .await
            .with_context(|| format!("Failed to remove directory {}", path.display()))
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        tokio::fs::rename(from, to)
            .await
            .with_context(|| format!("Failed to move {} to {}", from.display(), to.display()))
    }

    async fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
                .await
                .with_context(|| format!("Failed to set mode {:o} on {}", mode, path.display()))?;
        }
        #[cfg(not(unix))]
        let _ = (path, mode);
        Ok(())
    }

    async fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        if self.file_exists(link).await {
            let metadata = tokio::fs::symlink_metadata(link).await?;
            if metadata.is_dir() {
                self.remove_dir_all(link).await?;
            } else {
                self.remove_file(link).await?;
            }
        }
        if let Some(parent) = link.parent() {
            self.ensure_dir(parent).await?;
        }

        #[cfg(unix)]
        tokio::fs::symlink(target, link).await.with_context(|| {
            format!("Failed to link {} -> {}", link.display(), target.display())
        })?;
        #[cfg(not(unix))]
        self.copy_file(target, link).await?;

        Ok(())
    }

    async fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to list {}", path.display()));
            }
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            paths.push(entry.path());
        }
        paths.sort();
        Ok(paths)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[tokio::test]
    async fn write_creates_parents_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let files = LocalFileManager::new();
        let path = dir.path().join("a/b/config.toml");

        files.write_file(&path, b"[tools]\n").await.unwrap();
        assert!(files.file_exists(&path).await);
        assert_eq!(files.read_file(&path).await.unwrap(), b"[tools]\n");

        files.remove_file(&path).await.unwrap();
        assert!(!files.file_exists(&path).await);
    }

    #[tokio::test]
    async fn symlink_replaces_existing_link() {
        let dir = tempfile::tempdir().unwrap();
        let files = LocalFileManager::new();
        let old_target = dir.path().join("old");
        let new_target = dir.path().join("new");
        let link = dir.path().join("bin/tool");
        files.write_file(&old_target, b"old").await.unwrap();
        files.write_file(&new_target, b"new").await.unwrap();

        files.symlink(&old_target, &link).await.unwrap();
        files.symlink(&new_target, &link).await.unwrap();

        assert_eq!(std::fs::read_link(&link).unwrap(), new_target);
        assert_eq!(files.read_file(&link).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn set_executable_sets_mode() {
        let dir = tempfile::tempdir().unwrap();
        let files = LocalFileManager::new();
        let path = dir.path().join("tool");
        files.write_file(&path, b"#!/bin/sh\n").await.unwrap();
        files.set_executable(&path).await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);

        files.set_mode(&path, 0o644).await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[tokio::test]
    async fn read_dir_is_sorted_and_tolerates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let files = LocalFileManager::new();
        assert!(files.read_dir(&dir.path().join("missing")).await.unwrap().is_empty());

        files.write_file(&dir.path().join("b"), b"").await.unwrap();
        files.write_file(&dir.path().join("a"), b"").await.unwrap();
        let names: Vec<_> = files
            .read_dir(dir.path())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a", "b"]);
    }
}

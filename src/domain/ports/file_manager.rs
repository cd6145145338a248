use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait FileManager: Send + Sync {
    async fn file_exists(&self, path: &Path) -> bool;
    async fn ensure_dir(&self, path: &Path) -> Result<()>;
    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;
    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()>;
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>>;
    async fn remove_file(&self, path: &Path) -> Result<()>;
    async fn remove_dir_all(&self, path: &Path) -> Result<()>;
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    async fn set_mode(&self, path: &Path, mode: u32) -> Result<()>;
    /// Replaces whatever already exists at `link`.
    async fn symlink(&self, target: &Path, link: &Path) -> Result<()>;
    /// Entries directly inside `path`, sorted by name. A missing directory is empty.
    async fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    async fn set_executable(&self, path: &Path) -> Result<()> {
        self.set_mode(path, 0o755).await
    }
}

//! Download, extract and link machinery shared by the artifact-based methods.

use crate::domain::context::Context;
use crate::domain::entities::InstallMethod;
use crate::domain::errors::{InstallError, InstallResult};
use crate::domain::ports::{CommandRunner, FileManager, Invocation, NetworkClient};
use anyhow::{Context as _, anyhow};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
}

impl ArchiveKind {
    pub fn detect(file_name: &str) -> Option<Self> {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else if [".tar", ".tar.gz", ".tgz", ".tar.xz", ".txz", ".tar.bz2", ".tbz2", ".tar.zst"]
            .iter()
            .any(|ext| lower.ends_with(ext))
        {
            Some(ArchiveKind::Tar)
        } else {
            None
        }
    }

    fn tool(&self) -> &'static str {
        match self {
            ArchiveKind::Zip => "unzip",
            ArchiveKind::Tar => "tar",
        }
    }

    /// The staging directory is always the last argument.
    fn invocation(&self, archive: &Path, staging: &Path) -> Invocation {
        let archive = archive.display().to_string();
        let staging = staging.display().to_string();
        match self {
            ArchiveKind::Zip => {
                Invocation::new("unzip").args(["-q", "-o", archive.as_str(), "-d", staging.as_str()])
            }
            ArchiveKind::Tar => Invocation::new("tar").args(["-xf", archive.as_str(), "-C", staging.as_str()]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strip {
    Components(usize),
    /// Drop the top-level folder when it is the only entry of the archive.
    SingleTopLevel,
}

#[derive(Debug)]
struct StagedEntry {
    relative: PathBuf,
    link_target: Option<PathBuf>,
}

fn walk_staging(staging: &Path) -> anyhow::Result<(Vec<StagedEntry>, usize, bool)> {
    let mut entries = Vec::new();
    let mut top_level = 0usize;
    let mut top_level_is_dir = false;

    for entry in walkdir::WalkDir::new(staging).min_depth(1).follow_links(false) {
        let entry = entry.context("Failed to walk extracted archive")?;
        let file_type = entry.file_type();
        if entry.depth() == 1 {
            top_level += 1;
            top_level_is_dir = file_type.is_dir();
        }
        if file_type.is_dir() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(staging)
            .context("Extracted entry escaped the staging directory")?
            .to_path_buf();
        let link_target = if file_type.is_symlink() {
            Some(std::fs::read_link(entry.path())?)
        } else {
            None
        };
        entries.push(StagedEntry {
            relative,
            link_target,
        });
    }

    Ok((entries, top_level, top_level_is_dir))
}

fn strip_path(relative: &Path, count: usize) -> Option<PathBuf> {
    let rest: PathBuf = relative
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .skip(count)
        .collect();
    (!rest.as_os_str().is_empty()).then_some(rest)
}

fn under_bin(relative: &Path) -> bool {
    relative
        .parent()
        .is_some_and(|parent| parent.components().any(|c| c.as_os_str() == "bin"))
}

pub struct ArtifactPipeline {
    runner: Arc<dyn CommandRunner>,
    files: Arc<dyn FileManager>,
    network: Arc<dyn NetworkClient>,
    temp_dir: PathBuf,
}

impl ArtifactPipeline {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        files: Arc<dyn FileManager>,
        network: Arc<dyn NetworkClient>,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            runner,
            files,
            network,
            temp_dir,
        }
    }

    /// A private directory under the temp dir, removed when dropped.
    pub async fn scratch_dir(&self) -> InstallResult<TempDir> {
        self.files.ensure_dir(&self.temp_dir).await?;
        let dir = tempfile::Builder::new()
            .prefix("devstrap-")
            .tempdir_in(&self.temp_dir)
            .context("Failed to create a scratch directory")?;
        Ok(dir)
    }

    pub async fn download(&self, ctx: &Context, url: &str, dest: &Path) -> InstallResult<()> {
        tracing::debug!("Fetching {}", url);
        self.network.download_file(ctx, url, dest).await?;
        Ok(())
    }

    /// Unpacks `archive` into `dest` and returns the placed files.
    ///
    /// Entries land in a staging directory next to `dest` first so the final
    /// moves never cross file systems. Files below a `bin/` directory get
    /// mode 0755, everything else 0644; symlinks are recreated as links.
    pub async fn extract(
        &self,
        ctx: &Context,
        archive: &Path,
        dest: &Path,
        strip: Strip,
        method: InstallMethod,
    ) -> InstallResult<Vec<PathBuf>> {
        let file_name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = ArchiveKind::detect(&file_name)
            .ok_or_else(|| anyhow!("{} is not a supported archive", file_name))?;
        if !self.runner.command_exists(kind.tool()) {
            return Err(InstallError::ToolMissing {
                tool: kind.tool().to_string(),
                method,
            });
        }

        let parent = dest
            .parent()
            .ok_or_else(|| anyhow!("{} has no parent directory", dest.display()))?;
        self.files.ensure_dir(parent).await?;
        let staging = tempfile::Builder::new()
            .prefix(".devstrap-stage-")
            .tempdir_in(parent)
            .context("Failed to create a staging directory")?;

        self.runner
            .run(ctx, kind.invocation(archive, staging.path()))
            .await?;

        let root = staging.path().to_path_buf();
        let (entries, top_level, top_level_is_dir) =
            tokio::task::spawn_blocking(move || walk_staging(&root))
                .await
                .context("Archive walk panicked")??;

        let strip = match strip {
            Strip::Components(count) => count,
            Strip::SingleTopLevel if top_level == 1 && top_level_is_dir => 1,
            Strip::SingleTopLevel => 0,
        };

        self.files.ensure_dir(dest).await?;
        let mut placed = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(rest) = strip_path(&entry.relative, strip) else {
                continue;
            };
            let target = dest.join(&rest);
            if let Some(dir) = target.parent() {
                self.files.ensure_dir(dir).await?;
            }

            match &entry.link_target {
                Some(link_target) => self.files.symlink(link_target, &target).await?,
                None => {
                    self.files
                        .rename(&staging.path().join(&entry.relative), &target)
                        .await?;
                    let mode = if under_bin(&rest) { 0o755 } else { 0o644 };
                    self.files.set_mode(&target, mode).await?;
                }
            }
            placed.push(target);
        }

        tracing::debug!(
            "Extracted {} entries from {} into {}",
            placed.len(),
            file_name,
            dest.display()
        );
        Ok(placed)
    }

    /// Downloads straight into the bin directory under a hidden name, then
    /// marks it executable and moves it into place.
    pub async fn download_executable(
        &self,
        ctx: &Context,
        url: &str,
        bin_dir: &Path,
        name: &str,
    ) -> InstallResult<PathBuf> {
        self.files.ensure_dir(bin_dir).await?;
        let staged = bin_dir.join(format!(".{}.devstrap-tmp", name));
        if let Err(e) = self.download(ctx, url, &staged).await {
            if self.files.file_exists(&staged).await {
                let _ = self.files.remove_file(&staged).await;
            }
            return Err(e);
        }
        self.promote(&staged, bin_dir, name).await
    }

    /// Copies an already available file into the bin directory.
    pub async fn install_executable(
        &self,
        source: &Path,
        bin_dir: &Path,
        name: &str,
    ) -> InstallResult<PathBuf> {
        self.files.ensure_dir(bin_dir).await?;
        let staged = bin_dir.join(format!(".{}.devstrap-tmp", name));
        self.files.copy_file(source, &staged).await?;
        self.promote(&staged, bin_dir, name).await
    }

    async fn promote(&self, staged: &Path, bin_dir: &Path, name: &str) -> InstallResult<PathBuf> {
        let target = bin_dir.join(name);
        let moved = async {
            self.files.set_executable(staged).await?;
            self.files.rename(staged, &target).await
        };
        if let Err(e) = moved.await {
            let _ = self.files.remove_file(staged).await;
            return Err(e.into());
        }
        Ok(target)
    }

    pub async fn link(&self, target: &Path, link: &Path) -> InstallResult<()> {
        self.files.symlink(target, link).await?;
        tracing::debug!("Linked {} -> {}", link.display(), target.display());
        Ok(())
    }
}

use super::Installer;
use crate::application::pipeline::{ArchiveKind, Strip};
use crate::domain::context::Context;
use crate::domain::entities::{InstallAttempt, InstallMethod, Package};
use crate::domain::errors::{InstallError, InstallResult};
use crate::domain::services::method_selection::{extract_repo_name, is_url, parse_repository};
use anyhow::anyhow;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const GITHUB_API: &str = "https://api.github.com";
const PMD_REPOSITORY: (&str, &str) = ("pmd", "pmd");

const IGNORED_SUFFIXES: [&str; 17] = [
    ".sha256", ".sha256sum", ".sha512", ".md5", ".sig", ".asc", ".minisig", ".pem", ".sbom",
    ".txt", ".json", ".deb", ".rpm", ".apk", ".msi", ".exe", ".dmg",
];
const BARE_COMPRESSED: [&str; 5] = [".gz", ".xz", ".bz2", ".zst", ".7z"];

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// `owner/repo` from either the short form or a repository URL on github.com.
pub fn repository_ref(source: &str) -> Option<(String, String)> {
    if let Some((owner, repo)) = parse_repository(source) {
        return Some((owner.to_string(), repo.to_string()));
    }

    let path = source
        .strip_prefix("https://github.com/")
        .or_else(|| source.strip_prefix("http://github.com/"))?;
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let parts: Vec<&str> = path.split('/').collect();
    match parts.as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Some((owner.to_string(), repo.to_string()))
        }
        _ => None,
    }
}

fn arch_tokens(arch: &str) -> Vec<&str> {
    match arch {
        "x86_64" | "amd64" => vec!["x86_64", "amd64", "x64"],
        "aarch64" | "arm64" => vec!["aarch64", "arm64"],
        other => vec![other],
    }
}

/// 0 is best. `None` for assets that cannot be installed at all.
fn asset_rank(name: &str) -> Option<u8> {
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Some(0)
    } else if name.ends_with(".tar.xz") || name.ends_with(".txz") || name.ends_with(".tar.bz2") {
        Some(1)
    } else if name.ends_with(".zip") {
        Some(2)
    } else if BARE_COMPRESSED.iter().any(|ext| name.ends_with(ext)) {
        None
    } else {
        Some(3)
    }
}

/// Picks the release asset for Linux on `arch`.
///
/// Checksums, signatures and OS packages are skipped. Archives beat bare
/// binaries (tar.gz, then tar.xz, then zip) and musl builds win ties.
pub fn select_asset<'a>(assets: &'a [GitHubAsset], arch: &str) -> Option<&'a GitHubAsset> {
    let tokens = arch_tokens(arch);
    assets
        .iter()
        .filter_map(|asset| {
            let name = asset.name.to_ascii_lowercase();
            if IGNORED_SUFFIXES.iter().any(|ext| name.ends_with(ext)) {
                return None;
            }
            if !name.contains("linux") || !tokens.iter().any(|t| name.contains(t)) {
                return None;
            }
            let rank = asset_rank(&name)?;
            let glibc = u8::from(!name.contains("musl"));
            Some(((rank, glibc), asset))
        })
        .min_by_key(|(key, _)| *key)
        .map(|(_, asset)| asset)
}

fn file_name_from_url(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .unwrap_or(url)
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

impl Installer {
    async fn latest_release(&self, ctx: &Context, owner: &str, repo: &str) -> InstallResult<GitHubRelease> {
        let url = format!("{}/repos/{}/{}/releases/latest", GITHUB_API, owner, repo);
        let body = self.network.fetch_text(ctx, &url).await?;
        serde_json::from_str(&body).map_err(|e| InstallError::Parse {
            what: format!("release metadata of {}/{}", owner, repo),
            message: e.to_string(),
        })
    }

    /// Download URL and file name of the artifact a GitHub package points at.
    async fn resolve_artifact(&self, ctx: &Context, package: &Package) -> InstallResult<(String, String)> {
        if let Some((owner, repo)) = repository_ref(&package.source) {
            let release = self.latest_release(ctx, &owner, &repo).await?;
            let asset = select_asset(&release.assets, &self.architecture).ok_or_else(|| {
                InstallError::NoMatchingAsset {
                    repository: format!("{}/{}", owner, repo),
                    arch: self.architecture.clone(),
                }
            })?;
            tracing::debug!("Selected {} from {} {}", asset.name, repo, release.tag_name);
            return Ok((asset.browser_download_url.clone(), asset.name.clone()));
        }

        if is_url(&package.source) {
            return Ok((package.source.clone(), file_name_from_url(&package.source)));
        }

        Err(InstallError::InvalidPackage(format!(
            "{} is neither owner/repo nor a URL",
            package.source
        )))
    }

    /// Downloads an archive into a fresh scratch directory.
    async fn fetch_archive(
        &self,
        ctx: &Context,
        url: &str,
        file_name: &str,
    ) -> InstallResult<(tempfile::TempDir, PathBuf)> {
        let scratch = self.pipeline.scratch_dir().await?;
        let archive = scratch.path().join(file_name);
        let download_ctx = ctx.with_timeout(self.config.large_download_timeout());
        self.pipeline.download(&download_ctx, url, &archive).await?;
        Ok((scratch, archive))
    }

    async fn replace_share_dir(&self, name: &str) -> InstallResult<PathBuf> {
        let dest = self.paths.share_path(name);
        if self.files.file_exists(&dest).await {
            self.files.remove_dir_all(&dest).await?;
        }
        Ok(dest)
    }

    pub(super) async fn install_github_binary(
        &self,
        ctx: &Context,
        package: &Package,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<()> {
        let (url, file_name) = self.resolve_artifact(ctx, package).await?;
        attempt.log(format!("using {}", url));

        if ArchiveKind::detect(&file_name).is_none() {
            let target = self
                .pipeline
                .download_executable(ctx, &url, &self.paths.local_bin, &package.name)
                .await?;
            attempt.log(format!("installed {}", target.display()));
            return Ok(());
        }

        let (scratch, archive) = self.fetch_archive(ctx, &url, &file_name).await?;
        let unpacked = scratch.path().join("unpacked");
        let placed = self
            .pipeline
            .extract(ctx, &archive, &unpacked, Strip::Components(0), InstallMethod::GitHubBinary)
            .await?;

        let repo = extract_repo_name(&package.source).to_string();
        let named = |wanted: &str| {
            placed
                .iter()
                .find(|path| path.file_name().is_some_and(|n| n == wanted))
        };
        let binary = named(&package.name)
            .or_else(|| named(&repo))
            .or_else(|| (placed.len() == 1).then(|| &placed[0]))
            .ok_or_else(|| anyhow!("{} contains no executable named {}", file_name, package.name))?;

        let target = self
            .pipeline
            .install_executable(binary, &self.paths.local_bin, &package.name)
            .await?;
        attempt.log(format!("installed {}", target.display()));
        Ok(())
    }

    pub(super) async fn install_github_bundle(
        &self,
        ctx: &Context,
        package: &Package,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<()> {
        let (url, file_name) = self.resolve_artifact(ctx, package).await?;
        if ArchiveKind::detect(&file_name).is_none() {
            return Err(InstallError::InvalidPackage(format!(
                "{} is not an archive and cannot be installed as a bundle",
                file_name
            )));
        }

        let (_scratch, archive) = self.fetch_archive(ctx, &url, &file_name).await?;
        let dest = self.replace_share_dir(&package.name).await?;
        self.pipeline
            .extract(ctx, &archive, &dest, Strip::SingleTopLevel, InstallMethod::GitHubBundle)
            .await?;
        attempt.log(format!("unpacked {} into {}", file_name, dest.display()));

        let linked = self.link_bundle(&dest, &package.name).await?;
        for link in &linked {
            attempt.log(format!("linked {}", link.display()));
        }
        Ok(())
    }

    /// Links `bin/*` of an unpacked bundle, or its root executable named
    /// like the package, into the local bin directory.
    async fn link_bundle(&self, root: &Path, name: &str) -> InstallResult<Vec<PathBuf>> {
        let mut targets = self.files.read_dir(&root.join("bin")).await?;
        if targets.is_empty() {
            let candidate = root.join(name);
            if self.files.file_exists(&candidate).await {
                self.files.set_executable(&candidate).await?;
                targets.push(candidate);
            }
        }
        if targets.is_empty() {
            return Err(anyhow!("no executables found in {}", root.display()).into());
        }

        let mut links = Vec::with_capacity(targets.len());
        for target in targets {
            let Some(file_name) = target.file_name() else {
                continue;
            };
            let link = self.paths.local_bin.join(file_name);
            self.pipeline.link(&target, &link).await?;
            links.push(link);
        }
        Ok(links)
    }

    /// Only PMD is supported for now.
    pub(super) async fn install_github_java(
        &self,
        ctx: &Context,
        package: &Package,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<()> {
        let is_pmd = package.name == "pmd"
            || parse_repository(&package.source) == Some(PMD_REPOSITORY);
        if !is_pmd {
            return Err(InstallError::not_implemented(format!(
                "GitHubJava installation for {}",
                package.name
            )));
        }

        let (owner, repo) = PMD_REPOSITORY;
        let release = self.latest_release(ctx, owner, repo).await?;
        let asset = release
            .assets
            .iter()
            .find(|a| a.browser_download_url.contains("-bin.zip") && !a.browser_download_url.contains(".asc"))
            .ok_or_else(|| InstallError::NoMatchingAsset {
                repository: format!("{}/{}", owner, repo),
                arch: "any".to_string(),
            })?;
        attempt.log(format!("using {} from {}", asset.name, release.tag_name));

        let (_scratch, archive) = self
            .fetch_archive(ctx, &asset.browser_download_url, &asset.name)
            .await?;
        let dest = self.replace_share_dir("pmd").await?;
        self.pipeline
            .extract(ctx, &archive, &dest, Strip::Components(1), InstallMethod::GitHubJava)
            .await?;

        let link = self.paths.bin_path("pmd");
        self.pipeline.link(&dest.join("bin").join("pmd"), &link).await?;
        attempt.log(format!("linked {}", link.display()));
        Ok(())
    }
}

use super::Installer;
use crate::domain::context::Context;
use crate::domain::entities::{InstallMethod, Package};
use crate::domain::errors::{InstallError, InstallResult};
use crate::domain::ports::Invocation;
use std::collections::BTreeMap;

fn parse_flatpak_apps(stdout: &str) -> Vec<Package> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|app| Package::new(app, app, InstallMethod::Flatpak))
        .collect()
}

/// `snap list` prints a header row followed by `Name Version Rev ...` columns.
fn parse_snap_list(stdout: &str) -> Vec<Package> {
    stdout
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let name = columns.next()?;
            let package = Package::new(name, name, InstallMethod::Snap);
            Some(match columns.next() {
                Some(version) => package.with_version(version),
                None => package,
            })
        })
        .collect()
}

#[derive(serde::Deserialize)]
struct MiseInstall {
    version: String,
}

/// `mise ls --json` maps each tool to its installed versions.
fn parse_mise_list(stdout: &str) -> InstallResult<Vec<Package>> {
    let tools: BTreeMap<String, Vec<MiseInstall>> =
        serde_json::from_str(stdout).map_err(|e| InstallError::Parse {
            what: "mise ls output".to_string(),
            message: e.to_string(),
        })?;
    Ok(tools
        .into_iter()
        .map(|(tool, installs)| {
            let package = Package::new(&tool, &tool, InstallMethod::Mise);
            match installs.first() {
                Some(install) => package.with_version(&install.version),
                None => package,
            }
        })
        .collect())
}

impl Installer {
    async fn list_source(
        &self,
        ctx: &Context,
        tool: &str,
        invocation: Invocation,
        parse: impl Fn(&str) -> InstallResult<Vec<Package>>,
    ) -> Vec<Package> {
        if !self.runner.command_exists(tool) {
            tracing::debug!("Skipping {} packages, {} is not installed", tool, tool);
            return Vec::new();
        }
        let listed = match self.runner.run(ctx, invocation).await {
            Ok(output) => parse(&output.stdout),
            Err(e) => Err(e.into()),
        };
        listed.unwrap_or_else(|e| {
            tracing::warn!("Skipping {} packages: {}", tool, e);
            Vec::new()
        })
    }

    async fn list_local_bin(&self) -> Vec<Package> {
        let entries = match self.files.read_dir(&self.paths.local_bin).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", self.paths.local_bin.display(), e);
                return Vec::new();
            }
        };
        entries
            .iter()
            .filter_map(|path| path.file_name()?.to_str())
            .filter(|name| !name.starts_with('.'))
            .map(|name| {
                let source = self.paths.bin_path(name).display().to_string();
                Package::new(name, source, InstallMethod::Binary)
            })
            .collect()
    }

    pub(super) async fn list_packages(&self, ctx: &Context) -> InstallResult<Vec<Package>> {
        if let Some(reason) = ctx.err() {
            return Err(reason.into());
        }

        let mut packages = self
            .list_source(
                ctx,
                "flatpak",
                Invocation::new("flatpak").args(["list", "--user", "--app", "--columns=application"]),
                |stdout| Ok(parse_flatpak_apps(stdout)),
            )
            .await;
        packages.extend(
            self.list_source(ctx, "snap", Invocation::new("snap").arg("list"), |stdout| {
                Ok(parse_snap_list(stdout))
            })
            .await,
        );
        packages.extend(
            self.list_source(
                ctx,
                "mise",
                Invocation::new("mise").args(["ls", "--json"]),
                parse_mise_list,
            )
            .await,
        );
        packages.extend(self.list_local_bin().await);

        tracing::debug!("Listed {} packages", packages.len());
        Ok(packages)
    }
}

use super::Installer;
use crate::domain::context::Context;
use crate::domain::entities::{InstallAttempt, Package};
use crate::domain::errors::InstallResult;
use crate::domain::ports::Invocation;

/// `snap install` arguments with flags moved in front of the snap names.
///
/// A source made only of flags installs the package's own name.
pub fn snap_install_args(source: &str, name: &str) -> Vec<String> {
    let (flags, mut names): (Vec<&str>, Vec<&str>) =
        source.split_whitespace().partition(|token| token.starts_with('-'));
    if names.is_empty() {
        names.push(name);
    }

    let mut args = Vec::with_capacity(flags.len() + names.len() + 1);
    args.push("install".to_string());
    args.extend(flags.into_iter().map(str::to_string));
    args.extend(names.into_iter().map(str::to_string));
    args
}

/// The snap a source installs: its first non-flag token, else `name`.
pub(super) fn snap_name<'a>(source: &'a str, name: &'a str) -> &'a str {
    source
        .split_whitespace()
        .find(|token| !token.starts_with('-'))
        .unwrap_or(name)
}

impl Installer {
    pub(super) async fn install_snap(
        &self,
        ctx: &Context,
        package: &Package,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<()> {
        let invocation = Invocation::new("snap")
            .args(snap_install_args(&package.source, &package.name))
            .privileged();
        self.run_logged(ctx, invocation, attempt).await?;
        Ok(())
    }
}

use super::Installer;
use crate::domain::context::Context;
use crate::domain::entities::{InstallAttempt, InstallMethod, Package};
use crate::domain::errors::{InstallError, InstallResult};
use crate::domain::ports::Invocation;

pub(super) fn install_invocation(method: InstallMethod, source: &str) -> InstallResult<Invocation> {
    let invocation = match method {
        InstallMethod::Dnf => Invocation::new("dnf").args(["install", "-y", source]),
        InstallMethod::Yum => Invocation::new("yum").args(["install", "-y", source]),
        InstallMethod::Pacman => {
            Invocation::new("pacman").args(["-S", "--noconfirm", "--needed", source])
        }
        InstallMethod::Zypper => {
            Invocation::new("zypper").args(["--non-interactive", "install", source])
        }
        other => return Err(InstallError::UnsupportedMethod(other)),
    };
    Ok(invocation.privileged())
}

pub(super) fn remove_invocation(method: InstallMethod, source: &str) -> InstallResult<Invocation> {
    let invocation = match method {
        InstallMethod::Apt => Invocation::new("apt-get").args(["remove", "-y", source]),
        InstallMethod::Dnf => Invocation::new("dnf").args(["remove", "-y", source]),
        InstallMethod::Yum => Invocation::new("yum").args(["remove", "-y", source]),
        InstallMethod::Pacman => Invocation::new("pacman").args(["-R", "--noconfirm", source]),
        InstallMethod::Zypper => {
            Invocation::new("zypper").args(["--non-interactive", "remove", source])
        }
        other => return Err(InstallError::UnsupportedMethod(other)),
    };
    Ok(invocation.privileged())
}

impl Installer {
    pub(super) async fn install_native(
        &self,
        ctx: &Context,
        package: &Package,
        method: InstallMethod,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<()> {
        let invocation = install_invocation(method, &package.source)?.envs(&self.proxy_env);
        self.run_logged(ctx, invocation, attempt).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_commands_are_privileged_and_non_interactive() {
        let cases = [
            (InstallMethod::Dnf, "sudo dnf install -y git"),
            (InstallMethod::Yum, "sudo yum install -y git"),
            (InstallMethod::Pacman, "sudo pacman -S --noconfirm --needed git"),
            (InstallMethod::Zypper, "sudo zypper --non-interactive install git"),
        ];
        for (method, expected) in cases {
            assert_eq!(install_invocation(method, "git").unwrap().command_line(), expected);
        }
        assert_eq!(
            remove_invocation(InstallMethod::Apt, "git").unwrap().command_line(),
            "sudo apt-get remove -y git"
        );
    }

    #[test]
    fn non_native_methods_are_unsupported_here() {
        let err = install_invocation(InstallMethod::Mise, "node").unwrap_err();
        assert!(matches!(err, InstallError::UnsupportedMethod(InstallMethod::Mise)));
    }
}

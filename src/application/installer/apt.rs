use super::Installer;
use crate::domain::context::Context;
use crate::domain::entities::{InstallAttempt, Package};
use crate::domain::errors::InstallResult;
use crate::domain::ports::Invocation;

const PROXY_VARS: [&str; 3] = ["http_proxy", "https_proxy", "no_proxy"];

/// Proxy settings to forward through `sudo`.
///
/// Both spellings are forwarded with one value; the lowercase variable wins
/// when both are set.
pub fn proxy_env<F>(lookup: F) -> Vec<(String, String)>
where
    F: Fn(&str) -> Option<String>,
{
    let present = |key: &str| lookup(key).filter(|value| !value.is_empty());
    let mut env = Vec::new();
    for name in PROXY_VARS {
        let upper = name.to_ascii_uppercase();
        if let Some(value) = present(name).or_else(|| present(&upper)) {
            env.push((name.to_string(), value.clone()));
            env.push((upper, value));
        }
    }
    env
}

impl Installer {
    pub(super) async fn install_apt(
        &self,
        ctx: &Context,
        package: &Package,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<()> {
        let update = Invocation::new("apt-get")
            .arg("update")
            .envs(&self.proxy_env)
            .privileged();
        self.run_logged(ctx, update, attempt).await?;

        let install = Invocation::new("apt-get")
            .args(["install", "-y"])
            .arg(&package.source)
            .envs(&self.proxy_env)
            .privileged();
        self.run_logged(ctx, install, attempt).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_proxy_wins_and_both_names_are_forwarded() {
        let env = proxy_env(|key| match key {
            "http_proxy" => Some("http://lower:3128".to_string()),
            "HTTP_PROXY" => Some("http://upper:3128".to_string()),
            "NO_PROXY" => Some("localhost".to_string()),
            "https_proxy" => Some(String::new()),
            _ => None,
        });
        assert_eq!(
            env,
            vec![
                ("http_proxy".to_string(), "http://lower:3128".to_string()),
                ("HTTP_PROXY".to_string(), "http://lower:3128".to_string()),
                ("no_proxy".to_string(), "localhost".to_string()),
                ("NO_PROXY".to_string(), "localhost".to_string()),
            ]
        );
    }

    #[test]
    fn no_proxy_configured_means_no_overlay() {
        assert!(proxy_env(|_| None).is_empty());
    }
}

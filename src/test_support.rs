//! Recording fakes for the outward-facing ports.

use crate::domain::context::Context;
use crate::domain::entities::{
    DistroFamily, Distribution, InstallMethod, PackageManagerInfo, SystemInfo,
};
use crate::domain::errors::{CommandError, DownloadError};
use crate::domain::ports::{
    CommandOutput, CommandRunner, FileManager, Invocation, NetworkClient, SystemDetector,
};
use crate::infrastructure::LocalFileManager;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

type Effect = Arc<dyn Fn(&Invocation) + Send + Sync>;

struct Rule {
    prefix: String,
    response: Result<CommandOutput, CommandError>,
    effect: Option<Effect>,
    once: bool,
}

/// Answers invocations from prefix rules matched against the rendered
/// command line (`sudo ` included). Unmatched invocations succeed silently.
#[derive(Default)]
pub struct MockCommandRunner {
    rules: Mutex<Vec<Rule>>,
    invocations: Mutex<Vec<Invocation>>,
    commands: Mutex<HashSet<String>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commands(self, names: &[&str]) -> Self {
        for name in names {
            self.add_command(name);
        }
        self
    }

    pub fn add_command(&self, name: &str) {
        self.commands.lock().unwrap().insert(name.to_string());
    }

    pub fn respond(self, prefix: &str, stdout: &str) -> Self {
        self.push(prefix, Ok(output(stdout)), None, false)
    }

    pub fn respond_once(self, prefix: &str, stdout: &str) -> Self {
        self.push(prefix, Ok(output(stdout)), None, true)
    }

    pub fn fail(self, prefix: &str, code: i32, stderr: &str) -> Self {
        let error = CommandError::Failed {
            command: prefix.to_string(),
            code,
            stderr: stderr.to_string(),
        };
        self.push(prefix, Err(error), None, false)
    }

    pub fn fail_once(self, prefix: &str, code: i32, stderr: &str) -> Self {
        let error = CommandError::Failed {
            command: prefix.to_string(),
            code,
            stderr: stderr.to_string(),
        };
        self.push(prefix, Err(error), None, true)
    }

    pub fn fail_with(self, prefix: &str, error: CommandError) -> Self {
        self.push(prefix, Err(error), None, false)
    }

    /// Succeeds and runs `effect`, e.g. to stage files an extractor would write.
    pub fn on_run<F>(self, prefix: &str, effect: F) -> Self
    where
        F: Fn(&Invocation) + Send + Sync + 'static,
    {
        self.push(prefix, Ok(CommandOutput::default()), Some(Arc::new(effect)), false)
    }

    fn push(
        self,
        prefix: &str,
        response: Result<CommandOutput, CommandError>,
        effect: Option<Effect>,
        once: bool,
    ) -> Self {
        self.rules.lock().unwrap().push(Rule {
            prefix: prefix.to_string(),
            response,
            effect,
            once,
        });
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .map(Invocation::command_line)
            .collect()
    }
}

fn output(stdout: &str) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, ctx: &Context, invocation: Invocation) -> Result<CommandOutput, CommandError> {
        let line = invocation.command_line();
        self.invocations.lock().unwrap().push(invocation.clone());
        if let Some(reason) = ctx.err() {
            return Err(CommandError::from_context(line, reason));
        }

        let (response, effect) = {
            let mut rules = self.rules.lock().unwrap();
            match rules.iter().position(|rule| line.starts_with(&rule.prefix)) {
                Some(index) => {
                    let rule = &rules[index];
                    let matched = (rule.response.clone(), rule.effect.clone());
                    if rule.once {
                        rules.remove(index);
                    }
                    matched
                }
                None => (Ok(CommandOutput::default()), None),
            }
        };

        if let Some(effect) = effect {
            effect(&invocation);
        }
        response
    }

    fn command_exists(&self, name: &str) -> bool {
        self.commands.lock().unwrap().contains(name)
    }
}

/// Real local file operations, with every call recorded.
#[derive(Default)]
pub struct RecordingFileManager {
    inner: LocalFileManager,
    calls: Mutex<Vec<String>>,
}

impl RecordingFileManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, path: &Path) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", op, path.display()));
    }
}

#[async_trait]
impl FileManager for RecordingFileManager {
    async fn file_exists(&self, path: &Path) -> bool {
        self.record("exists", path);
        self.inner.file_exists(path).await
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        self.record("ensure_dir", path);
        self.inner.ensure_dir(path).await
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        self.record("copy", to);
        self.inner.copy_file(from, to).await
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.record("write", path);
        self.inner.write_file(path, contents).await
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.record("read", path);
        self.inner.read_file(path).await
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        self.record("remove", path);
        self.inner.remove_file(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.record("remove_dir", path);
        self.inner.remove_dir_all(path).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.record("rename", to);
        self.inner.rename(from, to).await
    }

    async fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        self.record(&format!("mode {:o}", mode), path);
        self.inner.set_mode(path, mode).await
    }

    async fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        self.record("symlink", link);
        self.inner.symlink(target, link).await
    }

    async fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.record("read_dir", path);
        self.inner.read_dir(path).await
    }
}

/// Serves canned bodies per URL; unknown URLs answer 404.
#[derive(Default)]
pub struct MockNetworkClient {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    stalled: Mutex<HashSet<String>>,
    requests: Mutex<Vec<String>>,
}

impl MockNetworkClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.lock().unwrap().insert(url.to_string(), body.into());
        self
    }

    /// Requests for `url` never complete until the context is done.
    pub fn stall(self, url: &str) -> Self {
        self.stalled.lock().unwrap().insert(url.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    async fn respond(&self, ctx: &Context, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.requests.lock().unwrap().push(url.to_string());
        let stalled = self.stalled.lock().unwrap().contains(url);
        if stalled {
            let reason = ctx.done().await;
            return Err(DownloadError::Interrupted {
                url: url.to_string(),
                reason,
            });
        }
        if let Some(reason) = ctx.err() {
            return Err(DownloadError::Interrupted {
                url: url.to_string(),
                reason,
            });
        }
        self.bodies
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[async_trait]
impl NetworkClient for MockNetworkClient {
    async fn download_file(&self, ctx: &Context, url: &str, dest: &Path) -> Result<(), DownloadError> {
        let body = self.respond(ctx, url).await?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        std::fs::write(dest, body).map_err(|e| DownloadError::Write {
            url: url.to_string(),
            path: dest.to_path_buf(),
            message: e.to_string(),
        })
    }

    async fn fetch_text(&self, ctx: &Context, url: &str) -> Result<String, DownloadError> {
        let body = self.respond(ctx, url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// An effect for [`MockCommandRunner::on_run`] that writes `files` below the
/// directory named by the invocation's last argument, like `unzip -d` or
/// `tar -C` would.
pub fn stage_files(
    files: &'static [(&'static str, &'static str)],
) -> impl Fn(&Invocation) + Send + Sync + 'static {
    move |invocation: &Invocation| {
        let staging = PathBuf::from(invocation.args.last().expect("staging argument"));
        for (path, body) in files {
            let path = staging.join(path);
            std::fs::create_dir_all(path.parent().expect("parent")).expect("create staged dir");
            std::fs::write(path, body).expect("write staged file");
        }
    }
}

pub struct StaticSystemDetector {
    info: Option<SystemInfo>,
}

impl StaticSystemDetector {
    pub fn new(info: SystemInfo) -> Self {
        Self { info: Some(info) }
    }

    pub fn failing() -> Self {
        Self { info: None }
    }

    fn info(&self) -> Result<SystemInfo> {
        self.info
            .clone()
            .ok_or_else(|| anyhow!("os-release unreadable"))
    }
}

#[async_trait]
impl SystemDetector for StaticSystemDetector {
    async fn detect_system(&self) -> Result<SystemInfo> {
        self.info()
    }

    async fn detect_distribution(&self) -> Result<Distribution> {
        Ok(self.info()?.distribution)
    }

    async fn detect_desktop_environment(&self) -> Option<String> {
        self.info.as_ref().and_then(|i| i.desktop_environment.clone())
    }

    async fn detect_package_manager(&self) -> Result<PackageManagerInfo> {
        Ok(self.info()?.package_manager)
    }
}

pub fn ubuntu_system() -> SystemInfo {
    SystemInfo {
        distribution: Distribution {
            id: "ubuntu".into(),
            version: "24.04".into(),
            codename: "noble".into(),
            family: DistroFamily::Debian,
        },
        package_manager: PackageManagerInfo::new("apt", InstallMethod::Apt, "apt-get"),
        desktop_environment: Some("GNOME".into()),
        architecture: "x86_64".into(),
        kernel: "6.8.0-31-generic".into(),
    }
}

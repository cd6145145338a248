//! Error types for installation, detection and transport.
//!
//! - [`CommandError`]: a subprocess could not run or finished unsuccessfully
//! - [`DownloadError`]: an HTTP transfer failed, always tagged with its URL
//! - [`InstallError`]: everything an installation attempt can surface, including
//!   preconditions and the typed "not implemented" paths

use super::context::ContextError;
use super::entities::InstallMethod;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("failed to start `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("`{command}` was canceled by the caller")]
    Canceled { command: String },

    #[error("`{command}` exceeded its deadline")]
    TimedOut { command: String },

    #[error("`{command}` was killed by signal {signal}")]
    Signaled { command: String, signal: i32 },

    #[error("`{command}` exited with code {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },
}

impl CommandError {
    pub fn from_context(command: impl Into<String>, reason: ContextError) -> Self {
        let command = command.into();
        match reason {
            ContextError::Canceled => CommandError::Canceled { command },
            ContextError::DeadlineExceeded => CommandError::TimedOut { command },
        }
    }

    pub fn command(&self) -> &str {
        match self {
            CommandError::Spawn { command, .. }
            | CommandError::Canceled { command }
            | CommandError::TimedOut { command }
            | CommandError::Signaled { command, .. }
            | CommandError::Failed { command, .. } => command,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            CommandError::Canceled { .. } | CommandError::TimedOut { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("download of {url} failed with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("download of {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("download of {url} interrupted: {reason}")]
    Interrupted { url: String, reason: ContextError },

    #[error("could not write {url} to {path}: {message}")]
    Write {
        url: String,
        path: PathBuf,
        message: String,
    },
}

impl DownloadError {
    pub fn url(&self) -> &str {
        match self {
            DownloadError::Status { url, .. }
            | DownloadError::Transport { url, .. }
            | DownloadError::Interrupted { url, .. }
            | DownloadError::Write { url, .. } => url,
        }
    }
}

#[derive(Debug, Error)]
pub enum InstallError {
    /// A tool the method depends on is not installed.
    #[error("{tool} is not installed; install it before using the {method} method")]
    ToolMissing { tool: String, method: InstallMethod },

    #[error("installation method {0} is not supported by the installer")]
    UnsupportedMethod(InstallMethod),

    #[error("invalid package: {0}")]
    InvalidPackage(String),

    #[error("{feature} is not implemented")]
    NotImplemented { feature: String },

    #[error("no release asset of {repository} matches this platform ({arch})")]
    NoMatchingAsset { repository: String, arch: String },

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InstallError {
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        InstallError::NotImplemented {
            feature: feature.into(),
        }
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, InstallError::NotImplemented { .. })
    }

    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            InstallError::ToolMissing { .. }
                | InstallError::UnsupportedMethod(_)
                | InstallError::InvalidPackage(_)
        )
    }
}

pub type InstallResult<T> = std::result::Result<T, InstallError>;

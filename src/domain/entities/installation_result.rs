use super::Package;
use crate::domain::errors::InstallError;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyPresent,
    DryRun,
    Installed,
    Failed,
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallOutcome::AlreadyPresent => write!(f, "already present"),
            InstallOutcome::DryRun => write!(f, "dry run"),
            InstallOutcome::Installed => write!(f, "installed"),
            InstallOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// The finalized record of one installation attempt.
#[derive(Debug)]
pub struct InstallationResult {
    pub package: Package,
    pub success: bool,
    pub error: Option<InstallError>,
    pub output: String,
    pub duration: Duration,
    pub outcome: InstallOutcome,
    pub finished_at: DateTime<Utc>,
}

impl InstallationResult {
    /// Opens an attempt; the returned value must be finalized exactly once.
    pub fn begin(package: Package) -> InstallAttempt {
        InstallAttempt {
            package,
            output: String::new(),
            started: Instant::now(),
        }
    }

    pub fn duration_ms(&self) -> u128 {
        self.duration.as_millis()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}

/// An attempt in flight. It reports `success = false` until one of the
/// consuming finalizers turns it into an [`InstallationResult`].
#[derive(Debug)]
pub struct InstallAttempt {
    package: Package,
    output: String,
    started: Instant,
}

impl InstallAttempt {
    pub fn success(&self) -> bool {
        false
    }

    pub fn log(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref().trim_end();
        if line.is_empty() {
            return;
        }
        if !self.output.is_empty() {
            self.output.push('\n');
        }
        self.output.push_str(line);
    }

    pub fn succeed(self, outcome: InstallOutcome) -> InstallationResult {
        self.finish(true, outcome, None)
    }

    pub fn fail(mut self, error: InstallError) -> InstallationResult {
        self.log(format!("error: {}", error));
        self.finish(false, InstallOutcome::Failed, Some(error))
    }

    fn finish(
        self,
        success: bool,
        outcome: InstallOutcome,
        error: Option<InstallError>,
    ) -> InstallationResult {
        InstallationResult {
            package: self.package,
            success,
            error,
            output: self.output,
            duration: self.started.elapsed(),
            outcome,
            finished_at: Utc::now(),
        }
    }
}

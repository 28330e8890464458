//! Typed domain error enums.
//!
//! Every failure the provisioner can report is one of these. Adapter-level
//! causes (process spawn, pipe and filesystem errors) travel as `anyhow::Error`
//! sources so the full chain is printed with `{err:#}`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ── Configuration errors ──────────────────────────────────────────────────────

/// A single invalid entry in the provisioner configuration.
#[derive(Debug, Error)]
pub enum ConfigProblem {
    #[error("bad module path '{}': {reason}", path.display())]
    BadModulePath { path: PathBuf, reason: String },

    #[error(
        "module paths '{}' and '{}' would both upload to remote directory '{name}'",
        first.display(),
        second.display()
    )]
    DuplicateModuleName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("bad manifest file '{}': {reason}", path.display())]
    BadManifestFile { path: PathBuf, reason: String },
}

/// Configuration rejected before any remote action. Carries every problem
/// found, not just the first.
#[derive(Debug, Error)]
#[error("invalid provisioner configuration:{}", list_problems(.problems))]
pub struct ConfigError {
    pub problems: Vec<ConfigProblem>,
}

fn list_problems(problems: &[ConfigProblem]) -> String {
    problems.iter().map(|p| format!("\n  - {p}")).collect()
}

// ── Remote errors ─────────────────────────────────────────────────────────────

/// Failures talking to the remote machine.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The channel could not initiate the command.
    #[error("failed to start remote command `{command}`")]
    Start {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    /// The command ran but exited non-zero.
    #[error("remote command `{command}` exited with non-zero status {status}")]
    Execution { command: String, status: i32 },

    /// A directory creation or file upload failed mid-walk.
    #[error("failed to transfer '{}'", path.display())]
    Transfer {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl RemoteError {
    /// Exit status of a command that ran to completion with a failure.
    #[must_use]
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            Self::Execution { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// The provisioning steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Validate,
    Install,
    StageDirectories,
    UploadModules,
    UploadManifest,
    Execute,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validate => "validating configuration",
            Self::Install => "installing Puppet",
            Self::StageDirectories => "creating remote staging directories",
            Self::UploadModules => "uploading modules",
            Self::UploadManifest => "uploading manifest",
            Self::Execute => "running Puppet",
        })
    }
}

/// Terminal failure of a provisioning attempt.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("error {step}")]
    Step {
        step: Step,
        #[source]
        source: RemoteError,
    },
}

impl ProvisionError {
    /// The step that failed.
    #[must_use]
    pub fn step(&self) -> Step {
        match self {
            Self::Config(_) => Step::Validate,
            Self::Step { step, .. } => *step,
        }
    }

    /// The remote failure, if the attempt got past validation.
    #[must_use]
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Config(_) => None,
            Self::Step { source, .. } => Some(source),
        }
    }
}

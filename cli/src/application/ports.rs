//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) the host orchestrator must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`
//! or `crate::output`.

use std::fmt;

use anyhow::Result;
use tokio::io::AsyncRead;
use tokio::sync::oneshot;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Boxed byte stream produced by a remote process.
pub type OutputReader = Box<dyn AsyncRead + Send + Unpin>;

/// Which output stream of a remote process a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        })
    }
}

/// Handle to a command started on the remote machine.
///
/// Both readers must reach end-of-file once the process has terminated, and
/// `exit` resolves exactly once with the process exit status. The readers and
/// the exit status are independent: a channel may report the status before
/// the last bytes of output have been read.
pub struct RemoteProcess {
    pub stdout: OutputReader,
    pub stderr: OutputReader,
    pub exit: oneshot::Receiver<Result<i32>>,
}

impl RemoteProcess {
    pub fn new(
        stdout: impl AsyncRead + Send + Unpin + 'static,
        stderr: impl AsyncRead + Send + Unpin + 'static,
        exit: oneshot::Receiver<Result<i32>>,
    ) -> Self {
        Self {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            exit,
        }
    }
}

// ── Remote Channel Port ───────────────────────────────────────────────────────

/// Command execution and file transfer on the provisioned machine.
///
/// Supplied by the host orchestrator, already connected. Implementations do
/// not retry.
#[allow(async_fn_in_trait)]
pub trait RemoteChannel {
    /// Start `command` through the remote shell.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be initiated.
    async fn start(&self, command: &str) -> Result<RemoteProcess>;

    /// Stream `contents` into the file at `remote_path`, replacing it.
    /// The parent directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer fails.
    async fn upload(
        &self,
        remote_path: &str,
        contents: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Reporting sink for one provisioning invocation. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit one line of remote command output.
    fn output(&self, stream: OutputStream, line: &str);
}

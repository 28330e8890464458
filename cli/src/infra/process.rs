//! Spawning local processes as [`RemoteProcess`] handles.
//!
//! Shared by the channel implementations: the child's stdout and stderr are
//! piped and handed out as readers, and a waiter task reports the exit status.
//! Stdin is closed so commands can never block on a prompt.

use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use tokio::process::Command;
use tokio::sync::oneshot;

use crate::application::ports::RemoteProcess;

/// Spawn `command` with piped output and return it as a [`RemoteProcess`].
///
/// # Errors
///
/// Returns an error if the process cannot be spawned.
pub fn spawn_streaming(mut command: Command, program: &str) -> Result<RemoteProcess> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))?;

    let stdout = child.stdout.take().context("child stdout not captured")?;
    let stderr = child.stderr.take().context("child stderr not captured")?;

    let (tx, rx) = oneshot::channel();
    let program = program.to_owned();
    tokio::spawn(async move {
        let status = child
            .wait()
            .await
            .map(exit_code)
            .with_context(|| format!("waiting for {program}"));
        let _ = tx.send(status);
    });

    Ok(RemoteProcess::new(stdout, stderr, rx))
}

/// Numeric exit status; a signal-terminated process maps to `128 + signal`
/// like a POSIX shell reports it.
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

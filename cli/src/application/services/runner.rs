//! Application service: run one command on the remote machine and stream its
//! output to the reporter.
//!
//! Each output stream is drained by its own task into a bounded channel. The
//! caller multiplexes both channels and the exit status with `tokio::select!`
//! and only returns once all three sources are exhausted, so output written
//! right before exit is never lost.

use anyhow::anyhow;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::application::ports::{
    OutputReader, OutputStream, ProgressReporter, RemoteChannel, RemoteProcess,
};
use crate::domain::error::RemoteError;

/// Lines buffered per stream before the drain task waits for the reporter.
const LINE_BUFFER: usize = 64;

/// Run `command` through `channel`, forwarding every output line to `reporter`.
///
/// # Errors
///
/// Returns [`RemoteError::Start`] if the command cannot be started or its exit
/// status is never reported, and [`RemoteError::Execution`] on a non-zero exit.
pub async fn run_command(
    channel: &impl RemoteChannel,
    reporter: &impl ProgressReporter,
    command: &str,
) -> Result<(), RemoteError> {
    tracing::info!(command, "executing remote command");
    let RemoteProcess {
        stdout,
        stderr,
        mut exit,
    } = channel
        .start(command)
        .await
        .map_err(|source| RemoteError::Start {
            command: command.to_owned(),
            source,
        })?;

    let mut stdout_lines = spawn_line_reader(stdout, OutputStream::Stdout);
    let mut stderr_lines = spawn_line_reader(stderr, OutputStream::Stderr);
    let mut stdout_open = true;
    let mut stderr_open = true;
    let mut exit_status: Option<anyhow::Result<i32>> = None;

    loop {
        tokio::select! {
            line = stdout_lines.recv(), if stdout_open => match line {
                Some(line) => forward(reporter, OutputStream::Stdout, &line),
                None => stdout_open = false,
            },
            line = stderr_lines.recv(), if stderr_open => match line {
                Some(line) => forward(reporter, OutputStream::Stderr, &line),
                None => stderr_open = false,
            },
            status = &mut exit, if exit_status.is_none() => {
                // Keep draining: lines may still be in flight behind the status.
                exit_status = Some(
                    status.unwrap_or_else(|_| Err(anyhow!("exit status never reported"))),
                );
            }
            else => break,
        }
    }

    match exit_status.unwrap_or_else(|| Err(anyhow!("exit status never reported"))) {
        Ok(0) => {
            tracing::info!(command, status = 0, "remote command exited");
            Ok(())
        }
        Ok(status) => {
            tracing::info!(command, status, "remote command exited");
            Err(RemoteError::Execution {
                command: command.to_owned(),
                status,
            })
        }
        Err(source) => {
            tracing::warn!(command, error = %source, "remote command lost");
            Err(RemoteError::Start {
                command: command.to_owned(),
                source,
            })
        }
    }
}

fn forward(reporter: &impl ProgressReporter, stream: OutputStream, line: &str) {
    tracing::debug!(%stream, "{line}");
    reporter.output(stream, line);
}

/// Drain `reader` line by line on a separate task. The returned receiver
/// closes when the stream reaches end-of-file or fails.
fn spawn_line_reader(reader: OutputReader, stream: OutputStream) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(LINE_BUFFER);
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).trim_end().to_owned();
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(%stream, error = %e, "failed reading remote output");
                    break;
                }
            }
        }
    });
    rx
}

//! `RemoteChannel` over the system `ssh` client.
//!
//! The host must already be reachable and authenticated non-interactively;
//! `BatchMode=yes` makes ssh fail instead of prompting.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::process::Command;

use crate::application::ports::{RemoteChannel, RemoteProcess};
use crate::domain::command::shell_quote;
use crate::infra::process::{exit_code, spawn_streaming};

/// Channel running every command as `ssh <target> -- <command>`.
pub struct SshChannel {
    target: String,
    options: Vec<String>,
}

impl SshChannel {
    /// `target` is anything ssh accepts as a destination (`user@host`, a
    /// `Host` alias). Each `options` entry is passed as `-o <option>`.
    #[must_use]
    pub fn new(target: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            target: target.into(),
            options,
        }
    }

    /// Arguments passed to `ssh` to run `remote_command`.
    #[must_use]
    pub fn args(&self, remote_command: &str) -> Vec<String> {
        let mut args = vec!["-o".to_string(), "BatchMode=yes".to_string()];
        for option in &self.options {
            args.push("-o".to_string());
            args.push(option.clone());
        }
        args.push(self.target.clone());
        args.push("--".to_string());
        args.push(remote_command.to_string());
        args
    }

    fn command(&self, remote_command: &str) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.args(self.args(remote_command));
        cmd
    }

    /// `ssh … -- cat > <path>` fed through stdin. The child is killed if the
    /// upload is abandoned before it exits.
    fn upload_command(&self, remote_path: &str) -> Command {
        let mut cmd = self.command(&format!("cat > {}", shell_quote(remote_path)));
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl RemoteChannel for SshChannel {
    async fn start(&self, command: &str) -> Result<RemoteProcess> {
        spawn_streaming(self.command(command), "ssh")
    }

    async fn upload(
        &self,
        remote_path: &str,
        contents: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<()> {
        let mut child = self
            .upload_command(remote_path)
            .spawn()
            .context("failed to spawn ssh")?;

        let mut stdin = child.stdin.take().context("ssh stdin not captured")?;
        tokio::io::copy(contents, &mut stdin)
            .await
            .with_context(|| format!("streaming {remote_path} over ssh"))?;
        stdin.shutdown().await.context("closing ssh stdin")?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .context("waiting for ssh upload")?;
        if !output.status.success() {
            anyhow::bail!(
                "ssh upload exited with status {}: {}",
                exit_code(output.status),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

//! `RemoteChannel` targeting the machine the provisioner runs on.
//!
//! Commands run through `sh -c`; uploads are plain file writes.

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::process::Command;

use crate::application::ports::{RemoteChannel, RemoteProcess};
use crate::infra::process::spawn_streaming;

/// Channel executing on the local machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalChannel;

impl RemoteChannel for LocalChannel {
    async fn start(&self, command: &str) -> Result<RemoteProcess> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        spawn_streaming(cmd, "sh")
    }

    async fn upload(
        &self,
        remote_path: &str,
        contents: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<()> {
        let mut file = tokio::fs::File::create(remote_path)
            .await
            .with_context(|| format!("cannot create {remote_path}"))?;
        tokio::io::copy(contents, &mut file)
            .await
            .with_context(|| format!("cannot write {remote_path}"))?;
        file.flush()
            .await
            .with_context(|| format!("cannot flush {remote_path}"))
    }
}

//! Application service: replay a local directory tree on the remote machine.
//!
//! The walk is depth-first with siblings in file-name order. Each entry is
//! handled as soon as it is visited and the first failure aborts the walk,
//! so nothing after a failing entry is touched. Symlinks to files upload the
//! target's contents; symlinks to directories are skipped with a warning.

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};

use crate::application::ports::{ProgressReporter, RemoteChannel};
use crate::application::services::runner::run_command;
use crate::domain::command::mkdir_command;
use crate::domain::config::{join_remote, local_root_name};
use crate::domain::error::RemoteError;

/// Create `path` on the remote machine, including missing parents.
///
/// # Errors
///
/// Returns the [`run_command`] error of the underlying `mkdir -p`.
pub async fn create_remote_directory(
    channel: &impl RemoteChannel,
    reporter: &impl ProgressReporter,
    path: &str,
) -> Result<(), RemoteError> {
    tracing::info!(path, "creating remote directory");
    run_command(channel, reporter, &mkdir_command(path)).await
}

/// Upload `local_root` so that it lands at `remote_root/<name of local_root>`.
///
/// Returns the remote path of the uploaded root directory.
///
/// # Errors
///
/// Returns [`RemoteError::Transfer`] naming the first local entry that could
/// not be read, created or uploaded.
pub async fn upload_directory(
    channel: &impl RemoteChannel,
    reporter: &impl ProgressReporter,
    local_root: &Path,
    remote_root: &str,
) -> Result<String, RemoteError> {
    let name = local_root_name(local_root)
        .ok_or_else(|| transfer(local_root, anyhow!("cannot determine directory name")))?;
    let remote_base = join_remote(remote_root, &name);
    tracing::info!(
        local = %local_root.display(),
        remote = %remote_base,
        "uploading directory"
    );

    // The root may itself be a symlink; entries below it are not followed
    // into when they link to directories.
    let mut pending = vec![(local_root.to_path_buf(), remote_base.clone(), true)];
    while let Some((local, remote, is_root)) = pending.pop() {
        let meta = entry_metadata(&local, is_root)
            .await
            .map_err(|e| transfer(&local, e))?;

        if meta.is_symlink() {
            let target = tokio::fs::metadata(&local)
                .await
                .with_context(|| format!("cannot follow symlink {}", local.display()))
                .map_err(|e| transfer(&local, e))?;
            if target.is_dir() {
                tracing::warn!(path = %local.display(), "skipping directory symlink");
                reporter.warn(&format!("skipping directory symlink {}", local.display()));
            } else {
                upload_file(channel, &local, &remote).await?;
            }
        } else if meta.is_dir() {
            create_remote_directory(channel, reporter, &remote)
                .await
                .map_err(|e| transfer(&local, e.into()))?;
            let children = sorted_children(&local)
                .await
                .map_err(|e| transfer(&local, e))?;
            // Reversed so the stack pops them in name order.
            for (child, child_name) in children.into_iter().rev() {
                let child_remote = join_remote(&remote, &child_name);
                pending.push((child, child_remote, false));
            }
        } else {
            upload_file(channel, &local, &remote).await?;
        }
    }

    Ok(remote_base)
}

/// Stream one local file to `remote_path` with a single upload call.
///
/// # Errors
///
/// Returns [`RemoteError::Transfer`] if the file cannot be opened or uploaded.
pub async fn upload_file(
    channel: &impl RemoteChannel,
    local: &Path,
    remote_path: &str,
) -> Result<(), RemoteError> {
    tracing::debug!(local = %local.display(), remote = remote_path, "uploading file");
    let mut file = tokio::fs::File::open(local)
        .await
        .with_context(|| format!("cannot open {}", local.display()))
        .map_err(|e| transfer(local, e))?;
    channel
        .upload(remote_path, &mut file)
        .await
        .with_context(|| format!("upload to {remote_path}"))
        .map_err(|e| transfer(local, e))
}

async fn entry_metadata(path: &Path, follow: bool) -> anyhow::Result<std::fs::Metadata> {
    let meta = if follow {
        tokio::fs::metadata(path).await
    } else {
        tokio::fs::symlink_metadata(path).await
    };
    meta.with_context(|| format!("cannot stat {}", path.display()))
}

async fn sorted_children(dir: &Path) -> anyhow::Result<Vec<(PathBuf, String)>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("cannot read directory {}", dir.display()))?;
    let mut children = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("cannot read directory {}", dir.display()))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        children.push((entry.path(), name));
    }
    children.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(children)
}

fn transfer(path: &Path, source: anyhow::Error) -> RemoteError {
    RemoteError::Transfer {
        path: path.to_path_buf(),
        source,
    }
}

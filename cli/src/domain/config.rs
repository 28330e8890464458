//! Provisioner configuration: the option payload schema, its validation and
//! the remote staging layout derived from it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::error::{ConfigError, ConfigProblem};

// ── Constants ────────────────────────────────────────────────────────────────

/// Module directory used when the payload names none.
pub const DEFAULT_MODULES_PATH: &str = "modules";

/// Remote staging root used when the payload names none.
pub const DEFAULT_STAGING_DIR: &str = "/tmp/provision/puppet";

// ── Config schema ────────────────────────────────────────────────────────────

/// Options consumed from the orchestrator's payload. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    /// Local module directories to upload, in order.
    pub modules_paths: Vec<PathBuf>,
    /// Run commands without the `sudo` prefix.
    pub prevent_sudo: bool,
    /// Skip the Puppet installation step.
    pub skip_install: bool,
    /// Local manifest to upload and apply.
    pub manifest_file: Option<PathBuf>,
    /// Remote staging root.
    pub staging_dir: String,
    /// Extra arguments appended to `puppet apply`.
    pub extra_arguments: Vec<String>,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            modules_paths: vec![PathBuf::from(DEFAULT_MODULES_PATH)],
            prevent_sudo: false,
            skip_install: false,
            manifest_file: None,
            staging_dir: DEFAULT_STAGING_DIR.to_string(),
            extra_arguments: Vec::new(),
        }
    }
}

impl ProvisionerConfig {
    /// Build a configuration from several payloads. Keys of later payloads
    /// replace those of earlier ones; a null payload contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if a payload is not a mapping or a key has the wrong type.
    pub fn from_payloads(payloads: impl IntoIterator<Item = serde_yaml::Value>) -> Result<Self> {
        let mut merged = serde_yaml::Mapping::new();
        for (index, payload) in payloads.into_iter().enumerate() {
            match payload {
                serde_yaml::Value::Mapping(map) => {
                    for (key, value) in map {
                        merged.insert(key, value);
                    }
                }
                serde_yaml::Value::Null => {}
                _ => anyhow::bail!("option payload #{} is not a mapping", index + 1),
            }
        }
        serde_yaml::from_value(serde_yaml::Value::Mapping(merged))
            .context("cannot decode provisioner options")
    }

    /// Check that every module path is an existing directory with a name no
    /// other module path shares, and that the manifest, if any, is an existing
    /// file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] listing all invalid paths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        let mut seen: HashMap<String, &PathBuf> = HashMap::new();

        for path in &self.modules_paths {
            let reason = match std::fs::metadata(path) {
                Ok(meta) if !meta.is_dir() => Some("not a directory".to_string()),
                Ok(_) if local_root_name(path).is_none() => {
                    Some("cannot determine directory name".to_string())
                }
                Ok(_) => None,
                Err(e) => Some(e.to_string()),
            };
            if let Some(reason) = reason {
                problems.push(ConfigProblem::BadModulePath {
                    path: path.clone(),
                    reason,
                });
                continue;
            }
            // Module paths land under the module root by name; equal names collide.
            if let Some(name) = local_root_name(path) {
                if let Some(first) = seen.get(&name) {
                    problems.push(ConfigProblem::DuplicateModuleName {
                        name,
                        first: (*first).clone(),
                        second: path.clone(),
                    });
                } else {
                    seen.insert(name, path);
                }
            }
        }

        if let Some(path) = &self.manifest_file {
            let reason = match std::fs::metadata(path) {
                Ok(meta) if !meta.is_file() => Some("not a regular file".to_string()),
                Ok(_) => None,
                Err(e) => Some(e.to_string()),
            };
            if let Some(reason) = reason {
                problems.push(ConfigProblem::BadManifestFile {
                    path: path.clone(),
                    reason,
                });
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { problems })
        }
    }

    /// Remote directories derived from `staging_dir`.
    #[must_use]
    pub fn layout(&self) -> RemoteLayout {
        RemoteLayout::new(&self.staging_dir)
    }
}

// ── Remote layout ────────────────────────────────────────────────────────────

/// Fixed remote directories used during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLayout {
    pub staging_root: String,
    pub module_root: String,
    pub manifest_root: String,
}

impl RemoteLayout {
    #[must_use]
    pub fn new(staging_dir: &str) -> Self {
        let trimmed = staging_dir.trim_end_matches('/');
        let staging_root = if trimmed.is_empty() { "/" } else { trimmed };
        Self {
            staging_root: staging_root.to_string(),
            module_root: join_remote(staging_root, "modules"),
            manifest_root: join_remote(staging_root, "manifest"),
        }
    }
}

/// Join a remote directory and a relative segment with `/`, whatever the
/// local platform separator is.
#[must_use]
pub fn join_remote(base: &str, segment: &str) -> String {
    let base = base.trim_end_matches('/');
    let segment = segment.trim_start_matches('/');
    format!("{base}/{segment}")
}

/// The name a local directory gets when nested under a remote root:
/// its final path component, resolving `.`/`..` against the filesystem.
#[must_use]
pub fn local_root_name(path: &Path) -> Option<String> {
    let name = match path.file_name() {
        Some(name) => name.to_os_string(),
        None => path.canonicalize().ok()?.file_name()?.to_os_string(),
    };
    Some(name.to_string_lossy().into_owned())
}

// ── Unit tests ───────────────────────────────────────────────────────────────

//! Loading provisioner option payloads from disk.
//!
//! Files ending in `.json` are parsed with `serde_json`; everything else is
//! parsed as YAML. Payloads are merged in order, later keys winning.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::config::ProvisionerConfig;

/// Read every payload in `paths` and merge them into one configuration.
/// No paths yields the default configuration.
///
/// # Errors
///
/// Returns an error naming the file that cannot be read or parsed.
pub fn load_payloads(paths: &[PathBuf]) -> Result<ProvisionerConfig> {
    let payloads = paths
        .iter()
        .map(|path| read_payload(path))
        .collect::<Result<Vec<_>>>()?;
    ProvisionerConfig::from_payloads(payloads)
}

fn read_payload(path: &Path) -> Result<serde_yaml::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let json: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?;
        serde_yaml::to_value(json).with_context(|| format!("cannot convert {}", path.display()))
    } else {
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }
}

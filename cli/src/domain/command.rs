//! Remote command-line construction. Pure functions only.

use crate::domain::config::ProvisionerConfig;

/// Prefix requesting elevated privileges.
pub const ELEVATION_PREFIX: &str = "sudo ";

/// Command installing Puppet on the remote machine.
pub const INSTALL_PUPPET: &str = "gem install puppet";

/// Prefix `base` with the elevation prefix when `elevate` is set.
#[must_use]
pub fn elevate(base: &str, elevate: bool) -> String {
    if elevate {
        format!("{ELEVATION_PREFIX}{base}")
    } else {
        base.to_string()
    }
}

/// Quote `arg` for a POSIX shell. Arguments made only of safe characters are
/// returned unchanged.
#[must_use]
pub fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// `mkdir -p` for a remote directory, creating missing parents.
#[must_use]
pub fn mkdir_command(path: &str) -> String {
    format!("mkdir -p {}", shell_quote(path))
}

/// The Puppet installation command for `config`.
#[must_use]
pub fn install_command(config: &ProvisionerConfig) -> String {
    elevate(INSTALL_PUPPET, !config.prevent_sudo)
}

/// The `puppet apply` invocation over the uploaded module directories.
///
/// `module_dirs` are remote paths joined into `--modulepath`; `manifest` is the
/// remote manifest file or directory to apply.
#[must_use]
pub fn apply_command(config: &ProvisionerConfig, module_dirs: &[String], manifest: &str) -> String {
    let mut parts = vec!["puppet apply --verbose".to_string()];
    if !module_dirs.is_empty() {
        parts.push(format!("--modulepath={}", shell_quote(&module_dirs.join(":"))));
    }
    parts.extend(config.extra_arguments.iter().map(|a| shell_quote(a)));
    parts.push(shell_quote(manifest));
    elevate(&parts.join(" "), !config.prevent_sudo)
}

//! Application service: the provisioning sequence.
//!
//! Imports only from `crate::domain` and `crate::application`. All remote I/O
//! is routed through the injected [`RemoteChannel`] and all user-facing output
//! through the injected [`ProgressReporter`].

use crate::application::ports::{ProgressReporter, RemoteChannel};
use crate::application::services::runner::run_command;
use crate::application::services::upload::{
    create_remote_directory, upload_directory, upload_file,
};
use crate::domain::command::{apply_command, install_command};
use crate::domain::config::{ProvisionerConfig, join_remote, local_root_name};
use crate::domain::error::{ProvisionError, RemoteError, Step};

/// Provision the machine behind `channel` according to `config`.
///
/// Steps run strictly in order: validate, install (unless skipped), stage
/// directories, upload modules, upload manifest (if configured), run Puppet.
/// The first failure ends the attempt; nothing is retried or rolled back.
///
/// # Errors
///
/// Returns [`ProvisionError::Config`] if validation fails, otherwise
/// [`ProvisionError::Step`] naming the failed step.
pub async fn provision(
    channel: &impl RemoteChannel,
    reporter: &impl ProgressReporter,
    config: &ProvisionerConfig,
) -> Result<(), ProvisionError> {
    config.validate()?;
    let layout = config.layout();

    if config.skip_install {
        tracing::info!("skipping Puppet installation");
    } else {
        reporter.step("installing Puppet...");
        run_command(channel, reporter, &install_command(config))
            .await
            .map_err(at(Step::Install))?;
        reporter.success("Puppet installed");
    }

    for dir in [&layout.module_root, &layout.manifest_root] {
        create_remote_directory(channel, reporter, dir)
            .await
            .map_err(at(Step::StageDirectories))?;
    }

    let mut module_dirs = Vec::with_capacity(config.modules_paths.len());
    for path in &config.modules_paths {
        reporter.step(&format!("copying module path: {}", path.display()));
        let remote = upload_directory(channel, reporter, path, &layout.module_root)
            .await
            .map_err(at(Step::UploadModules))?;
        module_dirs.push(remote);
    }

    let manifest = match &config.manifest_file {
        Some(local) => {
            reporter.step(&format!("copying manifest: {}", local.display()));
            let name = local_root_name(local).unwrap_or_else(|| "site.pp".to_string());
            let remote = join_remote(&layout.manifest_root, &name);
            upload_file(channel, local, &remote)
                .await
                .map_err(at(Step::UploadManifest))?;
            remote
        }
        None => layout.manifest_root.clone(),
    };

    reporter.step("beginning Puppet run");
    run_command(channel, reporter, &apply_command(config, &module_dirs, &manifest))
        .await
        .map_err(at(Step::Execute))?;
    reporter.success("Puppet run complete");
    Ok(())
}

fn at(step: Step) -> impl FnOnce(RemoteError) -> ProvisionError {
    move |source| {
        tracing::warn!(%step, error = %source, "provisioning step failed");
        ProvisionError::Step { step, source }
    }
}

//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser};

use crate::application::services::provision;
use crate::domain::config::ProvisionerConfig;
use crate::infra::config::load_payloads;
use crate::infra::{LocalChannel, SshChannel};
use crate::output::{OutputContext, TerminalReporter};

/// Upload Puppet modules to a machine and run Puppet on it
#[derive(Parser)]
#[command(name = "puppet-provision", version)]
#[command(group(ArgGroup::new("target").required(true).args(["ssh", "local"])))]
pub struct Cli {
    /// Option payload (YAML, or JSON with a .json extension); repeatable, later files win
    #[arg(short, long = "config", value_name = "FILE")]
    pub configs: Vec<PathBuf>,

    /// Provision the host reachable as this ssh destination
    #[arg(long, value_name = "TARGET")]
    pub ssh: Option<String>,

    /// Extra ssh option passed as `-o OPTION`; repeatable
    #[arg(
        short = 'o',
        long = "ssh-option",
        value_name = "OPTION",
        conflicts_with = "local"
    )]
    pub ssh_options: Vec<String>,

    /// Provision the machine this command runs on
    #[arg(long)]
    pub local: bool,

    /// Skip installing Puppet (overrides the payload)
    #[arg(long)]
    pub skip_install: bool,

    /// Run commands without sudo (overrides the payload)
    #[arg(long)]
    pub prevent_sudo: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output (any non-empty `NO_COLOR` value counts)
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,
}

impl Cli {
    /// Merge the option payloads with the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a payload cannot be read or decoded.
    pub fn config(&self) -> Result<ProvisionerConfig> {
        let mut config = load_payloads(&self.configs)?;
        if self.skip_install {
            config.skip_install = true;
        }
        if self.prevent_sudo {
            config.prevent_sudo = true;
        }
        Ok(config)
    }

    /// Execute the provisioning run.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or any step fails.
    pub async fn run(self) -> Result<()> {
        let config = self.config()?;
        let ctx = OutputContext::new(self.no_color, self.quiet);
        let reporter = TerminalReporter::new(&ctx);

        match self.ssh {
            Some(target) => {
                tracing::info!(%target, "provisioning over ssh");
                let channel = SshChannel::new(target, self.ssh_options);
                provision(&channel, &reporter, &config).await?;
            }
            None => {
                tracing::info!("provisioning local machine");
                provision(&LocalChannel, &reporter, &config).await?;
            }
        }

        ctx.success("provisioning complete");
        Ok(())
    }
}

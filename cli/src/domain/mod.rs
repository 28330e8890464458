//! Domain layer: configuration, remote command construction and the error
//! taxonomy.
//!
//! This module has zero imports from `crate::infra`, `crate::application`,
//! `crate::output` or `tokio`. Apart from path validation, which stats the
//! local filesystem, all functions take data in and return data out.

pub mod command;
pub mod config;
pub mod error;

pub use config::{ProvisionerConfig, RemoteLayout};
pub use error::{ConfigError, ConfigProblem, ProvisionError, RemoteError, Step};

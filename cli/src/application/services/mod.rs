//! Application services: the remote command runner, the directory uploader
//! and the provisioning sequence built on both.

pub mod provision;
pub mod runner;
pub mod upload;

pub use provision::provision;
pub use runner::run_command;
pub use upload::{create_remote_directory, upload_directory, upload_file};

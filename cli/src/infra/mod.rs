//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all host-side I/O: spawning `ssh` / `sh`, writing
//! uploaded files and reading option payloads.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::output` or `crate::cli` are forbidden.

pub mod config;
pub mod local;
pub mod process;
pub mod ssh;

pub use local::LocalChannel;
pub use ssh::SshChannel;

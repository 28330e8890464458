//! Unit tests for puppet-provision
//!
//! These tests use a recording channel and run fast without remote I/O.

mod helpers;

//! Integration tests for the puppet-provision binary: argument parsing,
//! configuration errors and a full run against the local machine.

#![allow(clippy::expect_used)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn puppet_provision() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("puppet-provision"));
    cmd.env("NO_COLOR", "1");
    cmd
}

// --- Help and argument tests ---

#[test]
fn test_cli_help_flag_shows_help() {
    puppet_provision()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--ssh"))
        .stdout(predicate::str::contains("--local"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    puppet_provision()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_accepts_any_no_color_value() {
    for value in ["1", "true", "yes"] {
        Command::new(assert_cmd::cargo::cargo_bin!("puppet-provision"))
            .env("NO_COLOR", value)
            .args(["--local", "-c", "/nonexistent/options.yaml"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("cannot read /nonexistent/options.yaml"));
    }
}

#[test]
fn test_cli_ssh_option_rejected_for_local_target() {
    puppet_provision()
        .args(["--local", "-o", "Port=22"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--ssh-option"));
}

#[test]
fn test_cli_missing_target_exits_2() {
    puppet_provision()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--ssh"));
}

#[test]
fn test_cli_unreadable_payload_fails() {
    puppet_provision()
        .args(["--local", "-c", "/nonexistent/options.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/nonexistent/options.yaml"));
}

#[test]
fn test_cli_bad_module_paths_listed_together() {
    let dir = TempDir::new().expect("tempdir");
    let payload = dir.path().join("options.yaml");
    std::fs::write(
        &payload,
        "modules_paths:\n  - /nonexistent/one\n  - /nonexistent/two\n",
    )
    .expect("write");

    puppet_provision()
        .args(["--local", "--skip-install", "-c"])
        .arg(&payload)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid provisioner configuration"))
        .stderr(predicate::str::contains("bad module path '/nonexistent/one'"))
        .stderr(predicate::str::contains("bad module path '/nonexistent/two'"));
}

// --- Local end-to-end runs ---

#[cfg(unix)]
mod local {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// A fake `puppet` that records its arguments and exits with `status`.
    fn fake_puppet(bin: &Path, record: &Path, status: i32) {
        std::fs::create_dir_all(bin).expect("mkdir");
        let script = bin.join("puppet");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\necho \"Notice: applying\"\necho \"$@\" > '{}'\nexit {status}\n",
                record.display()
            ),
        )
        .expect("write");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
            .expect("chmod");
    }

    /// A workspace with `modules/ntp/init.pp` and a payload staging into
    /// `<tmp>/stage`.
    fn workspace() -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        let ntp = dir.path().join("modules").join("ntp");
        std::fs::create_dir_all(&ntp).expect("mkdir");
        std::fs::write(ntp.join("init.pp"), "class ntp {}\n").expect("write");
        std::fs::write(
            dir.path().join("options.yaml"),
            format!(
                "modules_paths:\n  - {}\nstaging_dir: {}\n",
                dir.path().join("modules").display(),
                dir.path().join("stage").display()
            ),
        )
        .expect("write");
        dir
    }

    fn run_local(dir: &TempDir) -> assert_cmd::assert::Assert {
        let path = format!(
            "{}:{}",
            dir.path().join("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );
        puppet_provision()
            .env("PATH", path)
            .args(["--local", "--skip-install", "--prevent-sudo", "-c"])
            .arg(dir.path().join("options.yaml"))
            .assert()
    }

    #[test]
    fn test_local_run_uploads_modules_and_applies() {
        let dir = workspace();
        let record = dir.path().join("puppet-args");
        fake_puppet(&dir.path().join("bin"), &record, 0);

        run_local(&dir)
            .success()
            .stdout(predicate::str::contains("Notice: applying"))
            .stdout(predicate::str::contains("provisioning complete"));

        let stage = dir.path().join("stage");
        let uploaded = std::fs::read_to_string(stage.join("modules/modules/ntp/init.pp"))
            .expect("uploaded module");
        assert_eq!(uploaded, "class ntp {}\n");
        assert!(stage.join("manifest").is_dir());

        let args = std::fs::read_to_string(&record).expect("puppet args");
        assert!(args.starts_with("apply --verbose --modulepath="), "got: {args}");
        assert!(
            args.contains(&format!("{}", stage.join("modules/modules").display())),
            "got: {args}"
        );
    }

    #[test]
    fn test_local_run_reports_puppet_failure() {
        let dir = workspace();
        fake_puppet(&dir.path().join("bin"), &dir.path().join("puppet-args"), 4);

        run_local(&dir)
            .code(1)
            .stderr(predicate::str::contains("error running Puppet"))
            .stderr(predicate::str::contains("non-zero status 4"));
    }

    #[test]
    fn test_quiet_run_hides_remote_output() {
        let dir = workspace();
        fake_puppet(&dir.path().join("bin"), &dir.path().join("puppet-args"), 0);

        let path = format!(
            "{}:{}",
            dir.path().join("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );
        puppet_provision()
            .env("PATH", path)
            .args(["--local", "--skip-install", "--prevent-sudo", "-q", "-c"])
            .arg(dir.path().join("options.yaml"))
            .assert()
            .success()
            .stdout(predicate::str::contains("Notice: applying").not());
    }
}

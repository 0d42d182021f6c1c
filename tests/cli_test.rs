//! # CLI Tests
//!
//! End-to-end tests of the `pgp-import` binary: prompts, flags, settings,
//! the printed summary and exit codes. They run against the native store so
//! they do not need GnuPG.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test cli_test
//! ```

#![cfg(feature = "native")]

mod common;

use common::{default_home, fixture, new_homedir, pgp_import_bin, pgp_import_cmd, ALICE, BOB};
use predicates::prelude::*;
use std::fs;
use std::process::Command as StdCommand;
use tempfile::TempDir;

const HOMEDIR_PROMPT: &str = "Enter the GPG configuration directory path (optional): ";
const KEY_FILE_PROMPT: &str = "Enter the path and filename to the file of key(s): ";

fn stored(homedir: &std::path::Path, fingerprint: &str) -> bool {
    homedir
        .join("pubring.d")
        .join(format!("{fingerprint}.pgp"))
        .is_file()
}

#[test]
fn test_help_lists_options() {
    let output = StdCommand::new(pgp_import_bin())
        .arg("--help")
        .output()
        .expect("failed to run pgp-import");

    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    assert!(help.contains("--homedir"));
    assert!(help.contains("--backend"));
    assert!(help.contains("--details"));
}

#[test]
fn test_import_with_flags_prints_summary() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native", "--homedir"])
        .arg(homedir.path())
        .arg(fixture("alice.asc"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Total number of keys:   1"))
        .stdout(predicate::str::contains("Total number imported:  1"))
        .stdout(predicate::str::contains("Number of version 3 keys ignored:  0"))
        .stdout(predicate::str::contains(
            "Number of imported key objects or updates:  1",
        ))
        .stdout(predicate::str::contains("Number of unchanged keys:  0"))
        .stdout(predicate::str::contains("Number of new signatures:  0"))
        .stdout(predicate::str::contains("Number of revoked keys:    0"));

    assert!(stored(homedir.path(), ALICE));
}

#[test]
fn test_summary_layout_is_stable() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();

    let output = pgp_import_cmd(sandbox.path())
        .args(["--backend", "native", "--homedir"])
        .arg(homedir.path())
        .arg(fixture("both.asc"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let expected = "
Total number of keys:   2
Total number imported:  2
Number of version 3 keys ignored:  0

Number of imported key objects or updates:  2
Number of unchanged keys:  0
Number of new signatures:  0
Number of revoked keys:    0
";
    assert!(stdout.starts_with(expected), "unexpected summary:\n{stdout}");
}

#[test]
fn test_reimport_reports_unchanged() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();

    for _ in 0..2 {
        pgp_import_cmd(sandbox.path())
            .args(["--backend", "native", "--homedir"])
            .arg(homedir.path())
            .arg(fixture("alice.asc"))
            .assert()
            .success();
    }

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native", "--homedir"])
        .arg(homedir.path())
        .arg(fixture("alice.asc"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Total number of keys:   1"))
        .stdout(predicate::str::contains(
            "Number of imported key objects or updates:  0",
        ))
        .stdout(predicate::str::contains("Number of unchanged keys:  1"));
}

#[test]
fn test_revocation_is_counted() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native", "--homedir"])
        .arg(homedir.path())
        .arg(fixture("alice.asc"))
        .assert()
        .success();

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native", "--homedir"])
        .arg(homedir.path())
        .arg(fixture("alice-revoked.asc"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of revoked keys:    1"));
}

#[test]
fn test_prompts_for_homedir_and_key_file() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();
    let answers = format!(
        "{}\n{}\n",
        homedir.path().display(),
        fixture("alice.asc").display()
    );

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native"])
        .write_stdin(answers)
        .assert()
        .success()
        .stdout(predicate::str::contains(HOMEDIR_PROMPT))
        .stdout(predicate::str::contains(KEY_FILE_PROMPT))
        .stdout(predicate::str::contains("Total number imported:  1"));

    assert!(stored(homedir.path(), ALICE));
}

#[test]
fn test_homedir_flag_skips_homedir_prompt() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native", "--homedir"])
        .arg(homedir.path())
        .write_stdin(format!("{}\n", fixture("bob.asc").display()))
        .assert()
        .success()
        .stdout(predicate::str::contains(KEY_FILE_PROMPT))
        .stdout(predicate::str::contains(HOMEDIR_PROMPT).not());

    assert!(stored(homedir.path(), BOB));
}

#[test]
fn test_empty_homedir_answer_uses_default() {
    let sandbox = TempDir::new().unwrap();

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native"])
        .write_stdin(format!("\n{}\n", fixture("alice.asc").display()))
        .assert()
        .success();

    assert!(stored(&default_home(sandbox.path()), ALICE));
}

#[test]
fn test_nonexistent_homedir_falls_back_to_default() {
    let sandbox = TempDir::new().unwrap();
    let missing = sandbox.path().join("no-such-dir");

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native", "--homedir"])
        .arg(&missing)
        .arg(fixture("alice.asc"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Total number imported:  1"));

    assert!(!missing.exists());
    assert!(stored(&default_home(sandbox.path()), ALICE));
}

#[test]
fn test_empty_key_file_answer_fails() {
    let sandbox = TempDir::new().unwrap();

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native"])
        .write_stdin("\n\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stdout(predicate::str::contains("Total number").not());
}

#[test]
fn test_missing_key_file_fails_without_summary() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native", "--homedir"])
        .arg(homedir.path())
        .arg(sandbox.path().join("missing.asc"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stdout(predicate::str::contains("Total number").not());

    // The store was opened and must have been released.
    assert!(pgp_import::KeyStore::open(homedir.path()).is_ok());
}

#[test]
fn test_garbage_key_file_fails() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();
    let garbage = sandbox.path().join("garbage.asc");
    fs::write(&garbage, "this is not an OpenPGP key\n").unwrap();

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native", "--homedir"])
        .arg(homedir.path())
        .arg(&garbage)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Total number").not());
}

#[test]
fn test_leftover_lock_file_does_not_block_import() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();
    let store = homedir.path().join("pubring.d");
    fs::create_dir_all(&store).unwrap();
    fs::write(store.join(".lock"), "").unwrap();

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native", "--homedir"])
        .arg(homedir.path())
        .arg(fixture("alice.asc"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Total number imported:  1"));

    assert!(stored(homedir.path(), ALICE));
}

#[test]
fn test_store_held_by_another_process_fails() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();
    let _held = pgp_import::KeyStore::open(homedir.path()).unwrap();

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native", "--homedir"])
        .arg(homedir.path())
        .arg(fixture("alice.asc"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("locked"))
        .stdout(predicate::str::contains("Total number").not());
}

#[test]
fn test_details_lists_every_key() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "native", "--details", "--homedir"])
        .arg(homedir.path())
        .arg(fixture("both.asc"))
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("fpr: {ALICE} status: new")))
        .stdout(predicate::str::contains(format!("fpr: {BOB} status: new")));
}

#[test]
fn test_config_file_selects_backend() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();
    let config = sandbox.path().join("settings.toml");
    fs::write(&config, "backend = \"native\"\ngpg_program = \"/nonexistent/gpg\"\n").unwrap();

    pgp_import_cmd(sandbox.path())
        .arg("--config")
        .arg(&config)
        .arg("--homedir")
        .arg(homedir.path())
        .arg(fixture("alice.asc"))
        .assert()
        .success();

    assert!(stored(homedir.path(), ALICE));
}

#[test]
fn test_backend_from_environment() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();

    pgp_import_cmd(sandbox.path())
        .env("PGP_IMPORT_BACKEND", "native")
        .arg("--homedir")
        .arg(homedir.path())
        .arg(fixture("bob.asc"))
        .assert()
        .success();

    assert!(stored(homedir.path(), BOB));
}

#[test]
fn test_missing_explicit_config_fails() {
    let sandbox = TempDir::new().unwrap();

    pgp_import_cmd(sandbox.path())
        .arg("--config")
        .arg(sandbox.path().join("absent.toml"))
        .arg(fixture("alice.asc"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_unusable_gpg_program_fails_before_import() {
    let sandbox = TempDir::new().unwrap();
    let homedir = new_homedir();

    pgp_import_cmd(sandbox.path())
        .env("PGP_IMPORT_GPG_PROGRAM", "/nonexistent/bin/gpg")
        .args(["--backend", "gnupg", "--homedir"])
        .arg(homedir.path())
        .arg(fixture("alice.asc"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to open keyring context"))
        .stdout(predicate::str::contains("Total number").not());
}

#[test]
fn test_invalid_backend_is_rejected() {
    let sandbox = TempDir::new().unwrap();

    pgp_import_cmd(sandbox.path())
        .args(["--backend", "smartcard"])
        .arg(fixture("alice.asc"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("smartcard"));
}

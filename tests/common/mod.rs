use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};
use tempfile::TempDir;

pub const ALICE: &str = "F000AEE155BBB649233C4DC0C9CD0FE78E08F8A8";
#[allow(dead_code)]
pub const BOB: &str = "508C8F35193259EBDFF84CAF95FE06E39EFC015B";

/// Path to a key file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Create a fresh keyring directory that gpg accepts (mode 0700).
pub fn new_homedir() -> TempDir {
    let temp = TempDir::new().expect("failed to create temp dir");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o700))
            .expect("failed to set homedir permissions");
    }

    temp
}

/// Whether a usable `gpg` is on PATH.
#[allow(dead_code)]
pub fn gpg_available() -> bool {
    StdCommand::new("gpg")
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// The pgp-import binary, isolated from the caller's configuration.
///
/// `sandbox` receives the HOME and XDG config directories; the default
/// keyring directory is `sandbox/default-home`, created on demand.
#[allow(dead_code)]
pub fn pgp_import_cmd(sandbox: &Path) -> Command {
    let default_home = default_home(sandbox);
    fs::create_dir_all(&default_home).expect("failed to create default home");

    let mut cmd = cargo_bin_cmd!("pgp-import");
    cmd.env("HOME", sandbox.join("home"))
        .env("XDG_CONFIG_HOME", sandbox.join("xdg"))
        .env("PGP_IMPORT_DEFAULT_HOMEDIR", &default_home)
        .env_remove("PGP_IMPORT_BACKEND")
        .env_remove("PGP_IMPORT_GPG_PROGRAM")
        .env_remove("GNUPGHOME");
    cmd
}

#[allow(dead_code)]
pub fn default_home(sandbox: &Path) -> PathBuf {
    sandbox.join("default-home")
}

/// Absolute path to the pgp-import test binary.
#[allow(dead_code)]
pub fn pgp_import_bin() -> &'static str {
    env!("CARGO_BIN_EXE_pgp-import")
}

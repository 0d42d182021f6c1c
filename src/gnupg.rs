//! # GnuPG Backend
//!
//! Delegates the import to the `gpg` program, reading its machine-readable
//! status channel instead of scraping human-oriented output.
//!
//! ```text
//! gpg --homedir H --batch --no-tty --status-fd 1 --import   (key bytes on stdin)
//! ```
//!
//! The status lines are parsed by [`crate::status`]. `LC_ALL=C` keeps
//! GnuPG's stderr in English so failures can be classified.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use tracing::debug;

use crate::engine::{Context, Engine};
use crate::error::{KeyImportError, Result};
use crate::result::ImportResult;
use crate::status::parse_import_status;

pub struct GnupgEngine {
    program: PathBuf,
}

impl Default for GnupgEngine {
    fn default() -> Self {
        Self::new("gpg")
    }
}

impl GnupgEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Engine for GnupgEngine {
    fn name(&self) -> &'static str {
        "gnupg"
    }

    fn open(&self, homedir: &Path) -> Result<Box<dyn Context>> {
        let output = Command::new(&self.program)
            .env("LC_ALL", "C")
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                KeyImportError::Context(format!(
                    "cannot run {}: {e}",
                    self.program.display()
                ))
            })?;

        if !output.status.success() {
            return Err(KeyImportError::Context(format!(
                "{} --version exited with {}",
                self.program.display(),
                output.status
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout);
        debug!(
            version = version.lines().next().unwrap_or_default(),
            homedir = %homedir.display(),
            "opened GnuPG context"
        );

        Ok(Box::new(GnupgContext {
            program: self.program.clone(),
            homedir: homedir.to_path_buf(),
        }))
    }
}

pub struct GnupgContext {
    program: PathBuf,
    homedir: PathBuf,
}

impl Context for GnupgContext {
    fn import_keys(&mut self, data: &[u8]) -> Result<ImportResult> {
        let mut child = Command::new(&self.program)
            .env("LC_ALL", "C")
            .arg("--homedir")
            .arg(&self.homedir)
            .args(["--batch", "--no-tty", "--status-fd", "1", "--import"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| KeyImportError::Import("failed to open gpg stdin".into()))?;
        let input = data.to_vec();
        let writer = thread::spawn(move || stdin.write_all(&input));

        let output = child.wait_with_output()?;
        match writer.join() {
            Ok(Ok(())) => {}
            // gpg may stop reading early on garbage input; its status output decides.
            Ok(Err(e)) => debug!(error = %e, "gpg closed stdin before all data was written"),
            Err(_) => return Err(KeyImportError::Import("stdin writer thread panicked".into())),
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_import_status(&stdout)? {
            Some(result) => {
                if !output.status.success() {
                    debug!(status = %output.status, "gpg reported errors for some keys");
                }
                Ok(result)
            }
            None => Err(check_gpg_error(&self.homedir, output.status, &output.stderr)),
        }
    }
}

fn check_gpg_error(homedir: &Path, status: std::process::ExitStatus, stderr: &[u8]) -> KeyImportError {
    let msg = String::from_utf8_lossy(stderr);

    if msg.contains("Permission denied") || msg.contains("permission denied") {
        return KeyImportError::Import(format!(
            "permission denied while accessing {}",
            homedir.display()
        ));
    }

    let detail = msg.trim();
    if detail.is_empty() {
        KeyImportError::Import(format!("gpg exited with {status}"))
    } else {
        KeyImportError::Import(format!("gpg exited with {status}: {detail}"))
    }
}

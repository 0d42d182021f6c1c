//! # Settings
//!
//! Layered configuration, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config FILE`, else `<config dir>/pgp-import/config.toml`)
//! 3. `PGP_IMPORT_*` environment variables
//!
//! ```toml
//! backend = "native"
//! gpg_program = "/usr/bin/gpg2"
//! default_homedir = "/srv/keyring"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{KeyImportError, Result};
use crate::homedir;

const CONFIG_DIR: &str = "pgp-import";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "PGP_IMPORT";

/// Which backend performs the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Drive the `gpg` program.
    #[default]
    Gnupg,
    /// In-process rPGP certificate store.
    Native,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gnupg" | "gpg" => Ok(Self::Gnupg),
            "native" => Ok(Self::Native),
            other => Err(format!("unknown backend '{other}' (expected gnupg or native)")),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gnupg => f.write_str("gnupg"),
            Self::Native => f.write_str("native"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendKind,
    pub gpg_program: String,
    pub default_homedir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            gpg_program: "gpg".to_string(),
            default_homedir: None,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from the per-user config file when
    /// `path` is `None`. A missing per-user file is not an error; a missing
    /// explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Self::from_sources(None, false),
            },
        };

        Self::from_sources(Some(&file), required)
    }

    fn from_sources(file: Option<&Path>, required: bool) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(file) = file {
            let name = file.to_str().ok_or_else(|| {
                KeyImportError::Config(config::ConfigError::Message(format!(
                    "invalid config path: {}",
                    file.display()
                )))
            })?;
            builder = builder.add_source(File::new(name, FileFormat::Toml).required(required));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize::<Settings>()?;

        Ok(settings)
    }

    /// The directory a context is opened on when the user gives none.
    pub fn default_home(&self) -> PathBuf {
        self.default_homedir
            .clone()
            .unwrap_or_else(homedir::gnupg_default)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

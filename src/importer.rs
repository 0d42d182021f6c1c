//! # Key Import Workflow
//!
//! [`KeyImporter`] ties the pieces together:
//!
//! ```text
//! configuration dir → resolve (fallback to default) → Engine::open
//! key file          → read bytes                     → Context::import_keys
//! ```
//!
//! The context is opened before the file is read and dropped on every exit
//! path. Nothing is reported unless the import call succeeds.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::engine::Engine;
use crate::error::Result;
use crate::homedir::{self, HomeSource};
use crate::result::ImportResult;

pub struct KeyImporter<E> {
    engine: E,
    default_home: PathBuf,
}

impl<E: Engine> KeyImporter<E> {
    pub fn new(engine: E, default_home: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            default_home: default_home.into(),
        }
    }

    pub fn default_home(&self) -> &Path {
        &self.default_home
    }

    /// Imports every key in `key_file` into the keyring under `homedir`.
    ///
    /// `homedir` may be empty or point to a directory that does not exist;
    /// both select the default directory.
    pub fn import_file(&self, homedir: Option<&str>, key_file: &Path) -> Result<ImportResult> {
        let home = homedir::resolve(homedir, &self.default_home);
        if home.source == HomeSource::Default {
            debug!(homedir = %home.path.display(), "using default configuration directory");
        }

        let mut context = self.engine.open(&home.path)?;
        let data = read_key_file(key_file)?;

        let result = context.import_keys(&data)?;
        info!(
            backend = self.engine.name(),
            file = %key_file.display(),
            considered = result.considered,
            imported = result.imported,
            unchanged = result.unchanged,
            "import finished"
        );
        for problem in result.problems() {
            warn!(
                fingerprint = problem.fingerprint.as_deref().unwrap_or("[none]"),
                error = problem.error.as_deref().unwrap_or_default(),
                "key was not imported"
            );
        }

        Ok(result)
    }
}

fn read_key_file(path: &Path) -> Result<Vec<u8>> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        )
        .into());
    }

    Ok(fs::read(path)?)
}

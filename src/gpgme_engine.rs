//! # GnuPG Backend through GPGME
//!
//! Built with the `gpgme` feature. Imports go through the GPGME library
//! instead of driving `gpg` directly, so GPGME owns the status protocol and
//! this module only maps its result types:
//!
//! ```text
//! Context::from_protocol(OpenPgp) → set_engine_home_dir(H) → import(Data)
//! ```

use std::path::{Path, PathBuf};

use gpgme::{Data, Protocol};
use tracing::debug;

use crate::engine::{Context, Engine};
use crate::error::{KeyImportError, Result};
use crate::result::{ImportFlags, ImportResult, ImportStatus};

#[derive(Debug, Default)]
pub struct GpgmeEngine {
    program: Option<PathBuf>,
}

impl GpgmeEngine {
    /// Uses `program` as the gpg binary instead of the one GPGME was built with.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }
}

impl Engine for GpgmeEngine {
    fn name(&self) -> &'static str {
        "gpgme"
    }

    fn open(&self, homedir: &Path) -> Result<Box<dyn Context>> {
        let mut ctx = gpgme::Context::from_protocol(Protocol::OpenPgp).map_err(context_err)?;

        if let Some(program) = &self.program {
            let program = utf8_path(program)?;
            ctx.set_engine_path(program).map_err(context_err)?;
        }
        ctx.set_engine_home_dir(utf8_path(homedir)?)
            .map_err(context_err)?;

        debug!(homedir = %homedir.display(), "opened GPGME context");
        Ok(Box::new(GpgmeContext { ctx }))
    }
}

pub struct GpgmeContext {
    ctx: gpgme::Context,
}

impl Context for GpgmeContext {
    fn import_keys(&mut self, data: &[u8]) -> Result<ImportResult> {
        let mut input = Data::from_bytes(data).map_err(import_err)?;

        let imported = match self.ctx.import(&mut input) {
            Ok(result) => result,
            Err(e) if e.code() == gpgme::Error::NO_DATA.code() => {
                return Err(KeyImportError::NoData)
            }
            Err(e) => return Err(import_err(e)),
        };

        let result = convert(&imported);
        if result.considered == 0 {
            return Err(KeyImportError::NoData);
        }
        Ok(result)
    }
}

fn convert(result: &gpgme::ImportResult) -> ImportResult {
    let imports = result
        .imports()
        .map(|import| ImportStatus {
            fingerprint: import.fingerprint().ok().map(str::to_uppercase),
            flags: ImportFlags::from_bits_truncate(import.status().bits()),
            error: import.result().err().map(|e| e.to_string()),
        })
        .collect();

    ImportResult {
        considered: result.considered(),
        without_user_id: result.without_user_id(),
        imported: result.imported(),
        imported_rsa: result.imported_rsa(),
        unchanged: result.unchanged(),
        new_user_ids: result.new_user_ids(),
        new_subkeys: result.new_subkeys(),
        new_signatures: result.new_signatures(),
        new_revocations: result.new_revocations(),
        secret_considered: result.secret_considered(),
        secret_imported: result.secret_imported(),
        secret_unchanged: result.secret_unchanged(),
        skipped_new_keys: result.skipped_new_keys(),
        not_imported: result.not_imported(),
        skipped_v3_keys: result.skipped_v3_keys(),
        imports,
    }
}

fn utf8_path(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        KeyImportError::Context(format!("path is not valid UTF-8: {}", path.display()))
    })
}

fn context_err(e: gpgme::Error) -> KeyImportError {
    KeyImportError::Context(e.to_string())
}

fn import_err(e: gpgme::Error) -> KeyImportError {
    KeyImportError::Import(e.to_string())
}

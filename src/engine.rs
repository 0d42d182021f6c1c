//! The narrow interface the importer needs from a cryptographic backend.
//!
//! An [`Engine`] opens a [`Context`] scoped to one configuration directory; the
//! context imports key material. Whatever a context acquires (lock files,
//! child processes) is released when it is dropped, so an early return
//! through `?` never leaves a keyring locked.

use std::path::Path;

use crate::error::Result;
use crate::result::ImportResult;

pub trait Engine {
    /// Short backend name for log output.
    fn name(&self) -> &'static str;

    /// Opens a context on `homedir`.
    fn open(&self, homedir: &Path) -> Result<Box<dyn Context>>;
}

pub trait Context {
    /// Imports serialized key material into the keyring behind this context.
    fn import_keys(&mut self, data: &[u8]) -> Result<ImportResult>;
}

impl<E: Engine + ?Sized> Engine for &E {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn open(&self, homedir: &Path) -> Result<Box<dyn Context>> {
        (**self).open(homedir)
    }
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn open(&self, homedir: &Path) -> Result<Box<dyn Context>> {
        (**self).open(homedir)
    }
}

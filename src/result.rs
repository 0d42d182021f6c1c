//! # Import Results
//!
//! The structured outcome of a single import call. An [`ImportResult`] is
//! built once by a backend, handed to the caller, rendered, and dropped.
//!
//! The counters follow GnuPG's `IMPORT_RES` status line. The seven values the
//! report prints are `considered`, `imports.len()`, `skipped_v3_keys`,
//! `imported`, `unchanged`, `new_signatures` and `new_revocations`; the rest
//! are only shown in the detailed listing.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Per-key change flags, as reported in GnuPG's `IMPORT_OK` reason field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ImportFlags: u32 {
        /// The key was not in the keyring before.
        const NEW = 1;
        /// New user IDs were added.
        const UID = 2;
        /// New signatures were added.
        const SIG = 4;
        /// New subkeys were added.
        const SUBKEY = 8;
        /// The key carries secret material.
        const SECRET = 16;
    }
}

impl fmt::Display for ImportFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("unchanged");
        }

        let names: Vec<String> = self
            .iter_names()
            .map(|(name, _)| name.to_ascii_lowercase())
            .collect();
        f.write_str(&names.join(" "))
    }
}

/// Outcome for one key of the input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportStatus {
    /// Upper-case hex fingerprint, when the backend could determine it.
    pub fingerprint: Option<String>,
    pub flags: ImportFlags,
    /// Set when the backend rejected this key.
    pub error: Option<String>,
}

impl ImportStatus {
    pub fn ok(fingerprint: impl Into<String>, flags: ImportFlags) -> Self {
        Self {
            fingerprint: Some(fingerprint.into()),
            flags,
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Counters and per-key records produced by one import call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportResult {
    pub considered: u32,
    pub without_user_id: u32,
    pub imported: u32,
    pub imported_rsa: u32,
    pub unchanged: u32,
    pub new_user_ids: u32,
    pub new_subkeys: u32,
    pub new_signatures: u32,
    pub new_revocations: u32,
    pub secret_considered: u32,
    pub secret_imported: u32,
    pub secret_unchanged: u32,
    pub skipped_new_keys: u32,
    pub not_imported: u32,
    pub skipped_v3_keys: u32,
    pub imports: Vec<ImportStatus>,
}

impl ImportResult {
    /// Returns the records the backend flagged as failed.
    pub fn problems(&self) -> impl Iterator<Item = &ImportStatus> {
        self.imports.iter().filter(|status| !status.is_ok())
    }
}

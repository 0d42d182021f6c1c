//! # Native Certificate Store
//!
//! An in-process keyring built on rPGP. Each transferable public key lives in
//! its own binary file named after its fingerprint:
//!
//! ```text
//! <homedir>/pubring.d/
//! ├── .lock
//! ├── F000AEE155BBB649233C4DC0C9CD0FE78E08F8A8.pgp
//! └── 508C8F35193259EBDFF84CAF95FE06E39EFC015B.pgp
//! ```
//!
//! ## Import Semantics
//!
//! - The whole input is parsed, and every key is merged in memory, before
//!   anything is written. A parse failure or an unreadable stored entry
//!   leaves the store untouched. Only an I/O error during the final writes
//!   can leave part of an input applied.
//! - v2/v3 keys are counted in `skipped_v3_keys` and never stored.
//! - A key with an unknown fingerprint is stored as-is (`NEW`).
//! - A known key is merged: new user IDs, certifications, revocations and
//!   subkeys are appended. If anything was added the file is rewritten
//!   through a temporary file and a rename.
//!
//! Every considered key ends up in exactly one of `imported`, `unchanged` or
//! `skipped_v3_keys`.
//!
//! ## Locking
//!
//! A context holds an exclusive advisory lock on `pubring.d/.lock` for its
//! whole lifetime. The lock belongs to the open file handle, so it goes away
//! when the context is dropped or the process dies; the file itself stays.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use pgp::composed::{Deserializable, SignedPublicKey};
use pgp::errors::Error as PgpError;
use pgp::ser::Serialize;
use pgp::types::{KeyDetails, KeyVersion};
use tracing::{debug, warn};

use crate::engine::{Context, Engine};
use crate::error::{KeyImportError, Result};
use crate::result::{ImportFlags, ImportResult, ImportStatus};

const STORE_DIR: &str = "pubring.d";
const LOCK_FILE: &str = ".lock";
const CERT_EXTENSION: &str = "pgp";

#[derive(Debug, Default, Clone, Copy)]
pub struct KeyStoreEngine;

impl Engine for KeyStoreEngine {
    fn name(&self) -> &'static str {
        "native"
    }

    fn open(&self, homedir: &Path) -> Result<Box<dyn Context>> {
        Ok(Box::new(KeyStore::open(homedir)?))
    }
}

/// An open, locked certificate store.
pub struct KeyStore {
    dir: PathBuf,
    lock: File,
}

/// Keys merged during one import call, waiting to be written.
type Pending = Vec<(String, SignedPublicKey)>;

impl KeyStore {
    /// Opens the store under `homedir`, creating it when missing.
    pub fn open(homedir: impl AsRef<Path>) -> Result<Self> {
        let dir = homedir.as_ref().join(STORE_DIR);
        fs::create_dir_all(&dir).map_err(|e| {
            KeyImportError::Context(format!("cannot create {}: {e}", dir.display()))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&dir)?.permissions();
            perms.set_mode(0o700);
            fs::set_permissions(&dir, perms)?;
        }

        let lock_path = dir.join(LOCK_FILE);
        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        if let Err(e) = FileExt::try_lock_exclusive(&lock) {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                return Err(KeyImportError::Locked(lock_path));
            }
            return Err(e.into());
        }

        debug!(store = %dir.display(), "opened native keystore");
        Ok(Self { dir, lock })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fingerprints of all stored keys, sorted.
    pub fn fingerprints(&self) -> Result<Vec<String>> {
        let mut fingerprints = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CERT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                fingerprints.push(stem.to_string());
            }
        }
        fingerprints.sort();
        Ok(fingerprints)
    }

    /// Loads the stored key with the given fingerprint.
    pub fn get(&self, fingerprint: &str) -> Result<Option<SignedPublicKey>> {
        let path = self.cert_path(fingerprint);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let key = SignedPublicKey::from_bytes(&bytes[..]).map_err(|e| {
            KeyImportError::Import(format!("corrupt keystore entry {}: {e}", path.display()))
        })?;
        Ok(Some(key))
    }

    fn cert_path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{fingerprint}.{CERT_EXTENSION}"))
    }

    /// Serializes every pending key, then writes them one by one.
    fn commit(&self, pending: Pending) -> Result<()> {
        let encoded = pending
            .into_iter()
            .map(|(fingerprint, key)| -> Result<(String, Vec<u8>)> {
                Ok((fingerprint, key.to_bytes().map_err(map_pgp_err)?))
            })
            .collect::<Result<Vec<_>>>()?;

        for (fingerprint, bytes) in encoded {
            let path = self.cert_path(&fingerprint);
            let tmp = path.with_extension("tmp");

            fs::write(&tmp, bytes)?;
            fs::rename(&tmp, &path)?;
        }
        Ok(())
    }

    /// Merges one parsed key into `pending` and records the outcome.
    fn stage(
        &self,
        key: SignedPublicKey,
        pending: &mut Pending,
        result: &mut ImportResult,
    ) -> Result<()> {
        result.considered += 1;
        let fingerprint = hex::encode_upper(key.primary_key.fingerprint().as_bytes());

        if matches!(key.primary_key.version(), KeyVersion::V2 | KeyVersion::V3) {
            debug!(%fingerprint, "skipping legacy v3 key");
            result.skipped_v3_keys += 1;
            result.imports.push(ImportStatus {
                fingerprint: Some(fingerprint),
                flags: ImportFlags::empty(),
                error: Some("legacy v3 key".into()),
            });
            return Ok(());
        }

        if key.details.users.is_empty() {
            result.without_user_id += 1;
        }

        let staged = pending.iter().position(|(fpr, _)| *fpr == fingerprint);
        let existing = match staged {
            Some(index) => Some(pending.swap_remove(index).1),
            None => self.get(&fingerprint)?,
        };

        let flags = match existing {
            None => {
                pending.push((fingerprint.clone(), key));
                result.imported += 1;
                ImportFlags::NEW
            }
            Some(mut existing) => {
                let stats = merge(&mut existing, key);
                if stats.is_empty() {
                    result.unchanged += 1;
                } else {
                    result.imported += 1;
                    result.new_user_ids += stats.user_ids;
                    result.new_subkeys += stats.subkeys;
                    result.new_signatures += stats.signatures;
                    result.new_revocations += stats.revocations;
                }
                if staged.is_some() || !stats.is_empty() {
                    pending.push((fingerprint.clone(), existing));
                }
                stats.flags()
            }
        };

        debug!(%fingerprint, %flags, "merged key");
        result.imports.push(ImportStatus::ok(fingerprint, flags));
        Ok(())
    }
}

impl Context for KeyStore {
    fn import_keys(&mut self, data: &[u8]) -> Result<ImportResult> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(KeyImportError::NoData);
        }

        let keys = parse_keys(data)?;
        if keys.is_empty() {
            return Err(KeyImportError::NoData);
        }

        let mut result = ImportResult::default();
        let mut pending = Pending::new();
        for key in keys {
            self.stage(key, &mut pending, &mut result)?;
        }

        self.commit(pending)?;
        Ok(result)
    }
}

impl Drop for KeyStore {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.lock) {
            warn!(store = %self.dir.display(), error = %e, "failed to release keystore lock");
        }
    }
}

fn parse_keys(data: &[u8]) -> Result<Vec<SignedPublicKey>> {
    let (keys, _headers) = SignedPublicKey::from_reader_many(data).map_err(map_pgp_err)?;
    keys.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(map_pgp_err)
}

/// What a merge added to an existing key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct MergeStats {
    user_ids: u32,
    subkeys: u32,
    signatures: u32,
    revocations: u32,
}

impl MergeStats {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn flags(&self) -> ImportFlags {
        let mut flags = ImportFlags::empty();
        if self.user_ids > 0 {
            flags.insert(ImportFlags::UID);
        }
        if self.signatures > 0 || self.revocations > 0 {
            flags.insert(ImportFlags::SIG);
        }
        if self.subkeys > 0 {
            flags.insert(ImportFlags::SUBKEY);
        }
        flags
    }
}

/// Appends the parts of `incoming` that `existing` lacks.
fn merge(existing: &mut SignedPublicKey, incoming: SignedPublicKey) -> MergeStats {
    let mut stats = MergeStats::default();
    let details = &mut existing.details;

    stats.revocations += append_missing(
        &mut details.revocation_signatures,
        incoming.details.revocation_signatures,
    );
    stats.signatures += append_missing(
        &mut details.direct_signatures,
        incoming.details.direct_signatures,
    );

    for user in incoming.details.users {
        match details.users.iter_mut().find(|known| known.id == user.id) {
            Some(known) => {
                stats.signatures += append_missing(&mut known.signatures, user.signatures);
            }
            None => {
                details.users.push(user);
                stats.user_ids += 1;
            }
        }
    }

    for attr in incoming.details.user_attributes {
        match details
            .user_attributes
            .iter_mut()
            .find(|known| known.attr == attr.attr)
        {
            Some(known) => {
                stats.signatures += append_missing(&mut known.signatures, attr.signatures);
            }
            None => {
                details.user_attributes.push(attr);
                stats.user_ids += 1;
            }
        }
    }

    for subkey in incoming.public_subkeys {
        match existing
            .public_subkeys
            .iter_mut()
            .find(|known| known.key == subkey.key)
        {
            Some(known) => {
                stats.signatures += append_missing(&mut known.signatures, subkey.signatures);
            }
            None => {
                existing.public_subkeys.push(subkey);
                stats.subkeys += 1;
            }
        }
    }

    stats
}

fn append_missing<T: PartialEq>(known: &mut Vec<T>, incoming: Vec<T>) -> u32 {
    let mut added = 0;
    for item in incoming {
        if !known.contains(&item) {
            known.push(item);
            added += 1;
        }
    }
    added
}

fn map_pgp_err(err: PgpError) -> KeyImportError {
    KeyImportError::Import(err.to_string())
}

//! # pgp-import
//!
//! Import OpenPGP keys from a file into a keyring and print a summary of what
//! changed.
//!
//! ## Quick Start
//!
//! ```bash
//! # Interactive: asks for the configuration directory and the key file
//! pgp-import
//!
//! # Non-interactive
//! pgp-import --homedir ~/.gnupg team-keys.asc
//!
//! # Import into the native rPGP store instead of GnuPG
//! pgp-import --backend native --homedir /srv/keyring team-keys.asc
//! ```
//!
//! Example output:
//!
//! ```text
//! Total number of keys:   2
//! Total number imported:  2
//! Number of version 3 keys ignored:  0
//!
//! Number of imported key objects or updates:  1
//! Number of unchanged keys:  1
//! Number of new signatures:  0
//! Number of revoked keys:    0
//! ```
//!
//! ## How It Works
//!
//! ```text
//! homedir answer → homedir::resolve → Engine::open → Context
//! key file       → fs::read         → Context::import_keys → ImportResult → report
//! ```
//!
//! A configuration directory that does not exist is silently replaced by the
//! default one (`default_homedir` setting, `$GNUPGHOME`, or `~/.gnupg`).
//! No report is printed unless the import succeeded.
//!
//! ## Backends
//!
//! - **gnupg** (default): runs `gpg --import` with a status channel and reads
//!   the counters GnuPG reports. With the `gpgme` feature the same backend
//!   goes through the GPGME library instead.
//! - **native** (feature `native`, enabled by default): parses and merges
//!   keys in-process with rPGP into `<homedir>/pubring.d/`.
//!
//! ## Module Overview
//!
//! - [`importer`] - The import workflow
//! - [`engine`] - Backend traits
//! - [`gnupg`] / [`status`] - GnuPG backend and its status-line parser
//! - `gpgme_engine` - GnuPG backend on GPGME (feature `gpgme`)
//! - [`keystore`] - Native rPGP certificate store
//! - [`result`] / [`report`] - Import results and their rendering
//! - [`homedir`] / [`settings`] - Directory resolution and configuration
//! - [`error`] - Error types
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib                    # unit tests
//! cargo test --test cli_test          # binary, prompts and exit codes
//! cargo test --test gnupg_test        # real gpg (skipped when gpg is missing)
//! cargo test --test native_test       # native store end-to-end
//! ```

pub mod engine;
pub mod error;
pub mod gnupg;
#[cfg(feature = "gpgme")]
pub mod gpgme_engine;
pub mod homedir;
pub mod importer;
#[cfg(feature = "native")]
pub mod keystore;
pub mod report;
pub mod result;
pub mod settings;
pub mod status;

pub use engine::{Context, Engine};
pub use error::{KeyImportError, Result};
pub use gnupg::GnupgEngine;
#[cfg(feature = "gpgme")]
pub use gpgme_engine::GpgmeEngine;
pub use importer::KeyImporter;
#[cfg(feature = "native")]
pub use keystore::{KeyStore, KeyStoreEngine};
pub use result::{ImportFlags, ImportResult, ImportStatus};
pub use settings::{BackendKind, Settings};

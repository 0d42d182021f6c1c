//! # Configuration Directory Resolution
//!
//! Turns the user's answer to the "configuration directory" prompt into the
//! directory a backend context is opened on.
//!
//! - An empty answer selects the default directory.
//! - A leading `~` is expanded to the caller's home directory.
//! - A directory that does not exist is ignored and the default is used
//!   instead. This fallback is silent; it only shows up in the logs.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Where the resolved directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeSource {
    Requested,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHome {
    pub path: PathBuf,
    pub source: HomeSource,
}

/// Expands a leading `~` or `~/` to `home`. Other inputs are returned as-is.
pub fn expand_tilde(input: &str, home: Option<&Path>) -> PathBuf {
    match (input.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home.to_path_buf(),
        (Some(rest), Some(home)) if rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(input),
    }
}

/// Resolves the requested directory against `default`.
pub fn resolve(requested: Option<&str>, default: &Path) -> ResolvedHome {
    resolve_with_home(requested, default, dirs::home_dir().as_deref())
}

pub(crate) fn resolve_with_home(
    requested: Option<&str>,
    default: &Path,
    home: Option<&Path>,
) -> ResolvedHome {
    let fallback = || ResolvedHome {
        path: default.to_path_buf(),
        source: HomeSource::Default,
    };

    let Some(requested) = requested.filter(|s| !s.is_empty()) else {
        return fallback();
    };

    let path = expand_tilde(requested, home);
    if path.exists() {
        ResolvedHome {
            path,
            source: HomeSource::Requested,
        }
    } else {
        debug!(
            requested = %path.display(),
            default = %default.display(),
            "configuration directory does not exist, using default"
        );
        fallback()
    }
}

/// The directory GnuPG uses when no `--homedir` is given.
pub fn gnupg_default() -> PathBuf {
    if let Some(dir) = std::env::var_os("GNUPGHOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }

    dirs::home_dir()
        .map(|home| home.join(".gnupg"))
        .unwrap_or_else(|| PathBuf::from(".gnupg"))
}

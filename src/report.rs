//! Text rendering of an [`ImportResult`].
//!
//! The summary layout is stable: seven labelled counts, always in the same
//! order, framed by blank lines.

use std::fmt;

use crate::result::ImportResult;

/// Renders the seven-field import summary.
pub fn render(result: &ImportResult) -> String {
    format!(
        "
Total number of keys:   {}
Total number imported:  {}
Number of version 3 keys ignored:  {}

Number of imported key objects or updates:  {}
Number of unchanged keys:  {}
Number of new signatures:  {}
Number of revoked keys:    {}
",
        result.considered,
        result.imports.len(),
        result.skipped_v3_keys,
        result.imported,
        result.unchanged,
        result.new_signatures,
        result.new_revocations,
    )
}

/// Renders one line per import record followed by the remaining counters.
pub fn render_details(result: &ImportResult) -> String {
    Details(result).to_string()
}

/// The detailed listing of an [`ImportResult`].
pub struct Details<'a>(pub &'a ImportResult);

impl fmt::Display for Details<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;

        for status in &result.imports {
            write!(
                f,
                "  fpr: {} status: {}",
                status.fingerprint.as_deref().unwrap_or("[none]"),
                status.flags
            )?;
            if let Some(error) = &status.error {
                write!(f, " error: {error}")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "        no user id: {}", result.without_user_id)?;
        writeln!(f, "      imported rsa: {}", result.imported_rsa)?;
        writeln!(f, "      new user ids: {}", result.new_user_ids)?;
        writeln!(f, "       new subkeys: {}", result.new_subkeys)?;
        writeln!(f, "       secret read: {}", result.secret_considered)?;
        writeln!(f, "   secret imported: {}", result.secret_imported)?;
        writeln!(f, "  secret unchanged: {}", result.secret_unchanged)?;
        writeln!(f, "  skipped new keys: {}", result.skipped_new_keys)?;
        writeln!(f, "      not imported: {}", result.not_imported)
    }
}

use tracing::debug;

use crate::error::{KeyImportError, Result};
use crate::result::{ImportFlags, ImportResult, ImportStatus};

const STATUS_PREFIX: &str = "[GNUPG:] ";

/// Parses the `--status-fd` output of `gpg --import`.
///
/// Returns `Ok(None)` when GnuPG never printed `IMPORT_RES`, which means the
/// import did not run to completion.
pub fn parse_import_status(output: &str) -> Result<Option<ImportResult>> {
    let mut imports = Vec::new();
    let mut counters: Option<ImportResult> = None;
    let mut no_data = false;

    for line in output.lines() {
        let Some(rest) = line.strip_prefix(STATUS_PREFIX) else {
            continue;
        };
        let mut fields = rest.split_whitespace();
        let Some(keyword) = fields.next() else {
            continue;
        };
        let args: Vec<&str> = fields.collect();

        match keyword {
            "IMPORT_OK" => imports.push(parse_import_ok(&args)),
            "IMPORT_PROBLEM" => imports.push(parse_import_problem(&args)),
            "IMPORT_RES" => counters = Some(parse_import_res(&args)),
            "NODATA" => no_data = true,
            _ => {
                debug!(keyword, "skipping unhandled GnuPG status line");
            }
        }
    }

    let Some(mut result) = counters else {
        return Ok(None);
    };

    if no_data && result.considered == 0 {
        return Err(KeyImportError::NoData);
    }

    result.imports = imports;
    Ok(Some(result))
}

fn parse_import_ok(args: &[&str]) -> ImportStatus {
    let reason = args.first().and_then(|s| s.parse().ok()).unwrap_or(0);
    ImportStatus {
        fingerprint: args.get(1).map(|s| s.to_uppercase()),
        flags: ImportFlags::from_bits_truncate(reason),
        error: None,
    }
}

fn parse_import_problem(args: &[&str]) -> ImportStatus {
    let reason = args.first().and_then(|s| s.parse().ok()).unwrap_or(0);
    ImportStatus {
        fingerprint: args.get(1).map(|s| s.to_uppercase()),
        flags: ImportFlags::empty(),
        error: Some(problem_reason(reason).to_string()),
    }
}

fn problem_reason(code: u32) -> &'static str {
    match code {
        1 => "invalid certificate",
        2 => "issuer certificate missing",
        3 => "certificate chain too long",
        4 => "error storing certificate",
        _ => "no specific reason given",
    }
}

fn parse_import_res(args: &[&str]) -> ImportResult {
    let field = |i: usize| -> u32 { args.get(i).and_then(|s| s.parse().ok()).unwrap_or(0) };

    ImportResult {
        considered: field(0),
        without_user_id: field(1),
        imported: field(2),
        imported_rsa: field(3),
        unchanged: field(4),
        new_user_ids: field(5),
        new_subkeys: field(6),
        new_signatures: field(7),
        new_revocations: field(8),
        secret_considered: field(9),
        secret_imported: field(10),
        secret_unchanged: field(11),
        skipped_new_keys: field(12),
        not_imported: field(13),
        skipped_v3_keys: field(14),
        imports: Vec::new(),
    }
}

use std::io::{BufRead, Write};

use pgp_import::Result;

pub const HOMEDIR_PROMPT: &str = "Enter the GPG configuration directory path (optional): ";
pub const KEY_FILE_PROMPT: &str = "Enter the path and filename to the file of key(s): ";

/// Writes `message` and reads one line of input, without its line ending.
/// End of input yields an empty answer.
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> Result<String> {
    write!(output, "{message}")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

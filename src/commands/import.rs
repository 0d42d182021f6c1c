use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[cfg(not(feature = "gpgme"))]
use pgp_import::GnupgEngine;
use pgp_import::{report, BackendKind, Engine, KeyImporter, Result, Settings};

use super::prompt::{ask, HOMEDIR_PROMPT, KEY_FILE_PROMPT};

pub struct ImportOptions {
    pub homedir: Option<String>,
    pub key_file: Option<PathBuf>,
    pub details: bool,
}

/// Import the keys of one file and print the summary
pub fn import(settings: &Settings, options: ImportOptions) -> Result<()> {
    let (homedir, key_file) = match options.key_file {
        Some(path) => (options.homedir, path),
        None => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            gather_answers(&mut stdin.lock(), &mut stdout.lock(), options.homedir)?
        }
    };

    let importer = KeyImporter::new(engine_for(settings)?, settings.default_home());
    let result = importer.import_file(homedir.as_deref(), &key_file)?;

    println!("{}", report::render(&result));
    if options.details {
        print!("{}", report::render_details(&result));
    }

    Ok(())
}

/// Asks for whatever the command line did not provide.
fn gather_answers<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    homedir: Option<String>,
) -> Result<(Option<String>, PathBuf)> {
    let homedir = match homedir {
        Some(dir) => dir,
        None => ask(input, output, HOMEDIR_PROMPT)?,
    };

    let key_file = ask(input, output, KEY_FILE_PROMPT)?;
    if key_file.trim().is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "no key file given").into());
    }

    Ok((Some(homedir), PathBuf::from(key_file)))
}

fn engine_for(settings: &Settings) -> Result<Box<dyn Engine>> {
    match settings.backend {
        #[cfg(not(feature = "gpgme"))]
        BackendKind::Gnupg => Ok(Box::new(GnupgEngine::new(&settings.gpg_program))),
        #[cfg(feature = "gpgme")]
        BackendKind::Gnupg => Ok(Box::new(pgp_import::GpgmeEngine::new(&settings.gpg_program))),
        #[cfg(feature = "native")]
        BackendKind::Native => Ok(Box::new(pgp_import::KeyStoreEngine)),
        #[cfg(not(feature = "native"))]
        BackendKind::Native => Err(pgp_import::KeyImportError::Unsupported(
            "Native keyring support not enabled. Rebuild with --features native".into(),
        )),
    }
}

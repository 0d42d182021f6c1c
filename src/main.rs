mod commands;

use clap::{ArgAction, Parser};
use pgp_import::{BackendKind, Result, Settings};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "pgp-import")]
#[command(version)]
#[command(about = "Import OpenPGP keys from a file into a keyring", long_about = None)]
struct Cli {
    /// Path to the file of key(s); prompted for when omitted
    key_file: Option<PathBuf>,

    /// GPG configuration directory (the default is used if it does not exist)
    #[arg(long)]
    homedir: Option<String>,

    /// Backend performing the import: gnupg or native
    #[arg(short, long)]
    backend: Option<BackendKind>,

    /// Settings file (defaults to the per-user config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// List every key after the summary
    #[arg(long)]
    details: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        settings.backend = backend;
    }

    commands::import(
        &settings,
        commands::ImportOptions {
            homedir: cli.homedir,
            key_file: cli.key_file,
            details: cli.details,
        },
    )
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

//! hbnb interactive console
//!
//! Opens the JSON object store, reloads it, and runs the line interpreter
//! on stdin until `quit` or end of input.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use hbnb::storage::DEFAULT_FILE_PATH;
use hbnb::{Console, FileStorage, StorageConfig, TypeRegistry};

#[derive(Parser)]
#[command(
    name = "hbnb-console",
    about = "Interactive console for the hbnb JSON object store",
    version
)]
struct Cli {
    /// Backing JSON file
    #[arg(short, long, default_value = DEFAULT_FILE_PATH)]
    file: PathBuf,

    /// Log level (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Skip fsync when saving
    #[arg(long)]
    no_sync: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    hbnb::logging::init_logging(cli.log_level.as_deref()).map_err(anyhow::Error::msg)?;

    let config = StorageConfig {
        file_path: cli.file,
        sync_on_write: !cli.no_sync,
    };
    let mut storage = FileStorage::open(config, TypeRegistry::builtin())
        .context("failed to open object store")?;

    // A broken file must not prevent startup; the store stays empty.
    match storage.reload() {
        Ok(report) => info!(
            "loaded {} objects from {} ({} skipped)",
            report.loaded,
            storage.file_path().display(),
            report.skipped
        ),
        Err(e) => {
            error!("reload failed: {e}");
            eprintln!("error decoding {}: {e}", storage.file_path().display());
        }
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut console = Console::new(storage, io::stdout().lock());
    console
        .run(stdin.lock(), interactive)
        .context("console I/O failed")?;
    Ok(())
}

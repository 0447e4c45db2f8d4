//! Command-line entry point.

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tapboard_app::{ReplayError, Script, load_config, replay, snapshot_json};
use tapboard_core::{Board, BoardConfig};

/// Replay a touch script and print the resulting board snapshot.
#[derive(Debug, Parser)]
#[command(name = "tapboard", version)]
struct Cli {
    /// JSON array of touch, tick and intent steps.
    script: PathBuf,

    /// Board configuration JSON. Missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a snapshot after every step.
    #[arg(long)]
    trace: bool,
}

fn main() {
    env_logger::init();
    if let Err(error) = run(Cli::parse()) {
        eprintln!("{error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ReplayError> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BoardConfig::default(),
    };
    let script = Script::load(&cli.script)?;
    log::info!("Replaying {} steps from {}", script.len(), cli.script.display());

    let mut board = Board::new(config);
    let mut out = std::io::stdout().lock();
    replay(&mut board, &script, |index, board| {
        if cli.trace {
            writeln!(out, "// step {index}")?;
            writeln!(out, "{}", snapshot_json(board)?)?;
        }
        Ok(())
    })?;
    if !cli.trace {
        writeln!(out, "{}", snapshot_json(&board)?)?;
    }
    Ok(())
}

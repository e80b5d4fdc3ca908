#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that lets a player walk the Geocoin world.

mod input;
mod logging;
mod session;
mod settings;
mod store;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    session::{Reply, Session},
    settings::Settings,
    store::FileStore,
};

/// Collect and deposit coins in caches scattered over a global grid.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file overriding world and spawning settings.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// File holding the saved game.
    #[arg(short, long, default_value = "geocoin-save.json")]
    save: PathBuf,
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Geocoin command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let settings = Settings::load(args.config.as_deref())?;
    let mut session = Session::resume(settings, FileStore::open(&args.save))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_lines(&mut out, &session.open())?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read input")?;
        let action = match input::parse(&line) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(error) => {
                writeln!(out, "{error:#}")?;
                continue;
            }
        };

        match session.perform(action) {
            Reply::Show(lines) => print_lines(&mut out, &lines)?,
            Reply::Quit => break,
        }
    }

    Ok(())
}

fn print_lines(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

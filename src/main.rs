//! klrev - Reversed keyboard-layout generator
//!
//! Parses one or more layout XML files, reverses their scancode tables
//! into character-first lookup structures and prints the result as a
//! JavaScript module on stdout. Validation diagnostics are reported on
//! stderr after output generation and drive the exit code.

use anyhow::Result;
use clap::Parser;
use klrev::emit::JsEmitter;
use klrev::parser::parse_layout_file;
use klrev::reverse::{reverse_layout, ValidationReport};
use log::debug;
use std::path::PathBuf;

/// Reversed keyboard-layout generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Layout XML files to reverse
    #[arg(value_name = "FILE", required = true)]
    layouts: Vec<PathBuf>,

    /// Log raw attribute traversal and parsed layout dumps
    #[arg(short, long)]
    verbose: bool,

    /// Output validation diagnostics as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    let mut report = ValidationReport::new();
    let mut emitter = JsEmitter::new();

    for path in &cli.layouts {
        let layout = parse_layout_file(path)?;
        debug!("{}", layout.dump());
        let reversed = reverse_layout(&layout, &mut report)?;
        emitter.push_layout(&layout, &reversed);
    }

    print!("{}", emitter.finish());

    if !report.is_valid() {
        if cli.json {
            eprintln!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            eprint!("{}", report.format_message());
        }
        std::process::exit(1);
    }

    Ok(())
}

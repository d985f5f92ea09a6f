use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use log::info;

/// Parser for the Lyre programming language
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Options {
    /// Source file to parse
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let options = Options::parse();

    let path = options.file.display().to_string();
    let source = fs::read_to_string(&options.file)
        .with_context(|| format!("failed to read {path}"))?;

    match lyre::parse(&source) {
        Ok(file) => {
            info!(
                "{path}: module {} with {} imports and {} declarations",
                file.module,
                file.imports.len(),
                file.declarations.len()
            );
            println!("{path}: ok");
        }
        Err(error) => {
            eprintln!(
                "{path}:{}:{} {}",
                error.range.start.line, error.range.start.column, error.message
            );
            process::exit(1);
        }
    }

    Ok(())
}

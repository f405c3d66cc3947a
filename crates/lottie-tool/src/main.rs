//! # Lottie Tool
//!
//! Command-line front end for `lottie-model`.
//!
//! ## Commands
//! - `check`: Decode files and print a one-line summary of each
//! - `roundtrip`: Decode one file and write it back out
//! - `verify`: Check that every file survives decode/encode unchanged

mod summary;
mod verify;


use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lottie_model::{DecodeOptions, Document};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::summary::Summary;

#[derive(Parser)]
#[command(name = "lottie-tool")]
#[command(about = "Check, round-trip and verify Lottie animation documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode files and print a summary of each
    Check {
        /// Lottie JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Reject shapes and layers with unrecognized type tags
        #[arg(long)]
        strict: bool,
    },

    /// Decode a file and encode it again
    Roundtrip {
        /// Lottie JSON file
        input: PathBuf,

        /// Output path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Indent the output
        #[arg(long)]
        pretty: bool,

        /// Reject shapes and layers with unrecognized type tags
        #[arg(long)]
        strict: bool,
    },

    /// Check the round-trip and idempotence properties for each file
    Verify {
        /// Lottie JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lottie_tool=info,lottie_model=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { files, strict } => cmd_check(&files, strict),
        Commands::Roundtrip {
            input,
            output,
            pretty,
            strict,
        } => cmd_roundtrip(&input, output.as_deref(), pretty, strict),
        Commands::Verify { files } => cmd_verify(&files),
    }
}

fn decode_options(strict: bool) -> DecodeOptions {
    if strict {
        DecodeOptions::strict()
    } else {
        DecodeOptions::default()
    }
}

/// Read and decode one document.
fn load(path: &Path, options: &DecodeOptions) -> Result<Document> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    lottie_model::decode_with(&raw, options)
        .with_context(|| format!("Failed to decode {}", path.display()))
}

/// Decode every file in parallel and print a summary line per file.
fn cmd_check(files: &[PathBuf], strict: bool) -> Result<()> {
    let options = decode_options(strict);
    let results: Vec<Result<Summary>> = files
        .par_iter()
        .map(|path| load(path, &options).map(|doc| Summary::of(&doc)))
        .collect();

    let mut failures = 0;
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(summary) => println!("{}: {}", path.display(), summary),
            Err(e) => {
                failures += 1;
                tracing::error!("{:#}", e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files failed to decode", failures, files.len());
    }
    Ok(())
}

fn cmd_roundtrip(input: &Path, output: Option<&Path>, pretty: bool, strict: bool) -> Result<()> {
    let doc = load(input, &decode_options(strict))?;
    let encoded = if pretty {
        lottie_model::encode_pretty(&doc)?
    } else {
        lottie_model::encode(&doc)?
    };

    match output {
        Some(path) => {
            fs::write(path, &encoded)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {} ({} bytes)", path.display(), encoded.len());
        }
        None => println!("{}", encoded),
    }
    Ok(())
}

fn cmd_verify(files: &[PathBuf]) -> Result<()> {
    let results: Vec<Result<()>> = files.par_iter().map(|path| verify::verify_file(path)).collect();

    let mut failures = 0;
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(()) => println!("  ✅ {}", path.display()),
            Err(e) => {
                failures += 1;
                println!("  ❌ {}: {:#}", path.display(), e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files failed verification", failures, files.len());
    }
    tracing::info!("Verified {} files", files.len());
    Ok(())
}

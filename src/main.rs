//! flbtool - extract and rebuild Intel FLB3 NIC firmware containers.
//!
//! This is the command-line entry point. All actual parsing and assembly
//! lives in the library crates; this binary only wires files and
//! directories to the codec and reports what happened.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use flbtool::prelude::*;

/// Interact with Intel FLB3 firmware containers
#[derive(Parser)]
#[command(name = "flbtool")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output debugging information
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract all the components of an FLB3 file
    ExtractFirmware {
        /// FLB3 file to extract
        #[arg(long)]
        input: PathBuf,

        /// Directory where firmware components will be written
        #[arg(long)]
        output_directory: PathBuf,
    },

    /// Merge the contents of a directory into a single FLB3 file
    WriteFirmware {
        /// Directory to read firmware components out of
        #[arg(long)]
        input_directory: PathBuf,

        /// File to write the assembled container to
        #[arg(long)]
        output: PathBuf,
    },

    /// Check that a container survives a parse/reassemble cycle unchanged
    Verify {
        /// FLB3 file to check
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Commands::ExtractFirmware { input, output_directory } => {
            cmd_extract(&input, &output_directory)
        }
        Commands::WriteFirmware { input_directory, output } => {
            cmd_write(&input_directory, &output)
        }
        Commands::Verify { input } => cmd_verify(&input),
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn cmd_extract(input: &PathBuf, output_directory: &PathBuf) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    println!("Read {} bytes from {}", data.len(), input.display());

    let parsed = ChunkDirectory::parse(&data).context("failed to parse FLB3 container")?;
    for diagnostic in &parsed.diagnostics {
        warn!("{diagnostic}");
    }

    let stats = extract_to_dir(&parsed.directory, output_directory).context("extraction failed")?;
    println!(
        "Extracted {} chunks ({} payload bytes) to {}",
        stats.chunks,
        stats.payload_bytes,
        output_directory.display()
    );

    if !parsed.is_clean() {
        println!(
            "Container had {} problem(s); extracted data may be incomplete",
            parsed.diagnostics.len()
        );
    }

    Ok(())
}

fn cmd_write(input_directory: &PathBuf, output: &PathBuf) -> Result<()> {
    let directory =
        rebuild_from_dir(input_directory).context("failed to load extracted directory")?;
    println!(
        "Loaded {} chunks from {}",
        directory.len(),
        input_directory.display()
    );

    let bytes = directory.to_bytes().context("container assembly failed")?;
    fs::write(output, &bytes).with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote {} bytes to {}", bytes.len(), output.display());

    Ok(())
}

fn cmd_verify(input: &PathBuf) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;

    let report = verify_roundtrip(&data).context("round-trip check failed")?;
    for diagnostic in &report.diagnostics {
        warn!("{diagnostic}");
    }

    if report.is_lossless() {
        println!("OK: {} bytes round-trip losslessly", report.original_len);
        Ok(())
    } else {
        match report.first_mismatch {
            Some(offset) => anyhow::bail!(
                "round-trip mismatch at byte {:#x} (original {} bytes, rebuilt {})",
                offset,
                report.original_len,
                report.rebuilt_len
            ),
            None => anyhow::bail!(
                "round-trip length mismatch (original {} bytes, rebuilt {})",
                report.original_len,
                report.rebuilt_len
            ),
        }
    }
}

//! Print the mean frame time and FPS of a CSV performance log

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use vox_tools::{frametime, logging, ToolConfig};

#[derive(Debug, Parser)]
#[command(name = "frametime")]
#[command(version)]
#[command(about = "Summarize per-frame render times from a CSV file.", long_about = None)]
struct Args {
    /// CSV file with a header row
    csv_path: PathBuf,
    /// Column holding frame times in milliseconds
    #[arg(long)]
    column: Option<String>,
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init_logging();
    let args = Args::parse();

    let config = ToolConfig::load(args.config.as_deref())?;
    let column = args.column.unwrap_or(config.frametime.column);

    let summary = frametime::summarize_file(&args.csv_path, &column)
        .with_context(|| format!("Failed to summarize {}", args.csv_path.display()))?;
    log::info!("[frametime] {} samples", summary.sample_count);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    summary.write_report(&mut out)?;
    out.flush()?;
    Ok(())
}

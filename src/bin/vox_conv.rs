//! Convert every model of a MagicaVoxel `.vox` file to a dense `.npy` array

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use vox_tools::{convert_scene, logging, ConvertOptions, ConvertOutcome, ToolConfig};

#[derive(Debug, Parser)]
#[command(name = "vox-conv")]
#[command(version)]
#[command(about = "Convert .vox models to .npy arrays.", long_about = None)]
struct Args {
    /// MagicaVoxel scene to read
    input_file: PathBuf,
    /// Output files are named <prefix>_<index>.npy
    output_name_prefix: String,
    /// Directory the arrays are written into (must exist)
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Write palette RGBA values instead of color indices
    #[arg(long)]
    rgba: bool,
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init_logging();
    let args = Args::parse();

    let config = ToolConfig::load(args.config.as_deref())?;
    let mut options = ConvertOptions::from(&config.convert);
    if let Some(out_dir) = args.out_dir {
        options.out_dir = out_dir;
    }
    options.rgba |= args.rgba;

    let stdout = std::io::stdout();
    let outcome = convert_scene(
        &args.input_file,
        &args.output_name_prefix,
        &options,
        &mut stdout.lock(),
    )
    .with_context(|| format!("Failed to convert {}", args.input_file.display()))?;

    // A missing input is reported on stdout and still exits successfully
    if let ConvertOutcome::Converted(saved) = outcome {
        log::info!("[vox-conv] {} models written", saved.len());
    }
    Ok(())
}

//! Print the shape of a `.npy` array, one dimension per line

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use vox_tools::{logging, npy};

#[derive(Debug, Parser)]
#[command(name = "npy-info")]
#[command(version)]
#[command(about = "Show the header of a .npy file.", long_about = None)]
struct Args {
    /// Array file to inspect
    npy_path: PathBuf,
}

fn main() -> Result<()> {
    logging::init_logging();
    let args = Args::parse();

    let file = std::fs::File::open(&args.npy_path)
        .with_context(|| format!("Failed to open {}", args.npy_path.display()))?;
    let header = npy::read_header(&mut std::io::BufReader::new(file))
        .with_context(|| format!("Failed to read {}", args.npy_path.display()))?;
    log::info!(
        "[npy-info] version {}.{}, dtype {}, {} elements",
        header.version.0,
        header.version.1,
        header.descr,
        header.element_count()
    );

    for dim in &header.shape {
        println!("{}", dim);
    }
    Ok(())
}

//! Voxelize a glTF mesh and show the grid

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use vox_tools::npy::{self, format_shape};
use vox_tools::{load_mesh, logging, viewer, voxelize, ToolConfig};

#[derive(Debug, Parser)]
#[command(name = "voxelizer")]
#[command(version)]
#[command(about = "Voxelize a mesh and view the result.", long_about = None)]
struct Args {
    /// Mesh to load (.glb or .gltf)
    #[arg(long)]
    mesh: Option<PathBuf>,
    /// Voxel edge length in mesh units
    #[arg(long)]
    pitch: Option<f32>,
    /// Fill enclosed interiors
    #[arg(long)]
    fill: bool,
    /// Save the occupancy grid as a uint8 .npy array
    #[arg(long)]
    save: Option<PathBuf>,
    /// Print a summary instead of opening a window
    #[arg(long)]
    headless: bool,
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init_logging();
    let args = Args::parse();

    let config = ToolConfig::load(args.config.as_deref())?;
    let mesh_path = args.mesh.unwrap_or(config.voxelize.mesh_path);
    let pitch = args.pitch.unwrap_or(config.voxelize.pitch);

    let mesh = load_mesh(&mesh_path)
        .with_context(|| format!("Failed to load mesh {}", mesh_path.display()))?;
    let mut grid = voxelize(&mesh, pitch)?;
    if args.fill || config.voxelize.fill {
        grid.fill();
    }

    if let Some(path) = &args.save {
        npy::save(path, &grid.to_u8())
            .with_context(|| format!("Failed to save grid to {}", path.display()))?;
        log::info!("[voxelizer] Grid saved to {}", path.display());
    }

    if args.headless {
        println!("Grid shape: {}", format_shape(&grid.shape()));
        println!("Filled voxels: {}", grid.filled_count());
        return Ok(());
    }

    viewer::show(&grid, &config.viewer)
}

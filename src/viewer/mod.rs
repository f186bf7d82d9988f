//! Interactive voxel grid viewer
//!
//! Filled cells are drawn as shaded cubes around an orbit camera:
//! left-drag rotates, scroll zooms, `R` resets the view, `Escape` closes.

pub mod camera;
mod gpu_state;
pub mod input;
pub mod mesh;
pub mod mesher;
pub mod perf_log;
pub mod vertex;

pub use mesh::VoxelMesh;
pub use mesher::build_voxel_mesh;
pub use perf_log::PerformanceLog;

use anyhow::Result;
use winit::event_loop::EventLoop;

use crate::config::ViewerConfig;
use crate::voxelize::VoxelGrid;

/// Show `grid` in a window, blocking until it is closed
pub fn show(grid: &VoxelGrid, config: &ViewerConfig) -> Result<()> {
    let mesh = build_voxel_mesh(grid, config.voxel_color);
    log::info!(
        "[viewer] Showing {} filled cells as {} faces",
        grid.filled_count(),
        mesh.quad_count()
    );

    let event_loop = EventLoop::new()?;
    pollster::block_on(gpu_state::run_app(event_loop, mesh, grid.bounds(), config))
}

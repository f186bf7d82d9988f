pub mod config;
pub mod convert;
pub mod error;
pub mod frametime;
pub mod logging;
pub mod mesh;
pub mod npy;
pub mod viewer;
pub mod vox;
pub mod voxelize;

pub use config::ToolConfig;
pub use convert::{convert_scene, ConvertOptions, ConvertOutcome, SavedModel};
pub use error::{ToolError, ToolResult};
pub use frametime::FrameTimeSummary;
pub use mesh::{load_mesh, Bounds, TriMesh};
pub use vox::{VoxModel, VoxScene};
pub use voxelize::{voxelize, VoxelGrid};

//! Optional TOML configuration shared by the tools
//!
//! Every field has a default that reproduces the plain command-line
//! behavior, so running without a config file changes nothing.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ToolError, ToolResult};

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "vox-tools.toml";

/// Column holding per-frame render time in milliseconds
pub const DEFAULT_FRAME_TIME_COLUMN: &str = "FrameTime";

/// Directory converted models are written into
pub const DEFAULT_OUTPUT_DIR: &str = "Scenes";

/// Mesh the voxelizer loads when no path is given
pub const DEFAULT_MESH_PATH: &str = "Scenes/rusty.glb";

/// Voxel edge length in mesh units
pub const DEFAULT_PITCH: f32 = 1.0;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub frametime: FrameTimeConfig,
    pub convert: ConvertConfig,
    pub voxelize: VoxelizeConfig,
    pub viewer: ViewerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrameTimeConfig {
    pub column: String,
}

impl Default for FrameTimeConfig {
    fn default() -> Self {
        Self {
            column: DEFAULT_FRAME_TIME_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub out_dir: PathBuf,
    /// Export palette colors instead of color indices
    pub rgba: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            rgba: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VoxelizeConfig {
    pub mesh_path: PathBuf,
    pub pitch: f32,
    /// Fill the interior of closed surfaces
    pub fill: bool,
}

impl Default for VoxelizeConfig {
    fn default() -> Self {
        Self {
            mesh_path: PathBuf::from(DEFAULT_MESH_PATH),
            pitch: DEFAULT_PITCH,
            fill: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background: [f64; 3],
    pub voxel_color: [f32; 3],
    /// CSV written on exit with one `FrameTime` row per rendered frame
    pub performance_log: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Voxelizer".to_string(),
            width: 1280,
            height: 720,
            background: [0.08, 0.09, 0.11],
            voxel_color: [0.85, 0.55, 0.35],
            performance_log: None,
        }
    }
}

impl ToolConfig {
    pub fn from_toml_str(raw: &str) -> ToolResult<Self> {
        toml::from_str(raw).map_err(|e| ToolError::Config(e.to_string()))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `vox-tools.toml` in the
    /// working directory is used when present and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> ToolResult<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    log::debug!("[config] No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let raw = std::fs::read_to_string(&path)
            .map_err(|e| ToolError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&raw)?;
        log::info!("[config] Loaded {}", path.display());
        Ok(config)
    }
}

//! Error handling shared by every tool
//!
//! Library operations return [`ToolResult`]; binaries wrap these in
//! `anyhow` with extra context before reporting them.

use std::path::{Path, PathBuf};

/// Result type for library operations
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors produced while reading, converting or voxelizing files
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report: {0}")]
    Report(#[source] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{column}' not found (available: {available})")]
    MissingColumn { column: String, available: String },

    #[error("Row {row}: '{value}' in column '{column}' is not a number")]
    InvalidSample {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Malformed vox data at byte {offset}: {reason}")]
    MalformedVox { offset: usize, reason: String },

    #[error("Unsupported vox version {found} (expected 150 or 200)")]
    UnsupportedVersion { found: u32 },

    #[error("Model index {index} out of range (scene has {count} models)")]
    ModelIndex { index: usize, count: usize },

    #[error("NPY error: {0}")]
    Npy(String),

    #[error("glTF error in {path}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("Mesh contains no triangles")]
    EmptyMesh,

    #[error("Invalid voxel pitch {pitch}: must be finite and positive")]
    InvalidPitch { pitch: f32 },

    #[error("Triangle {index} spans {edge} units, too long to subdivide at pitch {pitch}")]
    TriangleTooLarge { index: usize, edge: f32, pitch: f32 },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Attach a file path to I/O errors
pub trait IoResultExt<T> {
    fn with_path(self, path: impl AsRef<Path>) -> ToolResult<T>;
}

impl<T> IoResultExt<T> for Result<T, std::io::Error> {
    fn with_path(self, path: impl AsRef<Path>) -> ToolResult<T> {
        self.map_err(|source| ToolError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Create a malformed vox error
pub fn malformed_vox(offset: usize, reason: impl Into<String>) -> ToolError {
    ToolError::MalformedVox {
        offset,
        reason: reason.into(),
    }
}

/// Create an npy format error
pub fn npy_error(reason: impl Into<String>) -> ToolError {
    ToolError::Npy(reason.into())
}

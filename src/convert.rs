//! `.vox` scene to per-model `.npy` conversion

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{ConvertConfig, DEFAULT_OUTPUT_DIR};
use crate::error::{ToolError, ToolResult};
use crate::npy::{self, format_shape};
use crate::vox;

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Directory the `.npy` files go into. It is not created.
    pub out_dir: PathBuf,
    /// Write `(y, z, x, 4)` palette colors instead of color indices
    pub rgba: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            rgba: false,
        }
    }
}

impl From<&ConvertConfig> for ConvertOptions {
    fn from(config: &ConvertConfig) -> Self {
        Self {
            out_dir: config.out_dir.clone(),
            rgba: config.rgba,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedModel {
    pub index: usize,
    pub shape: Vec<usize>,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConvertOutcome {
    /// Input did not exist; `File not found` was reported
    NotFound,
    Converted(Vec<SavedModel>),
}

/// `<out_dir>/<prefix>_<index>.npy`
pub fn output_path(out_dir: &Path, prefix: &str, index: usize) -> PathBuf {
    out_dir.join(format!("{}_{}.npy", prefix, index))
}

/// Convert every model of `input` to a dense array file, reporting each to `out`.
///
/// Models are written in file order and the first failure stops the run;
/// files already written stay in place.
pub fn convert_scene<W: Write>(
    input: &Path,
    prefix: &str,
    options: &ConvertOptions,
    out: &mut W,
) -> ToolResult<ConvertOutcome> {
    if !input.exists() {
        log::warn!("[convert] {} does not exist", input.display());
        writeln!(out, "File not found").map_err(ToolError::Report)?;
        return Ok(ConvertOutcome::NotFound);
    }

    let scene = vox::parse_file(input)?;
    let mut saved = Vec::with_capacity(scene.models.len());

    for index in 0..scene.models.len() {
        let path = output_path(&options.out_dir, prefix, index);

        let shape = if options.rgba {
            let dense = scene.to_dense_rgba(index)?;
            npy::save(&path, &dense)?;
            dense.shape().to_vec()
        } else {
            let dense = scene.to_dense(index)?;
            npy::save(&path, &dense)?;
            dense.shape().to_vec()
        };

        writeln!(out, "Model resolution: {}", format_shape(&shape)).map_err(ToolError::Report)?;
        writeln!(out, "Model {} saved to {}", index, path.display()).map_err(ToolError::Report)?;

        saved.push(SavedModel { index, shape, path });
    }

    log::info!(
        "[convert] Wrote {} models from {}",
        saved.len(),
        input.display()
    );
    Ok(ConvertOutcome::Converted(saved))
}

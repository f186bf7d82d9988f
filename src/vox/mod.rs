//! MagicaVoxel scenes and their dense array form

mod palette;
mod parser;

pub use palette::Palette;
pub use parser::{parse_bytes, parse_file, SUPPORTED_VERSIONS};

use ndarray::{Array3, Array4};

use crate::error::{ToolError, ToolResult};

/// One filled cell of a model, in model space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voxel {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub color_index: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoxModel {
    /// Extent along x, y, z
    pub size: [u32; 3],
    pub voxels: Vec<Voxel>,
}

#[derive(Debug, Clone)]
pub struct VoxScene {
    pub version: u32,
    pub models: Vec<VoxModel>,
    /// Palette from the file's `RGBA` chunk, if it had one
    pub palette: Option<Palette>,
}

impl VoxModel {
    /// Dense array axes: (y, z, x)
    pub fn dense_shape(&self) -> (usize, usize, usize) {
        let [sx, sy, sz] = self.size;
        (sy as usize, sz as usize, sx as usize)
    }

    /// Iterate voxels inside the model extent as `(y, flipped z, x)` indices
    fn dense_cells(&self) -> impl Iterator<Item = ([usize; 3], &Voxel)> + '_ {
        let [sx, sy, sz] = self.size;
        self.voxels.iter().filter_map(move |v| {
            let (x, y, z) = (v.x as u32, v.y as u32, v.z as u32);
            if x >= sx || y >= sy || z >= sz {
                log::warn!(
                    "[vox::dense] Voxel ({}, {}, {}) outside model size {}x{}x{}, skipped",
                    x, y, z, sx, sy, sz
                );
                return None;
            }
            Some(([y as usize, (sz - z - 1) as usize, x as usize], v))
        })
    }

    /// Color indices laid out as (y, z, x) with z flipped; empty cells are 0.
    pub fn to_dense(&self) -> Array3<u8> {
        let mut dense = Array3::<u8>::zeros(self.dense_shape());
        for (index, voxel) in self.dense_cells() {
            dense[index] = voxel.color_index;
        }
        dense
    }

    /// Palette colors laid out as (y, z, x, rgba); empty cells are zero.
    pub fn to_dense_rgba(&self, palette: &Palette) -> Array4<u8> {
        let (d0, d1, d2) = self.dense_shape();
        let mut dense = Array4::<u8>::zeros((d0, d1, d2, 4));
        for ([i, j, k], voxel) in self.dense_cells() {
            let color = palette.color(voxel.color_index);
            for (channel, value) in color.iter().enumerate() {
                dense[[i, j, k, channel]] = *value;
            }
        }
        dense
    }
}

impl VoxScene {
    pub fn model(&self, index: usize) -> ToolResult<&VoxModel> {
        self.models.get(index).ok_or(ToolError::ModelIndex {
            index,
            count: self.models.len(),
        })
    }

    pub fn to_dense(&self, index: usize) -> ToolResult<Array3<u8>> {
        Ok(self.model(index)?.to_dense())
    }

    /// Uses the scene palette, or MagicaVoxel's default when the file has none
    pub fn to_dense_rgba(&self, index: usize) -> ToolResult<Array4<u8>> {
        let model = self.model(index)?;
        Ok(match &self.palette {
            Some(palette) => model.to_dense_rgba(palette),
            None => model.to_dense_rgba(&Palette::default()),
        })
    }
}

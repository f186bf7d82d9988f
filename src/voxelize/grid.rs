use std::collections::VecDeque;

use cgmath::Point3;
use ndarray::Array3;

use crate::mesh::Bounds;

/// Dense occupancy grid in world space.
///
/// Cell `[i, j, k]` is centered at `origin + pitch * (i, j, k)`.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    pitch: f32,
    origin: Point3<f32>,
    matrix: Array3<bool>,
}

/// Face neighbors
const NEIGHBORS: [[isize; 3]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

impl VoxelGrid {
    pub fn new(pitch: f32, origin: Point3<f32>, matrix: Array3<bool>) -> Self {
        Self { pitch, origin, matrix }
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Center of cell `[0, 0, 0]`
    pub fn origin(&self) -> Point3<f32> {
        self.origin
    }

    pub fn matrix(&self) -> &Array3<bool> {
        &self.matrix
    }

    pub fn shape(&self) -> [usize; 3] {
        let dim = self.matrix.dim();
        [dim.0, dim.1, dim.2]
    }

    pub fn filled_count(&self) -> usize {
        self.matrix.iter().filter(|&&filled| filled).count()
    }

    /// Out-of-range coordinates read as empty
    pub fn is_filled(&self, x: isize, y: isize, z: isize) -> bool {
        if x < 0 || y < 0 || z < 0 {
            return false;
        }
        self.matrix
            .get([x as usize, y as usize, z as usize])
            .copied()
            .unwrap_or(false)
    }

    pub fn cell_center(&self, x: usize, y: usize, z: usize) -> Point3<f32> {
        Point3::new(
            self.origin.x + x as f32 * self.pitch,
            self.origin.y + y as f32 * self.pitch,
            self.origin.z + z as f32 * self.pitch,
        )
    }

    /// World-space centers of filled cells
    pub fn points(&self) -> Vec<Point3<f32>> {
        self.matrix
            .indexed_iter()
            .filter(|&(_, &filled)| filled)
            .map(|((x, y, z), _)| self.cell_center(x, y, z))
            .collect()
    }

    /// Box covering every cell, filled or not
    pub fn bounds(&self) -> Bounds {
        let half = self.pitch / 2.0;
        let [sx, sy, sz] = self.shape();
        let far = self.cell_center(
            sx.saturating_sub(1),
            sy.saturating_sub(1),
            sz.saturating_sub(1),
        );
        Bounds {
            min: Point3::new(
                self.origin.x - half,
                self.origin.y - half,
                self.origin.z - half,
            ),
            max: Point3::new(far.x + half, far.y + half, far.z + half),
        }
    }

    /// Fill enclosed cavities: every empty cell that cannot reach the grid
    /// border through empty face neighbors becomes filled.
    pub fn fill(&mut self) {
        let [sx, sy, sz] = self.shape();
        let mut outside = Array3::<bool>::from_elem((sx, sy, sz), false);
        let mut queue = VecDeque::new();

        for ((x, y, z), &filled) in self.matrix.indexed_iter() {
            let on_border = x == 0 || y == 0 || z == 0 || x + 1 == sx || y + 1 == sy || z + 1 == sz;
            if on_border && !filled {
                outside[[x, y, z]] = true;
                queue.push_back([x, y, z]);
            }
        }

        while let Some([x, y, z]) = queue.pop_front() {
            for [dx, dy, dz] in NEIGHBORS {
                let (nx, ny, nz) = (x as isize + dx, y as isize + dy, z as isize + dz);
                if nx < 0 || ny < 0 || nz < 0 {
                    continue;
                }
                let cell = [nx as usize, ny as usize, nz as usize];
                let reachable = matches!(self.matrix.get(cell), Some(false))
                    && !outside[cell];
                if reachable {
                    outside[cell] = true;
                    queue.push_back(cell);
                }
            }
        }

        let before = self.filled_count();
        self.matrix.zip_mut_with(&outside, |filled, &out| {
            if !out {
                *filled = true;
            }
        });
        log::debug!(
            "[voxelize::fill] Filled {} interior cells",
            self.filled_count() - before
        );
    }

    /// Occupancy as 0/1 bytes, for `.npy` export
    pub fn to_u8(&self) -> Array3<u8> {
        self.matrix.mapv(|filled| filled as u8)
    }
}

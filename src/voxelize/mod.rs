//! Surface voxelization of triangle meshes
//!
//! Each triangle is sampled on a barycentric lattice whose steps are no
//! longer than half a voxel, and every sample marks the cell it rounds to.
//! Only the surface is marked; [`VoxelGrid::fill`] closes the interior.

mod grid;

pub use grid::VoxelGrid;

use std::collections::HashSet;

use cgmath::{MetricSpace, Point3};
use ndarray::Array3;

use crate::error::{ToolError, ToolResult};
use crate::mesh::TriMesh;

/// Cell index a world position falls in. Ties round to even.
pub fn cell_index(position: f64, pitch: f64) -> i64 {
    (position / pitch).round_ties_even() as i64
}

/// Ten halvings of every edge
const MAX_SUBDIVISIONS: f32 = 1024.0;

/// Number of lattice steps per triangle edge so no step exceeds `max_step`,
/// or the longest edge when that would take more than `MAX_SUBDIVISIONS`
fn subdivisions(triangle: &[Point3<f32>; 3], max_step: f32) -> Result<usize, f32> {
    let [a, b, c] = *triangle;
    let edges = [a.distance(b), b.distance(c), c.distance(a)];
    if let Some(&edge) = edges.iter().find(|edge| !edge.is_finite()) {
        return Err(edge);
    }
    let longest = edges[0].max(edges[1]).max(edges[2]);
    let steps = (longest / max_step).ceil();
    if steps > MAX_SUBDIVISIONS {
        return Err(longest);
    }
    Ok((steps as usize).max(1))
}

pub fn voxelize(mesh: &TriMesh, pitch: f32) -> ToolResult<VoxelGrid> {
    if !pitch.is_finite() || pitch <= 0.0 {
        return Err(ToolError::InvalidPitch { pitch });
    }
    if mesh.is_empty() {
        return Err(ToolError::EmptyMesh);
    }

    let max_step = pitch / 2.0;
    let pitch64 = pitch as f64;
    let mut cells: HashSet<[i64; 3]> = HashSet::new();
    let mut samples = 0usize;

    for (index, triangle) in mesh.triangles().enumerate() {
        let n = subdivisions(&triangle, max_step)
            .map_err(|edge| ToolError::TriangleTooLarge { index, edge, pitch })?;
        let [a, b, c] = triangle.map(|p| [p.x as f64, p.y as f64, p.z as f64]);

        for i in 0..=n {
            for j in 0..=(n - i) {
                let u = i as f64 / n as f64;
                let v = j as f64 / n as f64;
                let mut cell = [0i64; 3];
                for axis in 0..3 {
                    let p = a[axis] + (b[axis] - a[axis]) * u + (c[axis] - a[axis]) * v;
                    cell[axis] = cell_index(p, pitch64);
                }
                cells.insert(cell);
                samples += 1;
            }
        }
    }

    let mut min = [i64::MAX; 3];
    let mut max = [i64::MIN; 3];
    for cell in &cells {
        for axis in 0..3 {
            min[axis] = min[axis].min(cell[axis]);
            max[axis] = max[axis].max(cell[axis]);
        }
    }

    let shape = (
        (max[0] - min[0] + 1) as usize,
        (max[1] - min[1] + 1) as usize,
        (max[2] - min[2] + 1) as usize,
    );
    let mut matrix = Array3::from_elem(shape, false);
    for cell in &cells {
        matrix[[
            (cell[0] - min[0]) as usize,
            (cell[1] - min[1]) as usize,
            (cell[2] - min[2]) as usize,
        ]] = true;
    }

    let origin = Point3::new(
        (min[0] as f64 * pitch64) as f32,
        (min[1] as f64 * pitch64) as f32,
        (min[2] as f64 * pitch64) as f32,
    );

    log::info!(
        "[voxelize] {} triangles -> {} samples -> {} cells in a {}x{}x{} grid (pitch {})",
        mesh.faces.len(),
        samples,
        cells.len(),
        shape.0,
        shape.1,
        shape.2,
        pitch
    );

    Ok(VoxelGrid::new(pitch, origin, matrix))
}

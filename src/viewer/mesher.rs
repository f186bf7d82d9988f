use super::mesh::VoxelMesh;
use super::vertex::Vertex;
use crate::voxelize::VoxelGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Right,
    Left,
    Top,
    Bottom,
    Front,
    Back,
}

impl Face {
    const ALL: [Face; 6] = [
        Face::Right,
        Face::Left,
        Face::Top,
        Face::Bottom,
        Face::Front,
        Face::Back,
    ];

    fn neighbor(self) -> [isize; 3] {
        match self {
            Face::Right => [1, 0, 0],
            Face::Left => [-1, 0, 0],
            Face::Top => [0, 1, 0],
            Face::Bottom => [0, -1, 0],
            Face::Front => [0, 0, 1],
            Face::Back => [0, 0, -1],
        }
    }

    fn normal(self) -> [f32; 3] {
        let [x, y, z] = self.neighbor();
        [x as f32, y as f32, z as f32]
    }

    /// Simple directional shading
    fn brightness(self) -> f32 {
        match self {
            Face::Top => 1.0,
            Face::Bottom => 0.5,
            Face::Right | Face::Left => 0.8,
            Face::Front | Face::Back => 0.6,
        }
    }

    /// Unit-cube corners, counter-clockwise seen from outside
    fn corners(self) -> [[f32; 3]; 4] {
        match self {
            Face::Right => [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
            Face::Left => [[0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]],
            Face::Top => [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
            Face::Bottom => [[0.0, 0.0, 1.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0]],
            Face::Front => [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
            Face::Back => [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        }
    }
}

/// Build cube faces for every filled cell, skipping faces shared with
/// another filled cell.
pub fn build_voxel_mesh(grid: &VoxelGrid, color: [f32; 3]) -> VoxelMesh {
    let mut mesh = VoxelMesh::default();
    let pitch = grid.pitch();
    let half = pitch / 2.0;

    for ((x, y, z), &filled) in grid.matrix().indexed_iter() {
        if !filled {
            continue;
        }

        let center = grid.cell_center(x, y, z);
        let min = [center.x - half, center.y - half, center.z - half];

        for face in Face::ALL {
            let [dx, dy, dz] = face.neighbor();
            if grid.is_filled(x as isize + dx, y as isize + dy, z as isize + dz) {
                continue;
            }
            add_face(&mut mesh, min, pitch, face, color);
        }
    }

    log::debug!(
        "[viewer::mesher] {} cells -> {} quads",
        grid.filled_count(),
        mesh.quad_count()
    );
    mesh
}

fn add_face(mesh: &mut VoxelMesh, min: [f32; 3], pitch: f32, face: Face, color: [f32; 3]) {
    let normal = face.normal();
    let light = face.brightness();
    let vertices = face.corners().map(|corner| {
        Vertex::new(
            [
                min[0] + corner[0] * pitch,
                min[1] + corner[1] * pitch,
                min[2] + corner[2] * pitch,
            ],
            color,
            normal,
            light,
        )
    });
    mesh.add_quad(vertices);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;
    use ndarray::Array3;

    const COLOR: [f32; 3] = [1.0, 0.5, 0.25];

    fn uniform_grid(pitch: f32, shape: (usize, usize, usize), filled: bool) -> VoxelGrid {
        VoxelGrid::new(
            pitch,
            Point3::new(0.0, 0.0, 0.0),
            Array3::from_elem(shape, filled),
        )
    }

    #[test]
    fn test_single_cell_emits_six_faces() {
        let grid = uniform_grid(1.0, (1, 1, 1), true);
        let mesh = build_voxel_mesh(&grid, COLOR);

        assert_eq!(mesh.quad_count(), 6);
        assert_eq!(mesh.indices.len(), 36);

        let xs: Vec<f32> = mesh.vertices.iter().map(|v| v.position[0]).collect();
        assert!(xs.iter().all(|&x| x == -0.5 || x == 0.5));
    }

    #[test]
    fn test_shared_faces_are_culled() {
        let grid = uniform_grid(1.0, (2, 1, 1), true);
        let mesh = build_voxel_mesh(&grid, COLOR);
        assert_eq!(mesh.quad_count(), 10);
    }

    #[test]
    fn test_solid_block_only_shows_shell() {
        let grid = uniform_grid(0.5, (3, 3, 3), true);
        let mesh = build_voxel_mesh(&grid, COLOR);
        assert_eq!(mesh.quad_count(), 6 * 9);
    }

    #[test]
    fn test_empty_grid_has_no_geometry() {
        let grid = uniform_grid(1.0, (2, 2, 2), false);
        assert!(build_voxel_mesh(&grid, COLOR).is_empty());
    }

    #[test]
    fn test_face_winding_matches_normal() {
        for face in Face::ALL {
            let [a, b, c, _] = face.corners();
            let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let cross = [
                u[1] * v[2] - u[2] * v[1],
                u[2] * v[0] - u[0] * v[2],
                u[0] * v[1] - u[1] * v[0],
            ];
            assert_eq!(cross, face.normal(), "{:?} is wound the wrong way", face);
        }
    }
}

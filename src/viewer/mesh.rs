use super::vertex::Vertex;

/// Corner order of the two triangles in a quad, split along the 0-2 diagonal
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Indexed triangle list ready for upload
#[derive(Debug, Default)]
pub struct VoxelMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl VoxelMesh {
    pub fn add_quad(&mut self, corners: [Vertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.indices.len() / QUAD_INDICES.len()
    }
}

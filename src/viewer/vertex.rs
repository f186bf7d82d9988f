use bytemuck::{Pod, Zeroable};

/// One corner of a cube face as uploaded to the GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub normal: [f32; 3],
    pub light: f32, // Face brightness, 0.0 to 1.0
}

impl Vertex {
    /// Locations match `VertexInput` in `voxel.wgsl`
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x3,
        3 => Float32
    ];

    pub fn new(position: [f32; 3], color: [f32; 3], normal: [f32; 3], light: f32) -> Self {
        Self {
            position,
            color,
            normal,
            light,
        }
    }

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex>(), 40);
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 40);
        assert_eq!(layout.attributes.len(), 4);
        assert_eq!(layout.attributes[2].offset, 24);
        assert_eq!(layout.attributes[3].offset, 36);
        assert_eq!(layout.attributes[3].format, wgpu::VertexFormat::Float32);
    }
}

//! Fixture writers shared by the integration tests

#![allow(dead_code)]

use std::path::Path;

use serde_json::json;

/// One model for [`vox_bytes`]: size and `[x, y, z, color_index]` voxels
pub struct ModelSpec {
    pub size: [i32; 3],
    pub voxels: Vec<[u8; 4]>,
}

fn chunk(id: &[u8; 4], content: &[u8], children: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(id);
    out.extend_from_slice(&(content.len() as u32).to_le_bytes());
    out.extend_from_slice(&(children.len() as u32).to_le_bytes());
    out.extend_from_slice(content);
    out.extend_from_slice(children);
    out
}

/// Build a version 150 `.vox` file with an optional `RGBA` chunk
pub fn vox_bytes(models: &[ModelSpec], palette: Option<&[[u8; 4]; 256]>) -> Vec<u8> {
    let mut children = Vec::new();
    if models.len() > 1 {
        children.extend(chunk(b"PACK", &(models.len() as u32).to_le_bytes(), &[]));
    }
    for model in models {
        let mut size = Vec::new();
        for v in model.size {
            size.extend_from_slice(&v.to_le_bytes());
        }
        children.extend(chunk(b"SIZE", &size, &[]));

        let mut xyzi = (model.voxels.len() as u32).to_le_bytes().to_vec();
        for voxel in &model.voxels {
            xyzi.extend_from_slice(voxel);
        }
        children.extend(chunk(b"XYZI", &xyzi, &[]));
    }
    if let Some(palette) = palette {
        let content: Vec<u8> = palette.iter().flatten().copied().collect();
        children.extend(chunk(b"RGBA", &content, &[]));
    }

    let mut out = b"VOX ".to_vec();
    out.extend_from_slice(&150u32.to_le_bytes());
    out.extend(chunk(b"MAIN", &[], &children));
    out
}

/// Corners and outward-wound faces of an axis-aligned box
pub fn box_geometry(min: [f32; 3], max: [f32; 3]) -> (Vec<[f32; 3]>, Vec<u32>) {
    let positions = (0..8)
        .map(|i| {
            [
                if i & 1 == 0 { min[0] } else { max[0] },
                if i & 2 == 0 { min[1] } else { max[1] },
                if i & 4 == 0 { min[2] } else { max[2] },
            ]
        })
        .collect();
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1, 1, 2, 3, // -z
        4, 5, 6, 5, 7, 6, // +z
        0, 1, 4, 1, 5, 4, // -y
        2, 6, 3, 3, 6, 7, // +y
        0, 4, 2, 2, 4, 6, // -x
        1, 3, 5, 3, 7, 5, // +x
    ];
    (positions, indices)
}

fn padded(mut data: Vec<u8>, fill: u8) -> Vec<u8> {
    while data.len() % 4 != 0 {
        data.push(fill);
    }
    data
}

/// Write a single-node binary glTF holding one indexed triangle mesh
pub fn write_glb(path: &Path, positions: &[[f32; 3]], indices: &[u32], translation: [f32; 3]) {
    let mut bin = Vec::new();
    for p in positions {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    let positions_len = bin.len();
    for i in indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    let indices_len = bin.len() - positions_len;

    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in positions {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }

    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0, "translation": translation }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": positions_len, "target": 34962 },
            { "buffer": 0, "byteOffset": positions_len, "byteLength": indices_len, "target": 34963 }
        ],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": 5126,
                "count": positions.len(),
                "type": "VEC3",
                "min": min,
                "max": max
            },
            {
                "bufferView": 1,
                "componentType": 5125,
                "count": indices.len(),
                "type": "SCALAR"
            }
        ]
    });

    let json_chunk = padded(
        serde_json::to_vec(&document).expect("Fixture JSON should serialize"),
        b' ',
    );
    let bin_chunk = padded(bin, 0);

    let total = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json_chunk);
    glb.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin_chunk);

    std::fs::write(path, glb).expect("Failed to write glb fixture");
}

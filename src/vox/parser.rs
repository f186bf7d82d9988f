//! MagicaVoxel `.vox` reader
//!
//! The file is a RIFF-style tree: a `MAIN` chunk whose children carry the
//! models (`SIZE` + `XYZI` pairs), an optional `RGBA` palette, and scene
//! graph / material chunks that are skipped.

use std::path::Path;

use crate::error::{malformed_vox, IoResultExt, ToolError, ToolResult};
use crate::vox::{Palette, VoxModel, VoxScene, Voxel};

const VOX_MAGIC: &[u8; 4] = b"VOX ";

/// Versions written by MagicaVoxel 0.99.x (150) and 0.99.7+ (200)
pub const SUPPORTED_VERSIONS: [u32; 2] = [150, 200];

/// Chunk id, content size and children size
const CHUNK_HEADER_SIZE: usize = 12;

struct ChunkHeader {
    id: [u8; 4],
    content_size: usize,
    children_size: usize,
}

/// Bounds-checked little-endian reader over a byte slice
struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    /// Offset of `data[0]` within the whole file, for error messages
    base: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, len: usize, what: &str) -> ToolResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                malformed_vox(
                    self.offset(),
                    format!(
                        "{} needs {} bytes but only {} remain",
                        what,
                        len,
                        self.data.len() - self.pos
                    ),
                )
            })?;
        let data = self.data;
        let bytes = &data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_u32(&mut self, what: &str) -> ToolResult<u32> {
        let bytes = self.take(4, what)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_i32(&mut self, what: &str) -> ToolResult<i32> {
        let bytes = self.take(4, what)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_chunk_header(&mut self) -> ToolResult<ChunkHeader> {
        let bytes = self.take(CHUNK_HEADER_SIZE, "chunk header")?;
        let mut id = [0u8; 4];
        id.copy_from_slice(&bytes[0..4]);
        let content_size = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        let children_size = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        Ok(ChunkHeader {
            id,
            content_size,
            children_size,
        })
    }
}

fn chunk_name(id: &[u8; 4]) -> String {
    String::from_utf8_lossy(id).into_owned()
}

pub fn parse_file(path: impl AsRef<Path>) -> ToolResult<VoxScene> {
    let path = path.as_ref();
    let data = std::fs::read(path).with_path(path)?;
    log::debug!(
        "[vox::parse] Read {} bytes from {}",
        data.len(),
        path.display()
    );
    parse_bytes(&data)
}

pub fn parse_bytes(data: &[u8]) -> ToolResult<VoxScene> {
    let mut cursor = ByteCursor::new(data, 0);

    let magic = cursor.take(4, "file magic")?;
    if magic != VOX_MAGIC {
        return Err(malformed_vox(0, "missing 'VOX ' magic"));
    }

    let version = cursor.read_u32("file version")?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(ToolError::UnsupportedVersion { found: version });
    }

    let main_offset = cursor.offset();
    let main = cursor.read_chunk_header()?;
    if &main.id != b"MAIN" {
        return Err(malformed_vox(
            main_offset,
            format!("expected MAIN chunk, found '{}'", chunk_name(&main.id)),
        ));
    }
    cursor.take(main.content_size, "MAIN content")?;

    let children_base = cursor.offset();
    let children = cursor.take(main.children_size, "MAIN children")?;
    let mut children = ByteCursor::new(children, children_base);

    let mut models = Vec::new();
    let mut palette = None;
    let mut pending_size: Option<[u32; 3]> = None;
    let mut pack_count = None;

    while !children.is_empty() {
        let chunk_offset = children.offset();
        let header = children.read_chunk_header()?;
        let content_base = children.offset();
        let content = children.take(header.content_size, "chunk content")?;
        children.take(header.children_size, "chunk children")?;
        let mut content = ByteCursor::new(content, content_base);

        match &header.id {
            b"PACK" => {
                let count = content.read_u32("PACK model count")?;
                log::debug!("[vox::parse] PACK declares {} models", count);
                pack_count = Some(count as usize);
            }
            b"SIZE" => {
                if pending_size.is_some() {
                    log::warn!(
                        "[vox::parse] SIZE at byte {} follows a SIZE without XYZI",
                        chunk_offset
                    );
                }
                let mut size = [0u32; 3];
                for (axis, value) in size.iter_mut().enumerate() {
                    let raw = content.read_i32("SIZE dimension")?;
                    *value = u32::try_from(raw).map_err(|_| {
                        let reason = format!("negative size {} on axis {}", raw, axis);
                        malformed_vox(chunk_offset, reason)
                    })?;
                }
                pending_size = Some(size);
            }
            b"XYZI" => {
                let size = pending_size.take().ok_or_else(|| {
                    malformed_vox(chunk_offset, "XYZI chunk without preceding SIZE")
                })?;
                let count = content.read_u32("XYZI voxel count")? as usize;
                let raw = content.take(count.saturating_mul(4), "XYZI voxels")?;
                let voxels = raw
                    .chunks_exact(4)
                    .map(|v| Voxel {
                        x: v[0],
                        y: v[1],
                        z: v[2],
                        color_index: v[3],
                    })
                    .collect();
                log::debug!(
                    "[vox::parse] Model {}: {}x{}x{} with {} voxels",
                    models.len(),
                    size[0],
                    size[1],
                    size[2],
                    count
                );
                models.push(VoxModel { size, voxels });
            }
            b"RGBA" => {
                let raw = content.take(256 * 4, "RGBA palette")?;
                let mut entries = [[0u8; 4]; 256];
                for (entry, bytes) in entries.iter_mut().zip(raw.chunks_exact(4)) {
                    entry.copy_from_slice(bytes);
                }
                palette = Some(Palette::from_rgba_chunk(&entries));
            }
            other => {
                log::trace!(
                    "[vox::parse] Skipping '{}' chunk ({} bytes)",
                    chunk_name(other),
                    header.content_size
                );
            }
        }
    }

    if pending_size.is_some() {
        log::warn!("[vox::parse] Trailing SIZE chunk without XYZI ignored");
    }
    if let Some(count) = pack_count {
        if count != models.len() {
            log::warn!(
                "[vox::parse] PACK declared {} models but {} were read",
                count,
                models.len()
            );
        }
    }

    log::info!(
        "[vox::parse] Parsed version {} scene with {} models",
        version,
        models.len()
    );

    Ok(VoxScene {
        version,
        models,
        palette,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &[u8; 4], content: &[u8], children: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(id);
        out.extend_from_slice(&(content.len() as u32).to_le_bytes());
        out.extend_from_slice(&(children.len() as u32).to_le_bytes());
        out.extend_from_slice(content);
        out.extend_from_slice(children);
        out
    }

    fn size_chunk(x: i32, y: i32, z: i32) -> Vec<u8> {
        let mut content = Vec::new();
        for v in [x, y, z] {
            content.extend_from_slice(&v.to_le_bytes());
        }
        chunk(b"SIZE", &content, &[])
    }

    fn xyzi_chunk(voxels: &[[u8; 4]]) -> Vec<u8> {
        let mut content = (voxels.len() as u32).to_le_bytes().to_vec();
        for v in voxels {
            content.extend_from_slice(v);
        }
        chunk(b"XYZI", &content, &[])
    }

    fn vox_file(version: u32, children: &[u8]) -> Vec<u8> {
        let mut out = b"VOX ".to_vec();
        out.extend_from_slice(&version.to_le_bytes());
        out.extend(chunk(b"MAIN", &[], children));
        out
    }

    #[test]
    fn test_parse_single_model() {
        let mut children = size_chunk(2, 3, 4);
        children.extend(xyzi_chunk(&[[0, 0, 0, 1], [1, 2, 3, 9]]));
        let scene = parse_bytes(&vox_file(150, &children)).expect("Parsing should succeed");

        assert_eq!(scene.version, 150);
        assert_eq!(scene.models.len(), 1);
        assert_eq!(scene.models[0].size, [2, 3, 4]);
        assert_eq!(
            scene.models[0].voxels[1],
            Voxel { x: 1, y: 2, z: 3, color_index: 9 }
        );
        assert!(scene.palette.is_none());
    }

    #[test]
    fn test_parse_skips_scene_graph_chunks() {
        let mut children = chunk(b"PACK", &2u32.to_le_bytes(), &[]);
        children.extend(size_chunk(1, 1, 1));
        children.extend(xyzi_chunk(&[[0, 0, 0, 5]]));
        children.extend(chunk(b"nTRN", &[0u8; 28], &[]));
        children.extend(size_chunk(2, 2, 2));
        children.extend(xyzi_chunk(&[]));
        children.extend(chunk(b"MATL", &[1, 2, 3, 4, 5, 6, 7, 8], &[]));

        let scene = parse_bytes(&vox_file(200, &children)).expect("Parsing should succeed");
        assert_eq!(scene.models.len(), 2);
        assert_eq!(scene.models[1].size, [2, 2, 2]);
        assert!(scene.models[1].voxels.is_empty());
    }

    #[test]
    fn test_parse_palette() {
        let mut palette = Vec::new();
        for i in 0..256u32 {
            palette.extend_from_slice(&[i as u8, 1, 2, 255]);
        }
        let mut children = size_chunk(1, 1, 1);
        children.extend(xyzi_chunk(&[[0, 0, 0, 1]]));
        children.extend(chunk(b"RGBA", &palette, &[]));

        let scene = parse_bytes(&vox_file(150, &children)).expect("Parsing should succeed");
        let palette = scene.palette.expect("Palette should be present");
        assert_eq!(palette.color(1), [0, 1, 2, 255]);
        assert_eq!(palette.color(10), [9, 1, 2, 255]);
    }

    #[test]
    fn test_invalid_magic() {
        let mut data = vox_file(150, &[]);
        data[0..4].copy_from_slice(b"RIFF");
        match parse_bytes(&data) {
            Err(ToolError::MalformedVox { offset, reason }) => {
                assert_eq!(offset, 0);
                assert!(reason.contains("magic"));
            }
            other => panic!("Expected MalformedVox error, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_version() {
        match parse_bytes(&vox_file(999, &[])) {
            Err(ToolError::UnsupportedVersion { found }) => assert_eq!(found, 999),
            other => panic!("Expected UnsupportedVersion error, got {:?}", other),
        }
    }

    #[test]
    fn test_xyzi_without_size() {
        let children = xyzi_chunk(&[[0, 0, 0, 1]]);
        assert!(matches!(
            parse_bytes(&vox_file(150, &children)),
            Err(ToolError::MalformedVox { .. })
        ));
    }

    #[test]
    fn test_truncated_file() {
        let mut children = size_chunk(4, 4, 4);
        children.extend(xyzi_chunk(&[[0, 0, 0, 1], [1, 1, 1, 1]]));
        let data = vox_file(150, &children);

        let result = parse_bytes(&data[..data.len() - 3]);
        match result {
            Err(ToolError::MalformedVox { reason, .. }) => {
                assert!(reason.contains("MAIN children"));
            }
            other => panic!("Expected MalformedVox error, got {:?}", other),
        }
    }

    #[test]
    fn test_xyzi_count_overruns_chunk() {
        let mut content = 10u32.to_le_bytes().to_vec();
        content.extend_from_slice(&[0, 0, 0, 1]);
        let mut children = size_chunk(1, 1, 1);
        children.extend(chunk(b"XYZI", &content, &[]));

        match parse_bytes(&vox_file(150, &children)) {
            Err(ToolError::MalformedVox { reason, .. }) => assert!(reason.contains("XYZI voxels")),
            other => panic!("Expected MalformedVox error, got {:?}", other),
        }
    }
}

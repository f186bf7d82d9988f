//! Triangle meshes loaded from glTF files

use std::path::Path;

use cgmath::{EuclideanSpace, Matrix4, Point3, SquareMatrix, Transform, Vector3};

use crate::error::{ToolError, ToolResult};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f32>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(
            Self {
                min: first,
                max: first,
            },
            |bounds, p| Self {
                min: Point3::new(
                    bounds.min.x.min(p.x),
                    bounds.min.y.min(p.y),
                    bounds.min.z.min(p.z),
                ),
                max: Point3::new(
                    bounds.max.x.max(p.x),
                    bounds.max.y.max(p.y),
                    bounds.max.z.max(p.z),
                ),
            },
        ))
    }

    pub fn extents(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }
}

/// Indexed triangle soup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<[u32; 3]>,
}

impl TriMesh {
    pub fn new(vertices: Vec<Point3<f32>>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// `None` when the mesh has no vertices
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.vertices)
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        self.faces.iter().map(move |face| {
            [
                self.vertices[face[0] as usize],
                self.vertices[face[1] as usize],
                self.vertices[face[2] as usize],
            ]
        })
    }

    /// Concatenate another vertex/face set, re-basing its indices.
    /// Faces referencing missing vertices are dropped.
    pub fn append(
        &mut self,
        vertices: Vec<Point3<f32>>,
        faces: impl IntoIterator<Item = [u32; 3]>,
    ) {
        let base = self.vertices.len() as u32;
        let count = vertices.len() as u32;
        self.vertices.extend(vertices);

        let mut dropped = 0usize;
        for face in faces {
            if face.iter().all(|&i| i < count) {
                self.faces.push([face[0] + base, face[1] + base, face[2] + base]);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::warn!("[mesh] Dropped {} faces with out-of-range indices", dropped);
        }
    }
}

/// Load every triangle of a glTF / GLB file as one mesh in world space.
///
/// Nodes of the default scene (or the first scene) are visited with their
/// accumulated transforms; files without scenes contribute their meshes
/// untransformed.
pub fn load_mesh(path: impl AsRef<Path>) -> ToolResult<TriMesh> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path).map_err(|source| ToolError::Gltf {
        path: path.to_path_buf(),
        source,
    })?;

    let mut mesh = TriMesh::default();
    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(&node, Matrix4::identity(), &buffers, &mut mesh);
            }
        }
        None => {
            for gltf_mesh in document.meshes() {
                append_primitives(&gltf_mesh, &Matrix4::identity(), &buffers, &mut mesh);
            }
        }
    }

    if mesh.is_empty() {
        log::error!("[mesh] {} has no triangle primitives", path.display());
        return Err(ToolError::EmptyMesh);
    }

    log::info!(
        "[mesh] Loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertices.len(),
        mesh.faces.len()
    );
    Ok(mesh)
}

fn collect_node(
    node: &gltf::Node,
    parent: Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    mesh: &mut TriMesh,
) {
    let world = parent * Matrix4::from(node.transform().matrix());
    if let Some(gltf_mesh) = node.mesh() {
        append_primitives(&gltf_mesh, &world, buffers, mesh);
    }
    for child in node.children() {
        collect_node(&child, world, buffers, mesh);
    }
}

fn append_primitives(
    gltf_mesh: &gltf::Mesh,
    world: &Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    mesh: &mut TriMesh,
) {
    for primitive in gltf_mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "[mesh] Skipping {:?} primitive in mesh '{}'",
                primitive.mode(),
                gltf_mesh.name().unwrap_or("unnamed")
            );
            continue;
        }

        let reader = primitive.reader(|buffer| {
            buffers.get(buffer.index()).map(|data| data.0.as_slice())
        });
        let positions: Vec<Point3<f32>> = match reader.read_positions() {
            Some(positions) => positions
                .map(|p| world.transform_point(Point3::new(p[0], p[1], p[2])))
                .collect(),
            None => {
                log::warn!("[mesh] Primitive without positions skipped");
                continue;
            }
        };

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        log::debug!(
            "[mesh] Primitive with {} vertices, {} indices",
            positions.len(),
            indices.len()
        );
        mesh.append(
            positions,
            indices.chunks_exact(3).map(|tri| [tri[0], tri[1], tri[2]]),
        );
    }
}

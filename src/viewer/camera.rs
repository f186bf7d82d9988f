//! Data-oriented orbit camera
//!
//! Plain data plus free functions that return updated copies.

use bytemuck::{Pod, Zeroable};
use cgmath::{perspective, Matrix4, Point3, Rad, Vector3};

use crate::mesh::Bounds;

/// wgpu clip space has z in [0, 1]; cgmath projections produce [-1, 1]
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;
const ROTATE_SPEED: f32 = 0.01; // Radians per pixel dragged
const ZOOM_STEP: f32 = 0.1; // Fraction of distance per scroll line
const MIN_DISTANCE: f32 = 0.1;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct OrbitCamera {
    pub target: [f32; 3],
    pub distance: f32,
    pub yaw_radians: f32,
    pub pitch_radians: f32,
    pub aspect_ratio: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
    _padding: [f32; 2],
}

/// Camera uniform buffer for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

/// Frame `bounds` from a three-quarter view, far enough to see all of it
pub fn init_orbit_camera(bounds: &Bounds, width: u32, height: u32) -> OrbitCamera {
    let center = bounds.center();
    let extents = bounds.extents();
    let radius = (extents.x * extents.x + extents.y * extents.y + extents.z * extents.z)
        .sqrt()
        .max(1.0)
        / 2.0;
    let fovy = std::f32::consts::FRAC_PI_4;
    let distance = radius / (fovy / 2.0).sin() * 1.1;

    OrbitCamera {
        target: center.into(),
        distance,
        yaw_radians: std::f32::consts::FRAC_PI_4,
        pitch_radians: 0.5,
        aspect_ratio: aspect(width, height),
        fovy_radians: fovy,
        znear: (distance - radius * 2.0).max(distance * 0.01),
        zfar: distance + radius * 4.0,
        _padding: [0.0; 2],
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// Update camera aspect ratio for window resize
pub fn update_aspect_ratio(camera: &OrbitCamera, width: u32, height: u32) -> OrbitCamera {
    let mut updated = *camera;
    updated.aspect_ratio = aspect(width, height);
    updated
}

/// Rotate around the target by a mouse drag in pixels
pub fn orbit(camera: &OrbitCamera, dx: f32, dy: f32) -> OrbitCamera {
    let mut updated = *camera;
    updated.yaw_radians += dx * ROTATE_SPEED;
    updated.pitch_radians =
        (updated.pitch_radians + dy * ROTATE_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
    updated
}

/// Positive `lines` move toward the target
pub fn zoom(camera: &OrbitCamera, lines: f32) -> OrbitCamera {
    let mut updated = *camera;
    updated.distance = (camera.distance * (1.0 - ZOOM_STEP).powf(lines)).max(MIN_DISTANCE);
    updated.zfar = camera.zfar.max(updated.distance * 2.0);
    updated
}

pub fn eye_position(camera: &OrbitCamera) -> Point3<f32> {
    let (sin_yaw, cos_yaw) = camera.yaw_radians.sin_cos();
    let (sin_pitch, cos_pitch) = camera.pitch_radians.sin_cos();
    let direction = Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw);
    Point3::from(camera.target) + direction * camera.distance
}

pub fn build_view_matrix(camera: &OrbitCamera) -> Matrix4<f32> {
    Matrix4::look_at_rh(
        eye_position(camera),
        Point3::from(camera.target),
        Vector3::unit_y(),
    )
}

pub fn build_projection_matrix(camera: &OrbitCamera) -> Matrix4<f32> {
    OPENGL_TO_WGPU_MATRIX
        * perspective(
            Rad(camera.fovy_radians),
            camera.aspect_ratio,
            camera.znear,
            camera.zfar,
        )
}

pub fn build_camera_uniform(camera: &OrbitCamera) -> CameraUniform {
    let view_proj = build_projection_matrix(camera) * build_view_matrix(camera);
    let eye = eye_position(camera);
    CameraUniform {
        view_proj: view_proj.into(),
        eye: [eye.x, eye.y, eye.z, 1.0],
    }
}

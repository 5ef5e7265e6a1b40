//! # Camera
//!
//! View camera pose, viewport, and screen-to-world ray construction.
//!
//! Cursor coordinates are in pixels with the origin at the top-left corner of
//! the viewport and +Y pointing down.

use std::fmt;

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::math;
use crate::scene::Ray;

/// Name of a scene camera, used as the key for light assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraId(pub String);

impl CameraId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CameraId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

// ============================================================================
// Camera Pose
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
}

fn default_fov() -> f32 {
    50.0
}

impl Default for CameraPose {
    fn default() -> Self {
        Self { position: Vec3::new(0.0, 0.0, 10.0), rotation: Quat::IDENTITY, fov_degrees: default_fov() }
    }
}

impl CameraPose {
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let rotation = math::aim_rotation(position, target).unwrap_or(Quat::IDENTITY);
        Self { position, rotation, fov_degrees: default_fov() }
    }

    /// View direction (local −Z).
    pub fn forward(&self) -> Vec3 {
        math::forward_of(self.rotation)
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

// ============================================================================
// Viewport
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280.0, height: 720.0 }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 { self.width / self.height } else { 1.0 }
    }

    /// Cursor pixel → normalized device coordinates (−1..1, +Y up).
    pub fn to_ndc(&self, cursor: Vec2) -> Vec2 {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        Vec2::new(2.0 * cursor.x / w - 1.0, 1.0 - 2.0 * cursor.y / h)
    }
}

/// World-space ray from the camera through a cursor position.
pub fn viewport_ray(camera: &CameraPose, viewport: &Viewport, cursor: Vec2) -> Ray {
    let ndc = viewport.to_ndc(cursor);
    let half_height = (camera.fov_degrees.to_radians() * 0.5).tan();
    let half_width = half_height * viewport.aspect();

    let local = Vec3::new(ndc.x * half_width, ndc.y * half_height, -1.0);
    let direction = (camera.rotation * local).normalize_or_zero();
    Ray::new(camera.position, direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_matches_forward() {
        let camera = CameraPose::looking_at(Vec3::new(0.0, 2.0, 8.0), Vec3::ZERO);
        let viewport = Viewport::default();
        let ray = viewport_ray(&camera, &viewport, viewport.center());
        assert!((ray.direction - camera.forward()).length() < 1e-5);
        assert_eq!(ray.origin, camera.position);
    }

    #[test]
    fn test_left_and_top_edges() {
        let camera = CameraPose::default();
        let viewport = Viewport::new(200.0, 100.0);
        let left = viewport_ray(&camera, &viewport, Vec2::new(0.0, 50.0));
        let top = viewport_ray(&camera, &viewport, Vec2::new(100.0, 0.0));
        assert!(left.direction.x < 0.0);
        assert!(left.direction.y.abs() < 1e-6);
        assert!(top.direction.y > 0.0);
    }

    #[test]
    fn test_camera_basis_orthonormal() {
        let camera = CameraPose::looking_at(Vec3::new(3.0, 4.0, 5.0), Vec3::ZERO);
        assert!(camera.forward().dot(camera.right()).abs() < 1e-5);
        assert!(camera.forward().dot(camera.up()).abs() < 1e-5);
        assert!((camera.right().cross(camera.up()) - (-camera.forward())).length() < 1e-5);
    }
}

//! # LightRig Math Utilities
//!
//! Shared vector helpers (reflection, aiming, ray/plane intersection, snapping).
//!
//! Lights look down their local −Z axis with +Y as the up hint, the same
//! convention Bevy uses for cameras and spot lights.

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Squared length under which a vector is treated as zero.
pub const ZERO_LENGTH_SQ: f32 = 1e-12;

/// Squared cross-product length under which two unit vectors are parallel.
const PARALLEL_SQ: f32 = 1e-8;

/// Mirror `incident` about the plane with unit `normal`.
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * incident.dot(normal) * normal
}

/// Rotation whose local −Z axis points along `forward`.
///
/// `up_hint` picks the roll. When it is parallel to `forward` the world +Y
/// axis is tried, then +Z. A zero `forward` yields the identity.
pub fn look_rotation(forward: Vec3, up_hint: Vec3) -> Quat {
    let Some(forward) = forward.try_normalize() else {
        return Quat::IDENTITY;
    };
    let back = -forward;

    let up = [up_hint, Vec3::Y, Vec3::Z]
        .into_iter()
        .find(|candidate| candidate.cross(back).length_squared() > PARALLEL_SQ)
        .unwrap_or(Vec3::X);

    let right = up.cross(back).normalize();
    let up = back.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize()
}

/// Rotation aiming from `from` toward `to`, or `None` when the points coincide.
pub fn aim_rotation(from: Vec3, to: Vec3) -> Option<Quat> {
    let dir = to - from;
    if dir.length_squared() < ZERO_LENGTH_SQ {
        return None;
    }
    Some(look_rotation(dir, Vec3::Y))
}

/// World-space forward (local −Z) of a rotation.
pub fn forward_of(rotation: Quat) -> Vec3 {
    rotation * Vec3::NEG_Z
}

/// Ray-plane intersection. Returns the ray parameter `t >= 0`, or `None` when
/// the ray is parallel to the plane or the plane lies behind the origin.
pub fn ray_plane_intersection(
    ray_origin: Vec3,
    ray_direction: Vec3,
    plane_point: Vec3,
    plane_normal: Vec3,
) -> Option<f32> {
    let denom = plane_normal.dot(ray_direction);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (plane_point - ray_origin).dot(plane_normal) / denom;
    if t >= 0.0 { Some(t) } else { None }
}

/// Round each component to the nearest multiple of `grid_size`.
pub fn snap_to_grid(position: Vec3, grid_size: f32) -> Vec3 {
    if grid_size <= 0.0 {
        return position;
    }
    (position / grid_size).round() * grid_size
}

/// Round an angle (any unit) to the nearest multiple of `increment`.
pub fn snap_angle(angle: f32, increment: f32) -> f32 {
    if increment <= 0.0 {
        return angle;
    }
    (angle / increment).round() * increment
}

/// Axis-aligned bounds of a point set. Empty input yields a zero box.
pub fn calculate_aabb(points: &[Vec3]) -> (Vec3, Vec3) {
    let Some(first) = points.first() else {
        return (Vec3::ZERO, Vec3::ZERO);
    };
    points
        .iter()
        .skip(1)
        .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)))
}

// ============================================================================
// Plane
// ============================================================================

/// An infinite plane through `point` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    /// Build a plane, normalizing `normal`. `None` for a zero normal.
    pub fn new(point: Vec3, normal: Vec3) -> Option<Self> {
        let normal = normal.try_normalize()?;
        Some(Self { point, normal })
    }

    /// Signed distance from `p` to the plane along the normal.
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        (p - self.point).dot(self.normal)
    }

    /// Mirror image of a point.
    pub fn reflect_point(&self, p: Vec3) -> Vec3 {
        p - 2.0 * self.signed_distance(p) * self.normal
    }

    /// Mirror image of a direction (ignores the plane offset).
    pub fn reflect_vector(&self, v: Vec3) -> Vec3 {
        reflect(v, self.normal)
    }

    /// Mirror a rotation so its forward and up axes are reflected while the
    /// result stays a proper rotation (local X is flipped to restore
    /// handedness). Applying it twice returns the input rotation.
    pub fn reflect_rotation(&self, rotation: Quat) -> Quat {
        let n = self.normal;
        let mirror = Mat3::IDENTITY - 2.0 * Mat3::from_cols(n * n.x, n * n.y, n * n.z);
        let flip_x = Mat3::from_diagonal(Vec3::new(-1.0, 1.0, 1.0));
        let m = mirror * Mat3::from_quat(rotation) * flip_x;
        Quat::from_mat3(&m).normalize()
    }
}

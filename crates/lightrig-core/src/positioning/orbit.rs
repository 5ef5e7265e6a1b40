//! Orbit placement: spherical coordinates around a pivot.
//!
//! `position = C + r·(cosφ·cosθ, sinφ, cosφ·sinθ)` with θ the azimuth in the
//! XZ plane and φ the elevation, always aimed back at C. Elevation stays
//! inside ±(π/2 − ε) so the aim never becomes parallel to the up hint.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::PositioningConfig;
use crate::input::Modifiers;
use crate::light::{LightEntity, LightTransform};
use crate::scene::SceneQuery;

use super::{FallbackReason, PositioningResult};

/// Elevation margin used when no config is at hand.
pub const DEFAULT_ELEVATION_EPSILON: f32 = 1e-3;

/// Radius below which an orbit has no usable direction.
const MIN_RADIUS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitAngles {
    /// θ, radians, measured from +X toward +Z
    pub azimuth: f32,
    /// φ, radians, positive above the XZ plane
    pub elevation: f32,
}

impl OrbitAngles {
    pub fn new(azimuth: f32, elevation: f32) -> Self {
        Self { azimuth, elevation }
    }

    /// Angles of an offset from the pivot (inverse of `direction`).
    pub fn from_offset(offset: Vec3) -> Self {
        let horizontal = (offset.x * offset.x + offset.z * offset.z).sqrt();
        Self { azimuth: offset.z.atan2(offset.x), elevation: offset.y.atan2(horizontal) }
    }

    /// Unit direction from the pivot.
    pub fn direction(&self) -> Vec3 {
        let (sin_t, cos_t) = self.azimuth.sin_cos();
        let (sin_p, cos_p) = self.elevation.sin_cos();
        Vec3::new(cos_p * cos_t, sin_p, cos_p * sin_t)
    }

    pub fn clamped(self, epsilon: f32) -> Self {
        let limit = FRAC_PI_2 - epsilon;
        Self { azimuth: self.azimuth, elevation: self.elevation.clamp(-limit, limit) }
    }
}

/// Live orbit parameters of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitState {
    pub center: Vec3,
    pub angles: OrbitAngles,
    /// Never negative
    pub radius: f32,
}

impl OrbitState {
    pub fn new(center: Vec3, angles: OrbitAngles, radius: f32) -> Self {
        Self { center, angles: angles.clamped(DEFAULT_ELEVATION_EPSILON), radius: radius.max(0.0) }
    }

    /// Orbit that reproduces `position` around `center`.
    pub fn from_position(center: Vec3, position: Vec3) -> Self {
        let offset = position - center;
        Self::new(center, OrbitAngles::from_offset(offset), offset.length())
    }

    pub fn position(&self) -> Vec3 {
        self.center + self.angles.direction() * self.radius
    }

    /// Apply a pointer delta in pixels. AXIS_LOCK freezes elevation.
    pub fn drag(&mut self, delta: Vec2, modifiers: Modifiers, config: &PositioningConfig) {
        self.angles.azimuth += delta.x * config.orbit_sensitivity;
        if !modifiers.contains(Modifiers::AXIS_LOCK) {
            self.angles.elevation -= delta.y * config.orbit_sensitivity;
        }
        self.angles = self.angles.clamped(config.elevation_epsilon);
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
    }
}

/// Pivot an orbit should use: the light's own pivot, else the scene's
/// bounding center, else the origin.
pub fn resolve_center(light: &LightEntity, scene: &dyn SceneQuery) -> Vec3 {
    light.pivot.or_else(|| scene.scene_center()).unwrap_or(Vec3::ZERO)
}

pub fn compute(state: &OrbitState, light: &LightEntity) -> PositioningResult {
    if state.radius < MIN_RADIUS {
        let transform = LightTransform::new(state.center, light.transform.rotation);
        return PositioningResult::fallback(transform, Some(state.center), FallbackReason::ZeroRadius);
    }
    let transform = LightTransform::looking_at(state.position(), state.center);
    PositioningResult::valid(transform, Some(state.center))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightKind;
    use crate::scene::{PrimitiveScene, Primitive};

    fn light() -> LightEntity {
        LightEntity::new("back", LightKind::Area)
    }

    #[test]
    fn test_orbit_zero_angles() {
        let state = OrbitState::new(Vec3::ZERO, OrbitAngles::new(0.0, 0.0), 5.0);
        let result = compute(&state, &light());
        assert!(result.valid);
        assert!((result.transform.position - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
        assert!((result.transform.forward() - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_from_position_round_trips() {
        let center = Vec3::new(1.0, 2.0, 3.0);
        let position = Vec3::new(-2.0, 4.5, 7.0);
        let state = OrbitState::from_position(center, position);
        assert!((state.position() - position).length() < 1e-4);
    }

    #[test]
    fn test_drag_and_elevation_clamp() {
        let config = PositioningConfig::default();
        let mut state = OrbitState::new(Vec3::ZERO, OrbitAngles::default(), 2.0);
        state.drag(Vec2::new(100.0, 0.0), Modifiers::empty(), &config);
        assert!((state.angles.azimuth - 1.0).abs() < 1e-5);

        state.drag(Vec2::new(0.0, -10_000.0), Modifiers::empty(), &config);
        assert!((state.angles.elevation - (FRAC_PI_2 - config.elevation_epsilon)).abs() < 1e-6);
        let result = compute(&state, &light());
        assert!(result.transform.rotation.is_finite());
    }

    #[test]
    fn test_axis_lock_freezes_elevation() {
        let config = PositioningConfig::default();
        let mut state = OrbitState::new(Vec3::ZERO, OrbitAngles::new(0.0, 0.3), 2.0);
        state.drag(Vec2::new(20.0, 50.0), Modifiers::AXIS_LOCK, &config);
        assert_eq!(state.angles.elevation, 0.3);
        assert!((state.angles.azimuth - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_zero_radius_is_invalid() {
        let light = light();
        let state = OrbitState::new(Vec3::ONE, OrbitAngles::default(), 0.0);
        let result = compute(&state, &light);
        assert!(!result.valid);
        assert_eq!(result.transform.position, Vec3::ONE);
        assert_eq!(result.transform.rotation, light.transform.rotation);
    }

    #[test]
    fn test_resolve_center_priority() {
        let scene = PrimitiveScene::new().with("box", Primitive::Aabb { min: Vec3::ZERO, max: Vec3::splat(4.0) });
        let empty = PrimitiveScene::new();
        assert_eq!(resolve_center(&light().with_pivot(Vec3::X), &scene), Vec3::X);
        assert_eq!(resolve_center(&light(), &scene), Vec3::splat(2.0));
        assert_eq!(resolve_center(&light(), &empty), Vec3::ZERO);
    }
}

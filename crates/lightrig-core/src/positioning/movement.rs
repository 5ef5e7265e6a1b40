//! Move: carry the light and its pivot together.
//!
//! The pivot follows the cursor across a camera-facing plane through the
//! session's starting pivot, and the light rides along at the same offset.
//! Orientation is untouched, so the light keeps aiming at the pivot. SNAP
//! rounds the pivot to the grid; AXIS_LOCK keeps only the larger of the
//! camera-right / camera-up components of the displacement.

use glam::Vec3;

use crate::camera::CameraPose;
use crate::config::PositioningConfig;
use crate::input::Modifiers;
use crate::light::{LightEntity, LightTransform};
use crate::math;
use crate::scene::SceneSnapshot;

use super::{FallbackReason, PositioningResult};

/// Pivot a Move session starts from: the light's own, else `distance` ahead
/// of it.
pub fn start_pivot(light: &LightEntity, distance: f32) -> Vec3 {
    light
        .pivot
        .unwrap_or(light.transform.position + light.transform.forward() * distance)
}

/// `anchor` and `anchor_pivot` are the light position and pivot when the
/// move started.
pub fn compute(
    snapshot: &SceneSnapshot,
    light: &LightEntity,
    camera: &CameraPose,
    anchor: Vec3,
    anchor_pivot: Vec3,
    modifiers: Modifiers,
    config: &PositioningConfig,
) -> PositioningResult {
    let ray = snapshot.ray;
    let hit = if ray.is_degenerate() {
        None
    } else {
        math::ray_plane_intersection(ray.origin, ray.direction, anchor_pivot, camera.forward())
    };
    let Some(t) = hit else {
        return PositioningResult::unchanged(light, FallbackReason::PlaneUnreachable);
    };

    let mut displacement = ray.at(t) - anchor_pivot;
    if modifiers.contains(Modifiers::AXIS_LOCK) {
        let (right, up) = (camera.right(), camera.up());
        let along_right = displacement.dot(right);
        let along_up = displacement.dot(up);
        displacement = if along_right.abs() >= along_up.abs() { right * along_right } else { up * along_up };
    }

    let mut pivot = anchor_pivot + displacement;
    if modifiers.contains(Modifiers::SNAP) {
        pivot = math::snap_to_grid(pivot, config.grid_size);
    }
    let position = anchor + (pivot - anchor_pivot);

    PositioningResult::valid(LightTransform::new(position, light.transform.rotation), Some(pivot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightKind;
    use crate::scene::Ray;

    fn camera() -> CameraPose {
        CameraPose::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
    }

    fn light() -> LightEntity {
        LightEntity::new("key", LightKind::Spot)
            .with_transform(LightTransform::looking_at(Vec3::new(2.0, 3.0, 1.0), Vec3::ZERO))
            .with_pivot(Vec3::ZERO)
    }

    #[test]
    fn test_light_and_pivot_move_together() {
        let light = light();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.1, -0.05, -1.0));
        let result = compute(
            &SceneSnapshot::miss(ray),
            &light,
            &camera(),
            light.transform.position,
            Vec3::ZERO,
            Modifiers::empty(),
            &PositioningConfig::default(),
        );

        assert!(result.valid);
        let pivot = result.pivot.unwrap();
        assert!((pivot - Vec3::new(1.0, -0.5, 0.0)).length() < 1e-4);
        let offset = result.transform.position - pivot;
        assert!((offset - light.transform.position).length() < 1e-4);
        assert_eq!(result.transform.rotation, light.transform.rotation);
    }

    #[test]
    fn test_axis_lock_and_snap() {
        let light = light();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.09, 0.02, -1.0));
        let modifiers = Modifiers::AXIS_LOCK | Modifiers::SNAP;
        let result = compute(
            &SceneSnapshot::miss(ray),
            &light,
            &camera(),
            light.transform.position,
            Vec3::ZERO,
            modifiers,
            &PositioningConfig::default(),
        );

        let pivot = result.pivot.unwrap();
        assert!((pivot - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-4);
        assert!((result.transform.position - Vec3::new(3.0, 3.0, 1.0)).length() < 1e-4);
    }

    #[test]
    fn test_start_pivot_without_pivot() {
        let light = LightEntity::new("fill", LightKind::Point)
            .with_transform(LightTransform::looking_at(Vec3::ZERO, Vec3::NEG_Z));
        assert!((start_pivot(&light, 2.0) - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
        assert_eq!(start_pivot(&light.clone().with_pivot(Vec3::ONE), 2.0), Vec3::ONE);
    }

    #[test]
    fn test_parallel_ray_is_invalid() {
        let light = light();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::X);
        let result = compute(
            &SceneSnapshot::miss(ray),
            &light,
            &camera(),
            light.transform.position,
            Vec3::ZERO,
            Modifiers::empty(),
            &PositioningConfig::default(),
        );
        assert_eq!(result.reason, Some(FallbackReason::PlaneUnreachable));
        assert_eq!(result.transform, light.transform);
    }
}

//! Free placement: drag the light across a plane through its starting
//! position.
//!
//! The plane faces the camera, or hugs the surface under the cursor while
//! SNAP is held. SNAP also rounds the position to the grid and the aim
//! toward the pivot to the angle increment. AXIS_LOCK keeps only the larger
//! of the camera-right / camera-up components of the displacement.

use glam::Vec3;

use crate::camera::CameraPose;
use crate::config::PositioningConfig;
use crate::input::Modifiers;
use crate::light::{LightEntity, LightTransform};
use crate::math;
use crate::scene::SceneSnapshot;

use super::orbit::OrbitAngles;
use super::{FallbackReason, PositioningResult};

pub fn compute(
    snapshot: &SceneSnapshot,
    light: &LightEntity,
    camera: &CameraPose,
    anchor: Vec3,
    modifiers: Modifiers,
    config: &PositioningConfig,
) -> PositioningResult {
    let snap = modifiers.contains(Modifiers::SNAP);
    let plane_normal = match snapshot.normal {
        Some(normal) if snap => normal,
        _ => camera.forward(),
    };

    let ray = snapshot.ray;
    let hit = if ray.is_degenerate() {
        None
    } else {
        math::ray_plane_intersection(ray.origin, ray.direction, anchor, plane_normal)
    };
    let Some(t) = hit else {
        return PositioningResult::unchanged(light, FallbackReason::PlaneUnreachable);
    };

    let mut displacement = ray.at(t) - anchor;
    if modifiers.contains(Modifiers::AXIS_LOCK) {
        let (right, up) = (camera.right(), camera.up());
        let along_right = displacement.dot(right);
        let along_up = displacement.dot(up);
        displacement = if along_right.abs() >= along_up.abs() { right * along_right } else { up * along_up };
    }

    let mut position = anchor + displacement;
    if snap {
        position = math::snap_to_grid(position, config.grid_size);
    }

    let rotation = match light.pivot {
        Some(pivot) => {
            let aim = pivot - position;
            let aim = if snap { snap_direction(aim, config.angle_increment) } else { aim };
            if aim.length_squared() < math::ZERO_LENGTH_SQ {
                light.transform.rotation
            } else {
                math::look_rotation(aim, Vec3::Y)
            }
        }
        None => light.transform.rotation,
    };

    PositioningResult::valid(LightTransform::new(position, rotation), light.pivot)
}

/// Round a direction's azimuth and elevation to `increment_degrees`.
fn snap_direction(direction: Vec3, increment_degrees: f32) -> Vec3 {
    let angles = OrbitAngles::from_offset(direction);
    let increment = increment_degrees.to_radians();
    let snapped = OrbitAngles::new(
        math::snap_angle(angles.azimuth, increment),
        math::snap_angle(angles.elevation, increment),
    );
    snapped.direction() * direction.length()
}

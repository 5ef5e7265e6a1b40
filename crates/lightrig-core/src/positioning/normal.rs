//! Normal placement: back the light off the surface along its normal and
//! point it straight at the hit.
//!
//! On a miss the camera stands in for the surface: N := camera forward and
//! P := camera position, so the light lands `distance` in front of the camera
//! facing back toward it.

use glam::Vec3;

use crate::camera::CameraPose;
use crate::light::LightTransform;
use crate::math;
use crate::scene::SceneSnapshot;

use super::{FallbackReason, PositioningResult};

pub fn compute(snapshot: &SceneSnapshot, camera: &CameraPose, distance: f32) -> PositioningResult {
    let hit = snapshot
        .hit_point
        .zip(snapshot.normal.and_then(Vec3::try_normalize));

    match hit {
        Some((point, normal)) => {
            let transform = place(point, normal, distance);
            PositioningResult::valid(transform, Some(point))
        }
        None => {
            let reason = if snapshot.is_hit() { FallbackReason::DegenerateNormal } else { FallbackReason::NoHit };
            let transform = place(camera.position, camera.forward(), distance);
            PositioningResult::fallback(transform, None, reason)
        }
    }
}

fn place(point: Vec3, normal: Vec3, distance: f32) -> LightTransform {
    LightTransform::new(point + normal * distance, math::look_rotation(-normal, Vec3::Y))
}

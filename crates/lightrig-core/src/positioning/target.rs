//! Target aiming: rotate the light to face a point.
//!
//! The point is explicit, or the surface under the cursor. Position is held
//! unless a distance is given, in which case the light slides along its
//! current line of sight to sit `distance` from the target.

use glam::Vec3;

use crate::config::PositioningConfig;
use crate::light::{LightEntity, LightTransform};
use crate::math;
use crate::scene::SceneSnapshot;

use super::{FallbackReason, PositioningResult};

pub fn compute(
    snapshot: &SceneSnapshot,
    light: &LightEntity,
    explicit: Option<Vec3>,
    distance: Option<f32>,
    config: &PositioningConfig,
) -> PositioningResult {
    let (target, miss) = match explicit.or(snapshot.hit_point) {
        Some(point) => (point, false),
        None => (snapshot.ray.at(config.default_distance), true),
    };

    let mut transform: LightTransform = light.transform;
    let Some(direction) = (target - transform.position).try_normalize() else {
        return PositioningResult::unchanged(light, FallbackReason::TargetCoincident);
    };

    if let Some(distance) = distance {
        transform.position = target - direction * distance.max(0.0);
    }

    match math::aim_rotation(transform.position, target) {
        Some(rotation) => {
            transform.rotation = rotation;
            if miss {
                PositioningResult::fallback(transform, Some(target), FallbackReason::NoHit)
            } else {
                PositioningResult::valid(transform, Some(target))
            }
        }
        None => PositioningResult::unchanged(light, FallbackReason::TargetCoincident),
    }
}

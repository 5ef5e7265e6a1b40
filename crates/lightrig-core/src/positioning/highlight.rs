//! Highlight placement: put the light where its mirror reflection off the
//! surface lands in the camera.
//!
//! `D = reflect(normalize(P − V), N)`, position `P + D·distance`, aimed at P.
//!
//! Degenerate input (|N| < 1e-6, or `dot(−i, N)` below `grazing_cos`) falls
//! back to `P − i·distance`, i.e. back along the view ray toward the camera,
//! still aimed at P. A miss falls back to `V + forward·distance` with the
//! camera's own orientation.

use glam::Vec3;

use crate::camera::CameraPose;
use crate::config::PositioningConfig;
use crate::light::LightTransform;
use crate::math;
use crate::scene::SceneSnapshot;

use super::{FallbackReason, PositioningResult};

pub fn compute(
    snapshot: &SceneSnapshot,
    camera: &CameraPose,
    distance: f32,
    config: &PositioningConfig,
) -> PositioningResult {
    let (Some(point), Some(normal)) = (snapshot.hit_point, snapshot.normal) else {
        return miss(camera, distance);
    };

    let incident = (point - camera.position).try_normalize().unwrap_or_else(|| camera.forward());

    let normal_len = normal.length();
    if normal_len < 1e-6 {
        return along_view(point, incident, distance, FallbackReason::DegenerateNormal);
    }
    let normal = normal / normal_len;

    if (-incident).dot(normal) < config.grazing_cos {
        return along_view(point, incident, distance, FallbackReason::GrazingAngle);
    }

    let direction = math::reflect(incident, normal);
    let position = point + direction * distance;
    PositioningResult::valid(LightTransform::looking_at(position, point), Some(point))
}

fn along_view(point: Vec3, incident: Vec3, distance: f32, reason: FallbackReason) -> PositioningResult {
    let position = point - incident * distance;
    PositioningResult::fallback(LightTransform::looking_at(position, point), Some(point), reason)
}

fn miss(camera: &CameraPose, distance: f32) -> PositioningResult {
    let position = camera.position + camera.forward() * distance;
    PositioningResult::fallback(LightTransform::new(position, camera.rotation), None, FallbackReason::NoHit)
}

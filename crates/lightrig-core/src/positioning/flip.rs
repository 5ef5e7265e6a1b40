//! Flip: mirror the light (and its pivot) across a plane, or turn it half
//! way around the vertical axis through its pivot.
//!
//! Orientation is mirrored as `R·Q·Sx`, where R reflects across the plane and
//! Sx flips the light's local X. Forward and up are both reflected and the
//! result is still a proper rotation, so flipping twice across the same plane
//! restores the original transform. The half turn is its own inverse too.
//!
//! `place_on_camera_axis` lives here as well: the camera-axis placements are
//! flips in the UI but not involutions, so they are plain functions outside
//! the session's flip mode.

use std::f32::consts::PI;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::CameraPose;
use crate::light::{LightEntity, LightTransform};
use crate::math::{self, Plane};
use crate::scene::{ObjectId, SceneQuery};

use super::{FallbackReason, PositioningResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipPlane {
    /// Left/right in the view: through the camera, normal = camera right
    CameraHorizontal,
    /// Up/down in the view: through the camera, normal = camera up
    CameraVertical,
    /// Front/back: through the pivot, normal = camera forward
    CameraDepth,
    /// Opposite side of the pivot: through the pivot, normal = pivot→light
    AcrossPivot,
    /// Explicit scene symmetry plane
    Symmetry(Plane),
    /// 180° about the world vertical through the pivot; the pivot stays put
    HalfTurn,
}

impl FlipPlane {
    pub fn name(&self) -> &'static str {
        match self {
            FlipPlane::CameraHorizontal => "Horizontal",
            FlipPlane::CameraVertical => "Vertical",
            FlipPlane::CameraDepth => "Front/Back",
            FlipPlane::AcrossPivot => "Across Pivot",
            FlipPlane::Symmetry(_) => "Symmetry",
            FlipPlane::HalfTurn => "Half Turn",
        }
    }

    /// Concrete mirror plane for this light and camera. `None` for the half
    /// turn, which is a rotation.
    pub fn resolve(&self, light: &LightEntity, camera: &CameraPose) -> Result<Option<Plane>, FallbackReason> {
        let plane = match *self {
            FlipPlane::CameraHorizontal => Plane::new(camera.position, camera.right()),
            FlipPlane::CameraVertical => Plane::new(camera.position, camera.up()),
            FlipPlane::CameraDepth => {
                let pivot = light.pivot.ok_or(FallbackReason::MissingPivot)?;
                Plane::new(pivot, camera.forward())
            }
            FlipPlane::AcrossPivot => {
                let pivot = light.pivot.ok_or(FallbackReason::MissingPivot)?;
                Plane::new(pivot, light.transform.position - pivot)
            }
            FlipPlane::Symmetry(plane) => Plane::new(plane.point, plane.normal),
            FlipPlane::HalfTurn => return Ok(None),
        };
        plane.map(Some).ok_or(FallbackReason::DegeneratePlane)
    }
}

pub fn compute(light: &LightEntity, camera: &CameraPose, plane: &FlipPlane) -> PositioningResult {
    let plane = match plane.resolve(light, camera) {
        Ok(Some(plane)) => plane,
        Ok(None) => return half_turn(light),
        Err(reason) => return PositioningResult::unchanged(light, reason),
    };

    let transform = LightTransform::new(
        plane.reflect_point(light.transform.position),
        plane.reflect_rotation(light.transform.rotation),
    );
    let pivot = light.pivot.map(|p| plane.reflect_point(p));
    PositioningResult::valid(transform, pivot)
}

fn half_turn(light: &LightEntity) -> PositioningResult {
    let Some(pivot) = light.pivot else {
        return PositioningResult::unchanged(light, FallbackReason::MissingPivot);
    };
    let turn = Quat::from_rotation_y(PI);
    let transform = LightTransform::new(
        pivot + turn * (light.transform.position - pivot),
        (turn * light.transform.rotation).normalize(),
    );
    PositioningResult::valid(transform, Some(pivot))
}

// ============================================================================
// Camera-axis placement
// ============================================================================

/// Where `place_on_camera_axis` puts the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraAxisPlacement {
    /// Just behind the subject on the camera axis, aimed back at it
    Front,
    /// At the camera, aimed along the camera's view
    Back,
    /// Behind the subject like `Front`, aimed away toward the background
    Along,
}

/// Gap between the subject's back surface and a `Front`/`Along` light.
pub const BEHIND_SUBJECT_OFFSET: f32 = 0.5;

/// Default pivot distance for an `Along` light that sees no background.
const BACKGROUND_FALLBACK_DISTANCE: f32 = 2.0;

/// Place `light` relative to whatever the camera looks at.
///
/// The subject is the first surface on the camera's forward axis. `Front`
/// and `Along` stand `BEHIND_SUBJECT_OFFSET` past the subject's far side
/// (the exit point of the camera axis through it); `Back` sits on the camera
/// itself, pivoting on the subject. With nothing on the axis the light is
/// left alone and flagged `NoHit`.
pub fn place_on_camera_axis(
    light: &LightEntity,
    camera: &CameraPose,
    scene: &dyn SceneQuery,
    placement: CameraAxisPlacement,
    max_distance: f32,
) -> PositioningResult {
    let forward = camera.forward();
    let subject = scene.query(camera.position, forward, max_distance);
    let (Some(hit), Some(object)) = (subject.hit_point, subject.object) else {
        return PositioningResult::unchanged(light, FallbackReason::NoHit);
    };

    if placement == CameraAxisPlacement::Back {
        let transform = LightTransform::new(camera.position, camera.rotation);
        return PositioningResult::valid(transform, Some(hit));
    }

    let back = far_side(scene, object, hit, forward);
    let position = back + forward * BEHIND_SUBJECT_OFFSET;

    match placement {
        CameraAxisPlacement::Along => {
            // Pivot on the background the light now faces, if any.
            let pivot = scene
                .query_excluding(position, forward, max_distance, &[object])
                .hit_point
                .unwrap_or(position + forward * BACKGROUND_FALLBACK_DISTANCE);
            PositioningResult::valid(LightTransform::new(position, math::look_rotation(forward, Vec3::Y)), Some(pivot))
        }
        _ => PositioningResult::valid(LightTransform::looking_at(position, back), Some(back)),
    }
}

/// Exit point of the camera axis through `object`: cast back toward the
/// camera from beyond the object's bounds, ignoring everything else.
fn far_side(scene: &dyn SceneQuery, object: ObjectId, hit: Vec3, forward: Vec3) -> Vec3 {
    let reach = 2.0 * scene.bounding_radius(&[object]) + BEHIND_SUBJECT_OFFSET;
    let others: Vec<_> = scene.objects().into_iter().filter(|id| *id != object).collect();
    let start = hit + forward * reach;
    scene
        .query_excluding(start, -forward, reach, &others)
        .hit_point
        .unwrap_or(hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightKind;
    use crate::scene::{Primitive, PrimitiveScene};

    fn camera() -> CameraPose {
        CameraPose::looking_at(Vec3::new(1.0, 3.0, 12.0), Vec3::new(0.0, 1.0, 0.0))
    }

    fn light() -> LightEntity {
        LightEntity::new("key", LightKind::Spot)
            .with_transform(LightTransform::looking_at(Vec3::new(3.0, 4.0, 2.0), Vec3::new(0.5, 0.5, 0.0)))
            .with_pivot(Vec3::new(0.5, 0.5, 0.0))
    }

    fn all_planes() -> Vec<FlipPlane> {
        vec![
            FlipPlane::CameraHorizontal,
            FlipPlane::CameraVertical,
            FlipPlane::CameraDepth,
            FlipPlane::AcrossPivot,
            FlipPlane::Symmetry(Plane { point: Vec3::new(0.0, 0.0, -1.0), normal: Vec3::new(1.0, 0.0, 1.0) }),
            FlipPlane::HalfTurn,
        ]
    }

    #[test]
    fn test_flip_is_involution_for_every_plane() {
        let camera = camera();
        let original = light();
        for plane in all_planes() {
            let once = compute(&original, &camera, &plane);
            assert!(once.valid, "{} flip should be valid", plane.name());
            let mut flipped = original.clone();
            once.apply_to(&mut flipped);

            let twice = compute(&flipped, &camera, &plane);
            assert!((twice.transform.position - original.transform.position).length() < 1e-4, "{}", plane.name());
            assert!(twice.transform.rotation.dot(original.transform.rotation).abs() > 1.0 - 1e-5, "{}", plane.name());
            assert!((twice.pivot.unwrap() - original.pivot.unwrap()).length() < 1e-4, "{}", plane.name());
        }
    }

    #[test]
    fn test_horizontal_flip_mirrors_forward() {
        let camera = CameraPose::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let light = LightEntity::new("key", LightKind::Spot)
            .with_transform(LightTransform::looking_at(Vec3::new(2.0, 1.0, 0.0), Vec3::ZERO))
            .with_pivot(Vec3::ZERO);
        let result = compute(&light, &camera, &FlipPlane::CameraHorizontal);
        assert!((result.transform.position - Vec3::new(-2.0, 1.0, 0.0)).length() < 1e-5);
        let expected = (Vec3::ZERO - Vec3::new(-2.0, 1.0, 0.0)).normalize();
        assert!((result.transform.forward() - expected).length() < 1e-5);
        assert!(result.transform.up().y > 0.0);
    }

    #[test]
    fn test_across_pivot_lands_opposite() {
        let result = compute(&light(), &camera(), &FlipPlane::AcrossPivot);
        let pivot = Vec3::new(0.5, 0.5, 0.0);
        let expected = pivot - (Vec3::new(3.0, 4.0, 2.0) - pivot);
        assert!((result.transform.position - expected).length() < 1e-4);
        assert!((result.pivot.unwrap() - pivot).length() < 1e-5);
    }

    #[test]
    fn test_degenerate_planes() {
        let camera = camera();
        let no_pivot = LightEntity::new("fill", LightKind::Point);
        let result = compute(&no_pivot, &camera, &FlipPlane::AcrossPivot);
        assert_eq!(result.reason, Some(FallbackReason::MissingPivot));

        let on_pivot = LightEntity::new("fill", LightKind::Point).with_pivot(Vec3::ZERO);
        let result = compute(&on_pivot, &camera, &FlipPlane::AcrossPivot);
        assert_eq!(result.reason, Some(FallbackReason::DegeneratePlane));
        assert_eq!(result.transform, on_pivot.transform);

        let zero = FlipPlane::Symmetry(Plane { point: Vec3::ZERO, normal: Vec3::ZERO });
        assert!(!compute(&light(), &camera, &zero).valid);
    }

    #[test]
    fn test_half_turn_around_pivot() {
        let result = compute(&light(), &camera(), &FlipPlane::HalfTurn);
        let pivot = Vec3::new(0.5, 0.5, 0.0);
        assert!((result.transform.position - Vec3::new(-2.0, 4.0, -2.0)).length() < 1e-4);
        assert_eq!(result.pivot, Some(pivot));
        let aim = (pivot - result.transform.position).normalize();
        assert!((result.transform.forward() - aim).length() < 1e-4);

        let no_pivot = LightEntity::new("fill", LightKind::Point);
        assert_eq!(compute(&no_pivot, &camera(), &FlipPlane::HalfTurn).reason, Some(FallbackReason::MissingPivot));
    }

    /// Camera on +Z looking at a unit sphere, with a back wall at z = -5.
    fn axis_scene() -> (PrimitiveScene, CameraPose) {
        let scene = PrimitiveScene::new()
            .with("ball", Primitive::Sphere { center: Vec3::ZERO, radius: 1.0 })
            .with("wall", Primitive::Aabb { min: Vec3::new(-5.0, -5.0, -6.0), max: Vec3::new(5.0, 5.0, -5.0) });
        (scene, CameraPose::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO))
    }

    #[test]
    fn test_camera_axis_front_and_along() {
        let (scene, camera) = axis_scene();
        let light = light();

        let front = place_on_camera_axis(&light, &camera, &scene, CameraAxisPlacement::Front, 100.0);
        assert!(front.valid);
        assert!((front.transform.position - Vec3::new(0.0, 0.0, -1.5)).length() < 1e-4);
        assert!((front.pivot.unwrap() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
        assert!((front.transform.forward() - Vec3::Z).length() < 1e-4);

        let along = place_on_camera_axis(&light, &camera, &scene, CameraAxisPlacement::Along, 100.0);
        assert_eq!(along.transform.position, front.transform.position);
        assert!((along.transform.forward() - Vec3::NEG_Z).length() < 1e-4);
        assert!((along.pivot.unwrap() - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-4);
    }

    #[test]
    fn test_camera_axis_back_and_miss() {
        let (scene, camera) = axis_scene();
        let back = place_on_camera_axis(&light(), &camera, &scene, CameraAxisPlacement::Back, 100.0);
        assert_eq!(back.transform.position, camera.position);
        assert!((back.transform.forward() - camera.forward()).length() < 1e-4);
        assert!((back.pivot.unwrap() - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-4);

        let empty = PrimitiveScene::new();
        let miss = place_on_camera_axis(&light(), &camera, &empty, CameraAxisPlacement::Front, 100.0);
        assert_eq!(miss.reason, Some(FallbackReason::NoHit));
        assert_eq!(miss.transform, light().transform);
    }
}

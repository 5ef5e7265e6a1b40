//! # Smart Light Suggestions
//!
//! Deterministic starting values for a new light aimed at a surface: how far
//! away to put it, how bright to make it, and how large its emitter should
//! be, given the light kind and the size of the scene.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::light::{LightKind, LightParams, LightTransform};
use crate::scene::{ObjectId, SceneQuery};

/// Coarse scene measurements the suggestions depend on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneAnalysis {
    pub object_count: usize,
    /// Diagonal of the whole scene's bounds (meters)
    pub scene_size: f32,
    /// Diagonal of the hit object's bounds (meters), 0 when unknown
    pub object_size: f32,
}

impl Default for SceneAnalysis {
    fn default() -> Self {
        Self { object_count: 0, scene_size: 10.0, object_size: 1.0 }
    }
}

/// Measure `scene`, focusing on `hit_object` when given.
pub fn analyze(scene: &dyn SceneQuery, hit_object: Option<ObjectId>) -> SceneAnalysis {
    let objects = scene.objects();
    let object_size = hit_object
        .map(|id| scene.bounding_radius(&[id]) * 2.0)
        .unwrap_or(0.0);
    SceneAnalysis {
        object_count: objects.len(),
        scene_size: scene.bounding_radius(&objects) * 2.0,
        object_size,
    }
}

/// Preferred light-to-surface distance per kind.
pub fn default_distance(kind: LightKind) -> f32 {
    match kind {
        LightKind::Sun => 20.0,
        LightKind::Point => 5.0,
        LightKind::Spot => 8.0,
        LightKind::Area => 6.0,
    }
}

fn base_power(kind: LightKind) -> f32 {
    match kind {
        LightKind::Point => 1000.0,
        LightKind::Spot => 1500.0,
        LightKind::Area => 2000.0,
        LightKind::Sun => 5000.0,
    }
}

/// Power scaled by inverse-square distance (relative to 5 m) and scene size
/// (relative to 20 m).
pub fn optimal_power(kind: LightKind, distance: f32, scene_size: f32) -> f32 {
    let distance_multiplier = ((distance / 5.0).powi(2)).max(0.1);
    let scene_multiplier = (scene_size / 20.0).max(0.5);
    base_power(kind) * distance_multiplier * scene_multiplier
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSuggestion {
    pub transform: LightTransform,
    pub distance: f32,
    pub params: LightParams,
    /// Second edge for rectangular area lights
    pub size_y: Option<f32>,
}

/// Place a light of `kind` off the surface at `hit_point` along `normal`.
/// A zero normal falls back to straight up.
pub fn suggest(kind: LightKind, hit_point: Vec3, normal: Vec3, analysis: &SceneAnalysis) -> LightSuggestion {
    let normal = normal.try_normalize().unwrap_or(Vec3::Y);
    let distance = default_distance(kind);
    let position = hit_point + normal * distance;

    let mut params = LightParams::for_kind(kind);
    params.power = optimal_power(kind, distance, analysis.scene_size);
    let mut size_y = None;

    match kind {
        LightKind::Area => {
            let base = (analysis.object_size * 0.8).max(0.5);
            params.size = base * (distance / 5.0);
            size_y = Some(base * 1.2 * (distance / 5.0));
        }
        LightKind::Spot => {
            params.spread = 45.0;
            params.blend = 0.15;
            params.size = 0.1;
        }
        LightKind::Point => params.size = 0.1,
        LightKind::Sun => params.spread = 0.5,
    }

    LightSuggestion {
        transform: LightTransform::looking_at(position, hit_point),
        distance,
        params,
        size_y,
    }
}

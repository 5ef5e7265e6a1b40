//! # Scene Files
//!
//! TOML description of a test scene: view camera, viewport, primitive
//! geometry and the lights to edit.
//!
//! ```toml
//! [camera]
//! position = [0.0, 4.0, 10.0]
//! target = [0.0, 0.0, 0.0]
//!
//! [viewport]
//! width = 1280.0
//! height = 720.0
//!
//! [[objects]]
//! name = "floor"
//! shape = "quad"
//! corner = [-10.0, 0.0, 10.0]
//! edge_u = [20.0, 0.0, 0.0]
//! edge_v = [0.0, 0.0, -20.0]
//!
//! [[lights]]
//! id = "6f1c1f2e-8a4b-4c5d-9e0f-112233445566"
//! name = "key"
//! kind = "spot"
//! position = [3.0, 4.0, 3.0]
//! target = [0.0, 0.0, 0.0]
//!
//! # Shot cameras, for assignment links in the overlay
//! [[cameras]]
//! name = "Camera.001"
//! position = [0.0, 1.5, 8.0]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use serde::Deserialize;

use lightrig_core::camera::{CameraId, CameraPose, Viewport};
use lightrig_core::light::{LightEntity, LightId, LightKind, LightParams, LightTransform};
use lightrig_core::scene::{Primitive, PrimitiveScene};
use lightrig_core::store::LightScene;

#[derive(Debug, Deserialize)]
struct SceneFile {
    #[serde(default)]
    camera: CameraSpec,
    #[serde(default)]
    viewport: Viewport,
    #[serde(default)]
    objects: Vec<ObjectSpec>,
    #[serde(default)]
    lights: Vec<LightSpec>,
    #[serde(default)]
    cameras: Vec<ShotCameraSpec>,
}

#[derive(Debug, Deserialize)]
struct ShotCameraSpec {
    name: CameraId,
    position: Vec3,
}

#[derive(Debug, Deserialize)]
struct CameraSpec {
    position: Vec3,
    #[serde(default)]
    target: Vec3,
    #[serde(default = "default_fov")]
    fov_degrees: f32,
}

fn default_fov() -> f32 { 50.0 }

impl Default for CameraSpec {
    fn default() -> Self {
        Self { position: Vec3::new(0.0, 0.0, 10.0), target: Vec3::ZERO, fov_degrees: default_fov() }
    }
}

#[derive(Debug, Deserialize)]
struct ObjectSpec {
    name: String,
    #[serde(flatten)]
    primitive: Primitive,
}

#[derive(Debug, Deserialize)]
struct LightSpec {
    /// Stable id so assignment files stay valid across runs
    #[serde(default)]
    id: Option<LightId>,
    name: String,
    kind: LightKind,
    position: Vec3,
    #[serde(default)]
    target: Option<Vec3>,
    #[serde(default)]
    pivot: Option<Vec3>,
    #[serde(default)]
    camera: Option<CameraId>,
    #[serde(default)]
    params: Option<LightParams>,
}

impl LightSpec {
    fn into_entity(self) -> LightEntity {
        let mut light = LightEntity::new(self.name, self.kind);
        if let Some(id) = self.id {
            light.id = id;
        }
        light.transform = match self.target {
            Some(target) => LightTransform::looking_at(self.position, target),
            None => LightTransform { position: self.position, ..LightTransform::default() },
        };
        light.pivot = self.pivot.or(self.target);
        light.assigned_camera = self.camera;
        if let Some(params) = self.params {
            light.params = params;
        }
        light
    }
}

/// Everything a command needs from a scene file.
pub struct LoadedScene {
    pub scene: PrimitiveScene,
    pub camera: CameraPose,
    pub viewport: Viewport,
    pub lights: LightScene,
    /// Shot cameras and where they stand
    pub cameras: Vec<(CameraId, Vec3)>,
}

impl LoadedScene {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: SceneFile = toml::from_str(content).context("Invalid scene file")?;

        let mut camera = CameraPose::looking_at(file.camera.position, file.camera.target);
        camera.fov_degrees = file.camera.fov_degrees;

        let mut scene = PrimitiveScene::new();
        for object in file.objects {
            scene.add(object.name, object.primitive);
        }

        let mut lights = LightScene::new();
        for spec in file.lights {
            lights.insert(spec.into_entity());
        }

        let cameras = file.cameras.into_iter().map(|c| (c.name, c.position)).collect();

        Ok(Self { scene, camera, viewport: file.viewport, lights, cameras })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read scene {}", path.display()))?;
        let loaded = Self::from_toml_str(&content).with_context(|| format!("Failed to load scene {}", path.display()))?;
        tracing::info!(
            "Loaded scene {:?}: {} objects, {} lights",
            path,
            loaded.scene.objects.len(),
            loaded.lights.len()
        );
        Ok(loaded)
    }

    /// Light by name, or by id string.
    pub fn resolve_light(&self, key: &str) -> Result<LightId> {
        if let Some(light) = self.lights.find_by_name(key) {
            return Ok(light.id);
        }
        self.lights
            .iter()
            .find(|light| light.id.to_string() == key)
            .map(|light| light.id)
            .with_context(|| format!("No light named or identified by '{key}'"))
    }
}

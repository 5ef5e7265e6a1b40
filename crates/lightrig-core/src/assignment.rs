//! # Camera-Light Assignment
//!
//! Which lights belong to which camera shot.
//!
//! ## Table of Contents
//! 1. CameraLightStore - trait the session commits through
//! 2. AssignmentMap - in-memory reference store with JSON persistence
//! 3. Visibility - show assigned lights, hide the rest, on camera switch
//! 4. Organized naming - `G_<name>` / `C_<NN>_<name>` light names

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::camera::CameraId;
use crate::error::{Result, RigError};
use crate::light::LightId;

// ============================================================================
// 1. CameraLightStore
// ============================================================================

pub trait CameraLightStore {
    fn lights_for(&self, camera: &CameraId) -> BTreeSet<LightId>;
    fn assign(&mut self, camera: &CameraId, light: LightId);
    fn unassign(&mut self, camera: &CameraId, light: LightId);
}

// ============================================================================
// 2. AssignmentMap
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(bevy_ecs::prelude::Resource))]
pub struct AssignmentMap {
    #[serde(default)]
    assignments: BTreeMap<CameraId, BTreeSet<LightId>>,
    /// Camera whose visibility was last applied; not persisted.
    #[serde(skip)]
    active_camera: Option<CameraId>,
}

impl AssignmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cameras(&self) -> impl Iterator<Item = &CameraId> {
        self.assignments.keys()
    }

    /// Every camera the light is assigned to.
    pub fn cameras_of(&self, light: LightId) -> Vec<CameraId> {
        self.assignments
            .iter()
            .filter(|(_, lights)| lights.contains(&light))
            .map(|(camera, _)| camera.clone())
            .collect()
    }

    /// Drop a light from every camera (e.g. after it was deleted).
    pub fn forget_light(&mut self, light: LightId) {
        for lights in self.assignments.values_mut() {
            lights.remove(&light);
        }
        self.assignments.retain(|_, lights| !lights.is_empty());
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file. A missing file is an empty map.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No assignment file at {:?}, starting empty", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| RigError::Assignment(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RigError::Assignment(e.to_string()))?;
        }
        fs::write(path, self.to_json()?).map_err(|e| RigError::Assignment(e.to_string()))?;
        info!("Saved camera-light assignments to {:?}", path);
        Ok(())
    }

    pub fn active_camera(&self) -> Option<&CameraId> {
        self.active_camera.as_ref()
    }

    /// Switch the active camera. Returns the visibility to apply, or `None`
    /// when the camera did not change.
    pub fn activate(&mut self, camera: &CameraId, all_lights: &[LightId]) -> Option<LightVisibility> {
        if self.active_camera.as_ref() == Some(camera) {
            return None;
        }
        info!("Active camera changed: {:?} -> {}", self.active_camera, camera);
        self.active_camera = Some(camera.clone());
        Some(visible_lights(&*self, camera, all_lights))
    }
}

impl CameraLightStore for AssignmentMap {
    fn lights_for(&self, camera: &CameraId) -> BTreeSet<LightId> {
        self.assignments.get(camera).cloned().unwrap_or_default()
    }

    fn assign(&mut self, camera: &CameraId, light: LightId) {
        if self.assignments.entry(camera.clone()).or_default().insert(light) {
            debug!("Assigned light {} to camera {}", light, camera);
        }
    }

    fn unassign(&mut self, camera: &CameraId, light: LightId) {
        if let Some(lights) = self.assignments.get_mut(camera) {
            lights.remove(&light);
            if lights.is_empty() {
                self.assignments.remove(camera);
            }
        }
    }
}

// ============================================================================
// 3. Visibility
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightVisibility {
    pub shown: Vec<LightId>,
    pub hidden: Vec<LightId>,
}

/// Split `all_lights` into those assigned to `camera` and the rest.
pub fn visible_lights(store: &dyn CameraLightStore, camera: &CameraId, all_lights: &[LightId]) -> LightVisibility {
    let assigned = store.lights_for(camera);
    let (shown, hidden): (Vec<LightId>, Vec<LightId>) = all_lights.iter().copied().partition(|id| assigned.contains(id));
    LightVisibility { shown, hidden }
}

// ============================================================================
// 4. Organized naming
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMode {
    /// Light belongs to every shot
    Scene,
    /// Light belongs to one camera
    Camera,
}

/// Two-digit shot number of a camera name.
///
/// `Camera.001` → `01`, `Camera` → `00`, otherwise the first run of digits
/// zero-padded to two places, or `00` when there is none.
pub fn camera_number(camera: &str) -> String {
    if let Some((_, suffix)) = camera.rsplit_once('.') {
        if suffix.len() == 3 && suffix.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = suffix.parse::<u32>() {
                return format!("{n:02}");
            }
        }
    }
    if camera == "Camera" {
        return "00".to_string();
    }
    let digits: String = camera
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        "00".to_string()
    } else {
        format!("{digits:0>2}")
    }
}

/// Strip a leading `G_` or `C_<digits>` organization prefix.
fn strip_prefix(name: &str) -> &str {
    if let Some(rest) = name.strip_prefix("G_") {
        return rest.trim_start_matches('_');
    }
    if let Some(rest) = name.strip_prefix("C_") {
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits > 0 {
            return rest[digits..].trim_start_matches('_');
        }
    }
    name
}

/// Name a light by how it is assigned: `G_<name>` for scene-wide lights,
/// `C_<NN>_<name>` for lights tied to a camera (`00` when none is given).
pub fn organized_light_name(base: &str, mode: AssignmentMode, camera: Option<&CameraId>) -> String {
    let clean = strip_prefix(base);
    match mode {
        AssignmentMode::Scene => format!("G_{clean}"),
        AssignmentMode::Camera => {
            let number = camera.map(|c| camera_number(c.as_str())).unwrap_or_else(|| "00".to_string());
            format!("C_{number}_{clean}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_and_unassign() {
        let mut map = AssignmentMap::new();
        let cam = CameraId::from("Camera.001");
        let (a, b) = (LightId::new(), LightId::new());
        map.assign(&cam, a);
        map.assign(&cam, b);
        map.assign(&cam, a);
        assert_eq!(map.lights_for(&cam).len(), 2);
        map.unassign(&cam, a);
        assert_eq!(map.lights_for(&cam), BTreeSet::from([b]));
        map.unassign(&cam, b);
        assert_eq!(map.cameras().count(), 0);
    }

    #[test]
    fn test_json_round_trip() {
        let mut map = AssignmentMap::new();
        let light = LightId::new();
        map.assign(&CameraId::from("Camera"), light);
        map.assign(&CameraId::from("Camera.002"), light);
        let restored = AssignmentMap::from_json(&map.to_json().unwrap()).unwrap();
        assert_eq!(restored, map);
        assert_eq!(restored.cameras_of(light).len(), 2);
    }

    #[test]
    fn test_save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assignments.json");
        assert_eq!(AssignmentMap::load(&path).unwrap(), AssignmentMap::new());

        let mut map = AssignmentMap::new();
        let light = LightId::new();
        map.assign(&CameraId::from("Camera.003"), light);
        map.save(&path).unwrap();

        let loaded = AssignmentMap::load(&path).unwrap();
        assert_eq!(loaded, map);
        assert!(loaded.lights_for(&CameraId::from("Camera.003")).contains(&light));
    }

    #[test]
    fn test_visibility_and_camera_switch() {
        let mut map = AssignmentMap::new();
        let cam = CameraId::from("Camera");
        let (a, b, c) = (LightId::new(), LightId::new(), LightId::new());
        map.assign(&cam, b);
        let all = [a, b, c];

        let vis = map.activate(&cam, &all).unwrap();
        assert_eq!(vis.shown, vec![b]);
        assert_eq!(vis.hidden, vec![a, c]);
        assert!(map.activate(&cam, &all).is_none());
    }

    #[test]
    fn test_camera_number() {
        assert_eq!(camera_number("Camera.001"), "01");
        assert_eq!(camera_number("Camera.012"), "12");
        assert_eq!(camera_number("Camera"), "00");
        assert_eq!(camera_number("Shot7_wide"), "07");
        assert_eq!(camera_number("Closeup"), "00");
    }

    #[test]
    fn test_organized_light_name() {
        let cam = CameraId::from("Camera.003");
        assert_eq!(organized_light_name("Key", AssignmentMode::Scene, None), "G_Key");
        assert_eq!(organized_light_name("Key", AssignmentMode::Camera, Some(&cam)), "C_03_Key");
        assert_eq!(organized_light_name("G_Key", AssignmentMode::Camera, Some(&cam)), "C_03_Key");
        assert_eq!(organized_light_name("C_01_Rim", AssignmentMode::Scene, None), "G_Rim");
        assert_eq!(organized_light_name("Fill", AssignmentMode::Camera, None), "C_00_Fill");
        assert_eq!(organized_light_name("Cube_Light", AssignmentMode::Scene, None), "G_Cube_Light");
    }
}

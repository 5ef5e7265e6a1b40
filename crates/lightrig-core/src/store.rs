//! # Light Store
//!
//! The narrow slice of the host scene graph the engine touches: read a light
//! at session start, check it still exists, write it back on commit.

use std::collections::BTreeMap;

use crate::error::{Result, RigError};
use crate::light::{LightEntity, LightId};

pub trait LightStore {
    fn get(&self, id: LightId) -> Option<LightEntity>;

    fn contains(&self, id: LightId) -> bool {
        self.get(id).is_some()
    }

    /// Replace the stored light with the same id. Fails when it is gone.
    fn write(&mut self, light: &LightEntity) -> Result<()>;
}

/// In-memory light collection.
#[derive(Debug, Clone, Default)]
pub struct LightScene {
    lights: BTreeMap<LightId, LightEntity>,
    writes: usize,
}

impl LightScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, light: LightEntity) -> LightId {
        let id = light.id;
        self.lights.insert(id, light);
        id
    }

    pub fn remove(&mut self, id: LightId) -> Option<LightEntity> {
        self.lights.remove(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&LightEntity> {
        self.lights.values().find(|light| light.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LightEntity> {
        self.lights.values()
    }

    pub fn ids(&self) -> Vec<LightId> {
        self.lights.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Number of successful `write` calls.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl LightStore for LightScene {
    fn get(&self, id: LightId) -> Option<LightEntity> {
        self.lights.get(&id).cloned()
    }

    fn contains(&self, id: LightId) -> bool {
        self.lights.contains_key(&id)
    }

    fn write(&mut self, light: &LightEntity) -> Result<()> {
        let slot = self.lights.get_mut(&light.id).ok_or(RigError::LightNotFound(light.id))?;
        *slot = light.clone();
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightKind;

    #[test]
    fn test_write_requires_existing_light() {
        let mut scene = LightScene::new();
        let light = LightEntity::new("key", LightKind::Spot);
        assert_eq!(scene.write(&light), Err(RigError::LightNotFound(light.id)));

        let id = scene.insert(light.clone());
        let mut edited = light;
        edited.params.power = 42.0;
        scene.write(&edited).unwrap();
        assert_eq!(scene.get(id).unwrap().params.power, 42.0);
        assert_eq!(scene.write_count(), 1);
    }

    #[test]
    fn test_find_and_remove() {
        let mut scene = LightScene::new();
        let id = scene.insert(LightEntity::new("rim", LightKind::Area));
        assert_eq!(scene.find_by_name("rim").map(|l| l.id), Some(id));
        assert!(scene.remove(id).is_some());
        assert!(!scene.contains(id));
        assert!(scene.is_empty());
    }
}

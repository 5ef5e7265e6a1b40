//! # Session Registry
//!
//! At most one live `ModalSession` per light. Starting a session on a light
//! that already has one finalizes the old session first: it commits when it
//! has something worth keeping, otherwise it cancels.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{Result, RigError};
use crate::input::InputEvent;
use crate::light::LightId;
use crate::positioning::PositioningMode;
use crate::session::{ModalSession, SessionContext, SessionState};

#[derive(Debug, Default)]
#[cfg_attr(feature = "bevy", derive(bevy_ecs::prelude::Resource))]
pub struct SessionRegistry {
    sessions: HashMap<LightId, ModalSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session on `light`, finalizing any session it already has.
    pub fn begin(
        &mut self,
        light: LightId,
        mode: PositioningMode,
        ctx: &mut SessionContext<'_>,
    ) -> Result<&mut ModalSession> {
        if self.sessions.contains_key(&light) {
            self.finalize(light, ctx)?;
        }
        let session = ModalSession::begin(light, mode, ctx)?;
        Ok(self.sessions.entry(light).or_insert(session))
    }

    /// Register an already started session (e.g. one built with an
    /// assignment target), finalizing any existing one for the same light.
    pub fn insert(&mut self, session: ModalSession, ctx: &mut SessionContext<'_>) -> Result<&mut ModalSession> {
        let light = session.light_id();
        if self.sessions.contains_key(&light) {
            self.finalize(light, ctx)?;
        }
        Ok(self.sessions.entry(light).or_insert(session))
    }

    pub fn get(&self, light: LightId) -> Option<&ModalSession> {
        self.sessions.get(&light)
    }

    pub fn get_mut(&mut self, light: LightId) -> Option<&mut ModalSession> {
        self.sessions.get_mut(&light)
    }

    /// Route an event to the light's session. Sessions that reach a terminal
    /// state are dropped from the registry.
    pub fn handle_event(
        &mut self,
        light: LightId,
        event: InputEvent,
        ctx: &mut SessionContext<'_>,
    ) -> Result<SessionState> {
        let session = self.sessions.get_mut(&light).ok_or(RigError::NoSession(light))?;
        let outcome = session.handle_event(event, ctx);
        if session.state().is_terminal() {
            debug!("Session for light {} finished as {:?}", light, session.state());
            self.sessions.remove(&light);
        }
        outcome
    }

    /// Commit a confirmable session, cancel any other, and remove it.
    pub fn finalize(&mut self, light: LightId, ctx: &mut SessionContext<'_>) -> Result<SessionState> {
        let mut session = self.sessions.remove(&light).ok_or(RigError::NoSession(light))?;
        let state = if session.is_confirmable() {
            session.confirm(ctx)?
        } else {
            session.cancel(ctx)?
        };
        info!("Finalized previous session on light {} as {:?}", light, state);
        Ok(state)
    }

    /// Cancel every live session.
    pub fn clear(&mut self, ctx: &mut SessionContext<'_>) {
        for (light, mut session) in self.sessions.drain() {
            if let Err(e) = session.cancel(ctx) {
                debug!("Cancelling session for light {}: {}", light, e);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::AssignmentMap;
    use crate::camera::{CameraPose, Viewport};
    use crate::config::RigConfig;
    use crate::light::{LightEntity, LightKind, LightTransform};
    use crate::scene::{Primitive, PrimitiveScene};
    use crate::store::{LightScene, LightStore};
    use glam::Vec3;

    fn setup() -> (PrimitiveScene, CameraPose, Viewport, LightScene, AssignmentMap, RigConfig, LightId) {
        let scene = PrimitiveScene::new().with("ball", Primitive::Sphere { center: Vec3::ZERO, radius: 1.0 });
        let mut lights = LightScene::new();
        let id = lights.insert(
            LightEntity::new("rim", LightKind::Area)
                .with_transform(LightTransform::looking_at(Vec3::new(0.0, 3.0, 3.0), Vec3::ZERO)),
        );
        (
            scene,
            CameraPose::looking_at(Vec3::new(0.0, 0.0, 8.0), Vec3::ZERO),
            Viewport::default(),
            lights,
            AssignmentMap::new(),
            RigConfig::default(),
            id,
        )
    }

    #[test]
    fn test_one_session_per_light() {
        let (scene, camera, viewport, mut lights, mut assignments, config, id) = setup();
        let mut ctx = SessionContext::new(&scene, &camera, &viewport, &mut lights, &mut assignments, &config);
        let mut registry = SessionRegistry::new();

        let first = registry.begin(id, PositioningMode::Normal, &mut ctx).unwrap().id();
        let second = registry.begin(id, PositioningMode::Orbit, &mut ctx).unwrap().id();
        assert_ne!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(id).unwrap().mode(), &PositioningMode::Orbit);
    }

    #[test]
    fn test_replaced_session_commits_when_confirmable() {
        let (scene, camera, viewport, mut lights, mut assignments, config, id) = setup();
        let before = lights.get(id).unwrap();
        let moved = {
            let mut ctx = SessionContext::new(&scene, &camera, &viewport, &mut lights, &mut assignments, &config);
            let mut registry = SessionRegistry::new();
            registry.begin(id, PositioningMode::Normal, &mut ctx).unwrap();
            registry
                .handle_event(id, InputEvent::pointer(640.0, 360.0, 0.0), &mut ctx)
                .unwrap();
            let moved = registry.get(id).unwrap().working().transform;
            registry.begin(id, PositioningMode::Free, &mut ctx).unwrap();
            moved
        };
        let after = lights.get(id).unwrap();
        assert_ne!(after.transform, before.transform);
        assert_eq!(after.transform, moved);
    }

    #[test]
    fn test_replaced_session_cancels_without_writing() {
        let (scene, camera, viewport, mut lights, mut assignments, config, id) = setup();
        let before = lights.get(id).unwrap();
        {
            let mut ctx = SessionContext::new(&scene, &camera, &viewport, &mut lights, &mut assignments, &config);
            let mut registry = SessionRegistry::new();
            registry.begin(id, PositioningMode::Normal, &mut ctx).unwrap();
            assert!(!registry.get(id).unwrap().is_confirmable());
            registry.begin(id, PositioningMode::Orbit, &mut ctx).unwrap();
            assert_eq!(registry.len(), 1);
        }
        assert_eq!(lights.get(id).unwrap(), before);
        assert_eq!(lights.write_count(), 0);
    }

    #[test]
    fn test_terminal_sessions_are_removed() {
        let (scene, camera, viewport, mut lights, mut assignments, config, id) = setup();
        let mut ctx = SessionContext::new(&scene, &camera, &viewport, &mut lights, &mut assignments, &config);
        let mut registry = SessionRegistry::new();
        registry.begin(id, PositioningMode::Normal, &mut ctx).unwrap();
        let state = registry.handle_event(id, InputEvent::Cancel, &mut ctx).unwrap();
        assert_eq!(state, SessionState::Cancelled);
        assert!(registry.is_empty());
        assert_eq!(
            registry.handle_event(id, InputEvent::Confirm, &mut ctx).unwrap_err(),
            RigError::NoSession(id)
        );
    }

    #[test]
    fn test_clear_cancels_all() {
        let (scene, camera, viewport, mut lights, mut assignments, config, id) = setup();
        let other = lights.insert(LightEntity::new("fill", LightKind::Point));
        let mut ctx = SessionContext::new(&scene, &camera, &viewport, &mut lights, &mut assignments, &config);
        let mut registry = SessionRegistry::new();
        registry.begin(id, PositioningMode::Normal, &mut ctx).unwrap();
        registry.begin(other, PositioningMode::Highlight, &mut ctx).unwrap();
        registry
            .handle_event(id, InputEvent::pointer(640.0, 360.0, 0.0), &mut ctx)
            .unwrap();
        registry.clear(&mut ctx);
        assert!(registry.is_empty());
        drop(ctx);
        assert_eq!(lights.write_count(), 0);
    }
}

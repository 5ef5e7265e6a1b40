//! # Modal Session Controller
//!
//! One live editing session on one light, driven synchronously by input
//! events.
//!
//! ## Lifecycle
//! `Init → Running → {Confirmed, Cancelled}`
//!
//! - `begin` captures the light (transform, params, pivot) as the immutable
//!   original and works on a copy from then on.
//! - While Running the host's `LightStore` is never written.
//! - `Confirm` writes the working copy back (and updates camera assignment).
//! - `Cancel` drops the working copy. The store is not written, so edits
//!   the host made to the light in the meantime survive.
//! - Every event first checks that the light still exists. A vanished light
//!   cancels the session; a Confirm on a vanished light also returns
//!   `RigError::CommitFailed`.
//! - Events after a terminal state return `RigError::SessionFinished`.
//!
//! ## Routing
//! - Pointer moves raycast the scene (when the mode needs it) and run the
//!   active positioning mode. With a control parameter set, horizontal
//!   pointer motion drives the Smart Control Translator instead.
//! - Wheel ticks drive the control parameter, Distance by default.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assignment::CameraLightStore;
use crate::camera::{viewport_ray, CameraId, CameraPose, Viewport};
use crate::config::RigConfig;
use crate::control::{ControlChange, ControlParameter, ParamRange, SmartControl};
use crate::error::{Result, RigError};
use crate::input::{InputEvent, Modifiers};
use crate::light::{LightEntity, LightId, LightTransform};
use crate::positioning::{self, movement, orbit, ModeContext, OrbitState, PositioningMode, PositioningResult};
use crate::scene::{SceneQuery, SceneSnapshot};
use crate::store::LightStore;

// ============================================================================
// State + Context
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Init,
    Running,
    Confirmed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Confirmed | SessionState::Cancelled)
    }
}

/// Everything outside the session that an event may touch.
pub struct SessionContext<'a> {
    pub scene: &'a dyn SceneQuery,
    pub camera: &'a CameraPose,
    pub viewport: &'a Viewport,
    pub lights: &'a mut dyn LightStore,
    pub assignments: &'a mut dyn CameraLightStore,
    pub config: &'a RigConfig,
}

impl<'a> SessionContext<'a> {
    pub fn new(
        scene: &'a dyn SceneQuery,
        camera: &'a CameraPose,
        viewport: &'a Viewport,
        lights: &'a mut dyn LightStore,
        assignments: &'a mut dyn CameraLightStore,
        config: &'a RigConfig,
    ) -> Self {
        Self { scene, camera, viewport, lights, assignments, config }
    }
}

// ============================================================================
// ModalSession
// ============================================================================

#[derive(Debug, Clone)]
pub struct ModalSession {
    id: Uuid,
    state: SessionState,
    mode: PositioningMode,
    light_id: LightId,
    /// Captured at begin; never modified
    original: LightEntity,
    working: LightEntity,
    modifiers: Modifiers,
    /// Parameter pointer drags drive; `None` routes them to positioning
    control: Option<ControlParameter>,
    smart: SmartControl,
    distance: f32,
    orbit: OrbitState,
    /// Free/Move plane anchor
    anchor: Vec3,
    /// Pivot when the Move drag started
    anchor_pivot: Vec3,
    last_pointer: Option<Vec2>,
    pointer_delta: Vec2,
    wheel_ticks: i32,
    last_snapshot: Option<SceneSnapshot>,
    last_result: Option<PositioningResult>,
    last_change: Option<ControlChange>,
    /// At least one valid result or control change was applied
    applied: bool,
    assign_to: Option<CameraId>,
}

impl ModalSession {
    /// Capture `light` and start a Running session in `mode`.
    pub fn begin(light: LightId, mode: PositioningMode, ctx: &SessionContext<'_>) -> Result<Self> {
        let original = ctx.lights.get(light).ok_or(RigError::LightNotFound(light))?;
        let position = original.transform.position;

        let distance = original
            .pivot
            .map(|pivot| position.distance(pivot))
            .filter(|d| *d > 0.0)
            .unwrap_or(ctx.config.positioning.default_distance);
        let center = orbit::resolve_center(&original, ctx.scene);
        let anchor_pivot = movement::start_pivot(&original, distance);

        let mut session = Self {
            id: Uuid::new_v4(),
            state: SessionState::Init,
            mode,
            light_id: light,
            working: original.clone(),
            original,
            modifiers: Modifiers::empty(),
            control: None,
            smart: SmartControl::new(ctx.config.control.clone()),
            distance: ParamRange::DISTANCE.clamp(distance),
            orbit: OrbitState::from_position(center, position),
            anchor: position,
            anchor_pivot,
            last_pointer: None,
            pointer_delta: Vec2::ZERO,
            wheel_ticks: 0,
            last_snapshot: None,
            last_result: None,
            last_change: None,
            applied: false,
            assign_to: None,
        };
        session.state = SessionState::Running;
        info!("Session {} started on light {} ({}) in {} mode", session.id, light, session.original.name, mode);

        if mode.is_instant() {
            session.run_instant(ctx.camera);
        }
        Ok(session)
    }

    /// Assign the light to `camera` when the session commits.
    pub fn with_assignment(mut self, camera: CameraId) -> Self {
        self.assign_to = Some(camera);
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> &PositioningMode {
        &self.mode
    }

    pub fn light_id(&self) -> LightId {
        self.light_id
    }

    pub fn original(&self) -> &LightEntity {
        &self.original
    }

    pub fn working(&self) -> &LightEntity {
        &self.working
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn control(&self) -> Option<ControlParameter> {
        self.control
    }

    /// Parameter the wheel currently drives.
    pub fn wheel_parameter(&self) -> ControlParameter {
        self.control.unwrap_or(ControlParameter::Distance)
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn orbit(&self) -> &OrbitState {
        &self.orbit
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn anchor_pivot(&self) -> Vec3 {
        self.anchor_pivot
    }

    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    pub fn wheel_ticks(&self) -> i32 {
        self.wheel_ticks
    }

    pub fn last_snapshot(&self) -> Option<&SceneSnapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn last_result(&self) -> Option<&PositioningResult> {
        self.last_result.as_ref()
    }

    pub fn last_change(&self) -> Option<&ControlChange> {
        self.last_change.as_ref()
    }

    pub fn assignment_target(&self) -> Option<&CameraId> {
        self.assign_to.as_ref()
    }

    /// Running and something worth keeping has been applied.
    pub fn is_confirmable(&self) -> bool {
        self.state == SessionState::Running && self.applied
    }

    /// Current value of a control parameter on the working copy.
    pub fn value_of(&self, parameter: ControlParameter) -> f32 {
        match parameter {
            ControlParameter::Distance => self.distance,
            other => other.read(&self.working.params).unwrap_or_default(),
        }
    }

    // ------------------------------------------------------------------------
    // Event handling
    // ------------------------------------------------------------------------

    pub fn handle_event(&mut self, event: InputEvent, ctx: &mut SessionContext<'_>) -> Result<SessionState> {
        if self.state.is_terminal() {
            return Err(RigError::SessionFinished { state: self.state });
        }

        if !ctx.lights.contains(self.light_id) {
            warn!("Light {} vanished during session {}, cancelling", self.light_id, self.id);
            self.state = SessionState::Cancelled;
            if event == InputEvent::Confirm {
                return Err(RigError::CommitFailed { light: self.light_id });
            }
            return Ok(self.state);
        }

        debug!(session = %self.id, event = event.name(), "Handling session event");

        match event {
            InputEvent::PointerMove { position, time } => self.on_pointer(position, time, ctx),
            InputEvent::Wheel { ticks } => self.on_wheel(ticks, ctx),
            InputEvent::ModifierDown { modifier } => {
                self.modifiers.insert(modifier.flag());
                self.rerun_last(ctx);
            }
            InputEvent::ModifierUp { modifier } => {
                self.modifiers.remove(modifier.flag());
                self.rerun_last(ctx);
            }
            InputEvent::SetMode { mode } => self.set_mode(mode, ctx),
            InputEvent::SetControl { parameter } => {
                debug!("Session {} control parameter -> {:?}", self.id, parameter);
                self.control = parameter;
                self.smart.reset_drag();
            }
            InputEvent::Confirm => return self.commit(ctx),
            InputEvent::Cancel => self.discard(),
        }
        Ok(self.state)
    }

    pub fn confirm(&mut self, ctx: &mut SessionContext<'_>) -> Result<SessionState> {
        self.handle_event(InputEvent::Confirm, ctx)
    }

    pub fn cancel(&mut self, ctx: &mut SessionContext<'_>) -> Result<SessionState> {
        self.handle_event(InputEvent::Cancel, ctx)
    }

    fn on_pointer(&mut self, position: Vec2, time: f64, ctx: &SessionContext<'_>) {
        let delta = self.last_pointer.map(|last| position - last).unwrap_or(Vec2::ZERO);
        self.last_pointer = Some(position);
        self.pointer_delta += delta;

        if let Some(parameter) = self.control {
            if delta.x != 0.0 {
                let current = self.value_of(parameter);
                let change = self.smart.drag(parameter, self.working.kind, current, delta.x, time, self.modifiers);
                match change {
                    Some(change) => self.apply_change(change, ctx),
                    None => debug!("{} is not available on {} lights", parameter, self.working.kind.name()),
                }
            }
            return;
        }

        if self.mode.is_instant() {
            return;
        }
        if self.mode == PositioningMode::Orbit {
            self.orbit.drag(delta, self.modifiers, &ctx.config.positioning);
        }

        let ray = viewport_ray(ctx.camera, ctx.viewport, position);
        let snapshot = if self.mode.needs_scene() {
            ctx.scene.cast(&ray, ctx.config.positioning.max_ray_distance)
        } else {
            SceneSnapshot::miss(ray)
        };
        self.last_snapshot = Some(snapshot);
        self.run_mode(&snapshot, ctx);
    }

    fn on_wheel(&mut self, ticks: i32, ctx: &SessionContext<'_>) {
        self.wheel_ticks += ticks;
        let parameter = self.wheel_parameter();
        let change = self.smart.wheel(parameter, self.working.kind, self.value_of(parameter), ticks, self.modifiers);
        match change {
            Some(change) => self.apply_change(change, ctx),
            None => debug!("{} is not available on {} lights", parameter, self.working.kind.name()),
        }
    }

    fn set_mode(&mut self, mode: PositioningMode, ctx: &SessionContext<'_>) {
        info!("Session {} mode {} -> {}", self.id, self.mode, mode);
        self.mode = mode;
        match mode {
            PositioningMode::Orbit => {
                let center = orbit::resolve_center(&self.working, ctx.scene);
                self.orbit = OrbitState::from_position(center, self.working.transform.position);
                if self.orbit.radius > 0.0 {
                    self.distance = ParamRange::DISTANCE.clamp(self.orbit.radius);
                }
            }
            PositioningMode::Move => {
                self.anchor = self.working.transform.position;
                self.anchor_pivot = movement::start_pivot(&self.working, self.distance);
            }
            PositioningMode::Flip { .. } => self.run_instant(ctx.camera),
            _ => {}
        }
    }

    /// Re-run the active mode against the last raycast (after a modifier or
    /// distance change).
    fn rerun_last(&mut self, ctx: &SessionContext<'_>) {
        let drives_other = self.control.is_some_and(|p| p != ControlParameter::Distance);
        if drives_other || self.mode.is_instant() || self.mode == PositioningMode::Orbit {
            return;
        }
        if let Some(snapshot) = self.last_snapshot {
            self.run_mode(&snapshot, ctx);
        }
    }

    fn run_mode(&mut self, snapshot: &SceneSnapshot, ctx: &SessionContext<'_>) {
        let mode_ctx = ModeContext {
            snapshot,
            light: &self.working,
            camera: ctx.camera,
            distance: self.distance,
            modifiers: self.modifiers,
            anchor: self.anchor,
            anchor_pivot: self.anchor_pivot,
            orbit: self.orbit,
        };
        let result = positioning::compute(&self.mode, &mode_ctx, &ctx.config.positioning);
        self.apply_result(result);
    }

    fn run_instant(&mut self, camera: &CameraPose) {
        if let PositioningMode::Flip { plane } = self.mode {
            let result = positioning::flip::compute(&self.working, camera, &plane);
            self.apply_result(result);
        }
    }

    fn apply_result(&mut self, result: PositioningResult) {
        if result.valid {
            self.applied = true;
        } else {
            let previous = self.last_result.and_then(|r| r.reason);
            if previous != result.reason {
                if let Some(reason) = result.reason {
                    warn!("{} fallback for light {}: {}", self.mode, self.light_id, reason);
                }
            }
        }
        result.apply_to(&mut self.working);
        self.last_result = Some(result);
    }

    fn apply_change(&mut self, change: ControlChange, ctx: &SessionContext<'_>) {
        let before = self.working.clone();
        let applied = self.applied;
        match change.parameter {
            ControlParameter::Distance => {
                self.distance = change.after;
                self.apply_distance(ctx);
            }
            parameter => parameter.write(&mut self.working.params, change.after),
        }
        // Only an edit that moved or retuned the light makes it confirmable.
        self.applied = applied || self.working != before;
        debug!(
            "{} {} -> {}",
            change.parameter,
            change.parameter.format(change.before),
            change.parameter.format(change.after)
        );
        self.last_change = Some(change);
    }

    /// Move the working light to the current distance from its subject.
    fn apply_distance(&mut self, ctx: &SessionContext<'_>) {
        if self.mode == PositioningMode::Orbit {
            self.orbit.set_radius(self.distance);
            let result = orbit::compute(&self.orbit, &self.working);
            self.apply_result(result);
            return;
        }

        // After a fallback the pivot belongs to an older hit, so redo the
        // fallback at the new distance instead.
        let fell_back = self.last_result.is_some_and(|r| !r.valid);
        if fell_back && self.mode.needs_scene() {
            self.rerun_last(ctx);
            return;
        }

        if let Some(pivot) = self.working.pivot {
            let offset = self.working.transform.position - pivot;
            let direction = offset.try_normalize().unwrap_or(-self.working.transform.forward());
            let position = pivot + direction * self.distance;
            let transform = LightTransform::looking_at(position, pivot);
            self.apply_result(PositioningResult::valid(transform, Some(pivot)));
            return;
        }

        self.rerun_last(ctx);
    }

    // ------------------------------------------------------------------------
    // Terminal transitions
    // ------------------------------------------------------------------------

    fn commit(&mut self, ctx: &mut SessionContext<'_>) -> Result<SessionState> {
        let previous_camera = self.original.assigned_camera.clone();
        if let Some(camera) = &self.assign_to {
            self.working.assigned_camera = Some(camera.clone());
        }

        if ctx.lights.write(&self.working).is_err() {
            self.state = SessionState::Cancelled;
            return Err(RigError::CommitFailed { light: self.light_id });
        }

        if let Some(camera) = &self.assign_to {
            if let Some(previous) = previous_camera.filter(|prev| prev != camera) {
                ctx.assignments.unassign(&previous, self.light_id);
            }
            ctx.assignments.assign(camera, self.light_id);
        }

        self.state = SessionState::Confirmed;
        info!(
            "Session {} committed light {} at {:?}",
            self.id, self.original.name, self.working.transform.position
        );
        Ok(self.state)
    }

    /// Cancellation never touches the store and cannot fail.
    fn discard(&mut self) {
        self.working = self.original.clone();
        self.state = SessionState::Cancelled;
        info!("Session {} cancelled, light {} left as stored", self.id, self.original.name);
    }
}

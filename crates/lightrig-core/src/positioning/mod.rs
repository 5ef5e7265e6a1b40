//! # Positioning Algorithms
//!
//! Pure functions that turn a scene snapshot, the current light, and the view
//! camera into a new light transform.
//!
//! ## Table of Contents
//! - `PositioningMode` - strategy tag selecting the algorithm
//! - `PositioningResult` / `FallbackReason` - algorithm output
//! - `ModeContext` - per-call inputs shared by all modes
//! - `compute` - dispatch
//!
//! ## Modes
//! - **Highlight** (`highlight`): reflect the view ray about the surface normal
//! - **Normal** (`normal`): back the light off along the surface normal
//! - **Target** (`target`): aim at a point, optionally at a set distance
//! - **Orbit** (`orbit`): spherical placement around a pivot
//! - **Free** (`free`): drag on a plane through the starting position
//! - **Move** (`movement`): drag the light and its pivot together
//! - **Flip** (`flip`): mirror across a camera- or pivot-relative plane, or
//!   half-turn about the pivot
//!
//! No mode ever fails. Misses and degenerate geometry produce a complete
//! fallback transform with `valid = false` and a reason for the overlay.

pub mod flip;
pub mod free;
pub mod highlight;
pub mod movement;
pub mod normal;
pub mod orbit;
pub mod target;

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::CameraPose;
use crate::config::PositioningConfig;
use crate::input::Modifiers;
use crate::light::{LightEntity, LightTransform};
use crate::scene::SceneSnapshot;

pub use flip::{place_on_camera_axis, CameraAxisPlacement, FlipPlane};
pub use orbit::{OrbitAngles, OrbitState};

// ============================================================================
// Mode
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositioningMode {
    Highlight,
    Normal,
    /// Aim at `point`, or at the surface under the cursor when `None`.
    Target {
        #[serde(default)]
        point: Option<Vec3>,
        /// Keep this distance from the target instead of holding position.
        #[serde(default)]
        distance: Option<f32>,
    },
    Orbit,
    Free,
    Move,
    Flip { plane: FlipPlane },
}

impl Default for PositioningMode {
    fn default() -> Self {
        PositioningMode::Highlight
    }
}

impl PositioningMode {
    pub fn name(&self) -> &'static str {
        match self {
            PositioningMode::Highlight => "Highlight",
            PositioningMode::Normal => "Normal",
            PositioningMode::Target { .. } => "Target",
            PositioningMode::Orbit => "Orbit",
            PositioningMode::Free => "Free",
            PositioningMode::Move => "Move",
            PositioningMode::Flip { .. } => "Flip",
        }
    }

    /// Whether pointer moves must raycast the scene for this mode.
    pub fn needs_scene(&self) -> bool {
        match self {
            PositioningMode::Highlight | PositioningMode::Normal | PositioningMode::Free => true,
            PositioningMode::Target { point, .. } => point.is_none(),
            PositioningMode::Orbit | PositioningMode::Move | PositioningMode::Flip { .. } => false,
        }
    }

    /// Modes applied once on selection rather than per pointer move.
    pub fn is_instant(&self) -> bool {
        matches!(self, PositioningMode::Flip { .. })
    }
}

impl fmt::Display for PositioningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses the pointer-driven mode names (`highlight`, `normal`, `target`,
/// `orbit`, `free`, `move`) and the flips as `flip-horizontal`,
/// `flip-vertical`, `flip-depth`, `flip-pivot`, `flip-180`.
impl FromStr for PositioningMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s.to_ascii_lowercase().as_str() {
            "highlight" => PositioningMode::Highlight,
            "normal" => PositioningMode::Normal,
            "target" => PositioningMode::Target { point: None, distance: None },
            "orbit" => PositioningMode::Orbit,
            "free" => PositioningMode::Free,
            "move" => PositioningMode::Move,
            "flip-horizontal" => PositioningMode::Flip { plane: FlipPlane::CameraHorizontal },
            "flip-vertical" => PositioningMode::Flip { plane: FlipPlane::CameraVertical },
            "flip-depth" => PositioningMode::Flip { plane: FlipPlane::CameraDepth },
            "flip-pivot" => PositioningMode::Flip { plane: FlipPlane::AcrossPivot },
            "flip-180" => PositioningMode::Flip { plane: FlipPlane::HalfTurn },
            other => return Err(format!("unknown positioning mode '{other}'")),
        };
        Ok(mode)
    }
}

// ============================================================================
// Result
// ============================================================================

/// Why a result is a fallback rather than the primary computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoHit,
    DegenerateNormal,
    GrazingAngle,
    TargetCoincident,
    ZeroRadius,
    PlaneUnreachable,
    DegeneratePlane,
    MissingPivot,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FallbackReason::NoHit => "no surface hit, used camera forward",
            FallbackReason::DegenerateNormal => "surface normal is degenerate, placed along view ray",
            FallbackReason::GrazingAngle => "grazing view angle, placed along view ray",
            FallbackReason::TargetCoincident => "target coincides with light, orientation unchanged",
            FallbackReason::ZeroRadius => "orbit radius is zero",
            FallbackReason::PlaneUnreachable => "cursor ray does not reach the drag plane",
            FallbackReason::DegeneratePlane => "flip plane is degenerate",
            FallbackReason::MissingPivot => "light has no pivot",
        };
        f.write_str(text)
    }
}

/// Output of every positioning algorithm. Always a complete transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositioningResult {
    pub transform: LightTransform,
    /// Aim/orbit point the light should remember, if the mode produced one.
    pub pivot: Option<Vec3>,
    pub valid: bool,
    pub reason: Option<FallbackReason>,
}

impl PositioningResult {
    pub fn valid(transform: LightTransform, pivot: Option<Vec3>) -> Self {
        Self { transform, pivot, valid: true, reason: None }
    }

    pub fn fallback(transform: LightTransform, pivot: Option<Vec3>, reason: FallbackReason) -> Self {
        Self { transform, pivot, valid: false, reason: Some(reason) }
    }

    /// Leave `light` as it is and flag the result.
    pub fn unchanged(light: &LightEntity, reason: FallbackReason) -> Self {
        Self::fallback(light.transform, light.pivot, reason)
    }

    /// Write transform and pivot into `light` as one unit.
    pub fn apply_to(&self, light: &mut LightEntity) {
        light.transform = self.transform;
        if self.pivot.is_some() {
            light.pivot = self.pivot;
        }
    }
}

// ============================================================================
// Context + Dispatch
// ============================================================================

/// Inputs shared by every mode for a single computation.
#[derive(Debug, Clone, Copy)]
pub struct ModeContext<'a> {
    pub snapshot: &'a SceneSnapshot,
    pub light: &'a LightEntity,
    pub camera: &'a CameraPose,
    /// Working light-to-subject distance (meters)
    pub distance: f32,
    pub modifiers: Modifiers,
    /// Free-mode plane anchor (light position at session start)
    pub anchor: Vec3,
    /// Pivot when the Move drag started
    pub anchor_pivot: Vec3,
    pub orbit: OrbitState,
}

impl<'a> ModeContext<'a> {
    /// Context with the anchor at the light and an orbit around its pivot
    /// (or the origin).
    pub fn new(snapshot: &'a SceneSnapshot, light: &'a LightEntity, camera: &'a CameraPose, distance: f32) -> Self {
        let center = light.pivot.unwrap_or(Vec3::ZERO);
        Self {
            snapshot,
            light,
            camera,
            distance,
            modifiers: Modifiers::empty(),
            anchor: light.transform.position,
            anchor_pivot: movement::start_pivot(light, distance),
            orbit: OrbitState::from_position(center, light.transform.position),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_anchor(mut self, anchor: Vec3) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_anchor_pivot(mut self, pivot: Vec3) -> Self {
        self.anchor_pivot = pivot;
        self
    }

    pub fn with_orbit(mut self, orbit: OrbitState) -> Self {
        self.orbit = orbit;
        self
    }
}

/// Run the algorithm selected by `mode`.
pub fn compute(mode: &PositioningMode, ctx: &ModeContext<'_>, config: &PositioningConfig) -> PositioningResult {
    match *mode {
        PositioningMode::Highlight => highlight::compute(ctx.snapshot, ctx.camera, ctx.distance, config),
        PositioningMode::Normal => normal::compute(ctx.snapshot, ctx.camera, ctx.distance),
        PositioningMode::Target { point, distance } => target::compute(ctx.snapshot, ctx.light, point, distance, config),
        PositioningMode::Orbit => orbit::compute(&ctx.orbit, ctx.light),
        PositioningMode::Free => free::compute(ctx.snapshot, ctx.light, ctx.camera, ctx.anchor, ctx.modifiers, config),
        PositioningMode::Move => movement::compute(
            ctx.snapshot,
            ctx.light,
            ctx.camera,
            ctx.anchor,
            ctx.anchor_pivot,
            ctx.modifiers,
            config,
        ),
        PositioningMode::Flip { plane } => flip::compute(ctx.light, ctx.camera, &plane),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightKind;
    use crate::scene::Ray;

    #[test]
    fn test_mode_parse_and_name() {
        assert_eq!("orbit".parse::<PositioningMode>().unwrap(), PositioningMode::Orbit);
        assert_eq!(
            "flip-pivot".parse::<PositioningMode>().unwrap(),
            PositioningMode::Flip { plane: FlipPlane::AcrossPivot }
        );
        assert_eq!("move".parse::<PositioningMode>().unwrap(), PositioningMode::Move);
        assert_eq!(
            "flip-180".parse::<PositioningMode>().unwrap(),
            PositioningMode::Flip { plane: FlipPlane::HalfTurn }
        );
        assert!("sideways".parse::<PositioningMode>().is_err());
        assert_eq!(PositioningMode::Target { point: None, distance: None }.to_string(), "Target");
    }

    #[test]
    fn test_dispatch_normal_matches_direct_call() {
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_X);
        let snapshot = SceneSnapshot::hit(ray, 4.0, Vec3::X, crate::scene::ObjectId(0));
        let light = LightEntity::new("key", LightKind::Spot);
        let camera = CameraPose::default();
        let ctx = ModeContext::new(&snapshot, &light, &camera, 2.0);
        let config = PositioningConfig::default();

        let via_dispatch = compute(&PositioningMode::Normal, &ctx, &config);
        assert_eq!(via_dispatch, normal::compute(&snapshot, &camera, 2.0));
        assert!(via_dispatch.valid);
    }

    #[test]
    fn test_apply_to_keeps_pivot_when_none() {
        let mut light = LightEntity::new("fill", LightKind::Point).with_pivot(Vec3::ONE);
        let result = PositioningResult::valid(LightTransform::default(), None);
        result.apply_to(&mut light);
        assert_eq!(light.pivot, Some(Vec3::ONE));
    }
}

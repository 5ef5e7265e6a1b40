//! # Light Records
//!
//! The host-owned light record the engine reads at session start and writes
//! back on commit.
//!
//! ## Table of Contents
//! - `LightId` / `LightKind` / `LightCapabilities`
//! - `LightTransform` - position + rotation, forward = local −Z
//! - `LightParams` - power, temperature, spread, blend, size
//! - `LightEntity` - the full record
//! - `kelvin_to_rgb` - blackbody approximation for display swatches

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::CameraId;
use crate::math;

// ============================================================================
// Identity and Kind
// ============================================================================

/// Stable identifier of a light in the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightId(pub Uuid);

impl LightId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LightId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Point,
    Spot,
    Area,
    Sun,
}

impl LightKind {
    pub const ALL: [LightKind; 4] = [LightKind::Point, LightKind::Spot, LightKind::Area, LightKind::Sun];

    pub fn name(&self) -> &'static str {
        match self {
            LightKind::Point => "Point",
            LightKind::Spot => "Spot",
            LightKind::Area => "Area",
            LightKind::Sun => "Sun",
        }
    }

    /// Which optional parameters this kind exposes.
    pub fn capabilities(&self) -> LightCapabilities {
        match self {
            LightKind::Point => LightCapabilities::SIZE,
            LightKind::Spot => LightCapabilities::SPREAD | LightCapabilities::BLEND | LightCapabilities::SIZE,
            LightKind::Area => LightCapabilities::SPREAD | LightCapabilities::SIZE,
            LightKind::Sun => LightCapabilities::SPREAD,
        }
    }
}

bitflags::bitflags! {
    /// Optional parameters a light kind supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LightCapabilities: u8 {
        /// Cone / beam / angular diameter
        const SPREAD = 0b0001;
        /// Spot edge softness
        const BLEND  = 0b0010;
        /// Emitter radius or area size
        const SIZE   = 0b0100;
    }
}

// ============================================================================
// Transform
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for LightTransform {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Quat::IDENTITY }
    }
}

impl LightTransform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Place at `position` aimed at `target`. Coincident points keep the
    /// identity rotation.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let rotation = math::aim_rotation(position, target).unwrap_or(Quat::IDENTITY);
        Self { position, rotation }
    }

    /// World-space emission direction (local −Z).
    pub fn forward(&self) -> Vec3 {
        math::forward_of(self.rotation)
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Photometric parameters. Fields a kind does not support are carried but
/// ignored by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightParams {
    /// Watts
    #[serde(default = "default_power")]
    pub power: f32,
    /// Kelvin
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Degrees
    #[serde(default = "default_spread")]
    pub spread: f32,
    #[serde(default = "default_blend")]
    pub blend: f32,
    /// Meters
    #[serde(default = "default_size")]
    pub size: f32,
}

fn default_power() -> f32 {
    1000.0
}
fn default_temperature() -> f32 {
    6500.0
}
fn default_spread() -> f32 {
    45.0
}
fn default_blend() -> f32 {
    0.15
}
fn default_size() -> f32 {
    0.1
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            power: default_power(),
            temperature: default_temperature(),
            spread: default_spread(),
            blend: default_blend(),
            size: default_size(),
        }
    }
}

impl LightParams {
    /// Sensible starting values for a newly created light of `kind`.
    pub fn for_kind(kind: LightKind) -> Self {
        match kind {
            LightKind::Point => Self { power: 1000.0, size: 0.1, ..Self::default() },
            LightKind::Spot => Self { power: 1500.0, spread: 45.0, blend: 0.15, size: 0.1, ..Self::default() },
            LightKind::Area => Self { power: 2000.0, size: 1.0, ..Self::default() },
            LightKind::Sun => Self { power: 5000.0, spread: 0.5, ..Self::default() },
        }
    }
}

// ============================================================================
// Light Entity
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightEntity {
    pub id: LightId,
    pub name: String,
    pub kind: LightKind,
    #[serde(default)]
    pub transform: LightTransform,
    #[serde(default)]
    pub params: LightParams,
    /// Point the light aims at and orbits around.
    #[serde(default)]
    pub pivot: Option<Vec3>,
    #[serde(default)]
    pub assigned_camera: Option<CameraId>,
}

impl LightEntity {
    pub fn new(name: impl Into<String>, kind: LightKind) -> Self {
        Self {
            id: LightId::new(),
            name: name.into(),
            kind,
            transform: LightTransform::default(),
            params: LightParams::for_kind(kind),
            pivot: None,
            assigned_camera: None,
        }
    }

    pub fn with_transform(mut self, transform: LightTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_pivot(mut self, pivot: Vec3) -> Self {
        self.pivot = Some(pivot);
        self
    }

    pub fn supports(&self, capability: LightCapabilities) -> bool {
        self.kind.capabilities().contains(capability)
    }

    /// The color this light's temperature produces, linear 0..1.
    pub fn color(&self) -> Vec3 {
        kelvin_to_rgb(self.params.temperature)
    }
}

// ============================================================================
// Color Temperature
// ============================================================================

/// Approximate blackbody color for a temperature in Kelvin.
///
/// Tanner Helland's curve fit; input is clamped to 1000..=20000 K.
pub fn kelvin_to_rgb(kelvin: f32) -> Vec3 {
    let temp = kelvin.clamp(1000.0, 20000.0) as f64 / 100.0;

    let red = if temp <= 66.0 {
        255.0
    } else {
        329.698727446 * (temp - 60.0).powf(-0.1332047592)
    };

    let green = if temp <= 66.0 {
        99.4708025861 * temp.ln() - 161.1195681661
    } else {
        288.1221695283 * (temp - 60.0).powf(-0.0755148492)
    };

    let blue = if temp >= 66.0 {
        255.0
    } else if temp <= 19.0 {
        0.0
    } else {
        138.5177312231 * (temp - 10.0).ln() - 305.0447927307
    };

    let channel = |v: f64| (v.clamp(0.0, 255.0) / 255.0) as f32;
    Vec3::new(channel(red), channel(green), channel(blue))
}

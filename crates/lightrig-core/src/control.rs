//! # Smart Control Translator
//!
//! Turns wheel ticks and horizontal pointer drags into bounded light
//! parameter changes.
//!
//! ## Table of Contents
//! - `ControlParameter` - what is being adjusted
//! - `ParamRange` - documented bounds; every output is clamped into them
//! - `ControlChange` - before/after record of one adjustment
//! - `DragTracker` - speed and accumulated-distance state for a drag
//! - `SmartControl` - wheel and drag translation
//!
//! ## Step Shapes
//! | Parameter   | Wheel step                           | Drag (amount = dx × sensitivity) |
//! |-------------|--------------------------------------|----------------------------------|
//! | distance    | `cur·(1+k)^ticks`                    | `cur + amount` m                 |
//! | scale       | `cur·(1+k)^ticks`                    | `cur + amount` m                 |
//! | power       | `cur + ticks·10%·decade(cur)`        | `cur + amount·cur`               |
//! | spread      | `cur + ticks·step` °                 | `cur + amount·0.05` rad          |
//! | blend       | `cur + ticks·step`                   | `cur + amount·0.05`              |
//! | temperature | `cur + ticks·step` K                 | `cur + amount·100` K             |
//!
//! PRECISION divides the step (or amount) by `precision_factor`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ControlConfig, SensitivityProfile};
use crate::input::Modifiers;
use crate::light::{LightCapabilities, LightKind, LightParams};

// ============================================================================
// Parameters and Ranges
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlParameter {
    Distance,
    Power,
    Scale,
    Spread,
    Blend,
    Temperature,
}

impl ControlParameter {
    pub const ALL: [ControlParameter; 6] = [
        ControlParameter::Distance,
        ControlParameter::Power,
        ControlParameter::Scale,
        ControlParameter::Spread,
        ControlParameter::Blend,
        ControlParameter::Temperature,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ControlParameter::Distance => "Distance",
            ControlParameter::Power => "Power",
            ControlParameter::Scale => "Scale",
            ControlParameter::Spread => "Spread",
            ControlParameter::Blend => "Blend",
            ControlParameter::Temperature => "Temperature",
        }
    }

    pub fn range(&self) -> ParamRange {
        match self {
            ControlParameter::Distance => ParamRange::DISTANCE,
            ControlParameter::Power => ParamRange::POWER,
            ControlParameter::Scale => ParamRange::SCALE,
            ControlParameter::Spread => ParamRange::SPREAD,
            ControlParameter::Blend => ParamRange::BLEND,
            ControlParameter::Temperature => ParamRange::TEMPERATURE,
        }
    }

    /// Whether lights of `kind` expose this parameter.
    pub fn is_available(&self, kind: LightKind) -> bool {
        let caps = kind.capabilities();
        match self {
            ControlParameter::Distance | ControlParameter::Power | ControlParameter::Temperature => true,
            ControlParameter::Scale => caps.contains(LightCapabilities::SIZE),
            ControlParameter::Spread => caps.contains(LightCapabilities::SPREAD),
            ControlParameter::Blend => caps.contains(LightCapabilities::BLEND),
        }
    }

    /// Current value stored on the light. Distance lives on the session, not
    /// the light, so it returns `None`.
    pub fn read(&self, params: &LightParams) -> Option<f32> {
        match self {
            ControlParameter::Distance => None,
            ControlParameter::Power => Some(params.power),
            ControlParameter::Scale => Some(params.size),
            ControlParameter::Spread => Some(params.spread),
            ControlParameter::Blend => Some(params.blend),
            ControlParameter::Temperature => Some(params.temperature),
        }
    }

    pub fn write(&self, params: &mut LightParams, value: f32) {
        match self {
            ControlParameter::Distance => {}
            ControlParameter::Power => params.power = value,
            ControlParameter::Scale => params.size = value,
            ControlParameter::Spread => params.spread = value,
            ControlParameter::Blend => params.blend = value,
            ControlParameter::Temperature => params.temperature = value,
        }
    }

    /// Display string with units, e.g. `2.00m`, `150.0W`, `45.0°`, `5500K`.
    pub fn format(&self, value: f32) -> String {
        match self {
            ControlParameter::Distance | ControlParameter::Scale => format!("{value:.2}m"),
            ControlParameter::Power => format!("{value:.1}W"),
            ControlParameter::Spread => format!("{value:.1}°"),
            ControlParameter::Blend => format!("{value:.2}"),
            ControlParameter::Temperature => format!("{value:.0}K"),
        }
    }
}

impl fmt::Display for ControlParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive bounds of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
}

impl ParamRange {
    pub const DISTANCE: ParamRange = ParamRange { min: 0.1, max: 1000.0 };
    pub const POWER: ParamRange = ParamRange { min: 0.001, max: 1_000_000.0 };
    pub const SCALE: ParamRange = ParamRange { min: 0.01, max: 100.0 };
    pub const SPREAD: ParamRange = ParamRange { min: 0.0, max: 180.0 };
    pub const BLEND: ParamRange = ParamRange { min: 0.0, max: 1.0 };
    pub const TEMPERATURE: ParamRange = ParamRange { min: 1000.0, max: 20000.0 };

    /// Clamp into range. NaN maps to the minimum.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One applied adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlChange {
    pub parameter: ControlParameter,
    pub before: f32,
    pub after: f32,
    /// The raw result fell outside the range and was clamped.
    pub clamped: bool,
}

impl ControlChange {
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }
}

// ============================================================================
// Drag Tracking
// ============================================================================

/// Below this pointer speed (px/s) drags are slowed down.
const SLOW_SPEED: f32 = 100.0;
/// Above this pointer speed (px/s) drags are sped up.
const FAST_SPEED: f32 = 1000.0;
/// Accumulated drag (px) below which drags stay fine.
const SHORT_DRAG: f32 = 100.0;
/// Accumulated drag (px) above which drags accelerate.
const LONG_DRAG: f32 = 500.0;

/// Speed and accumulated-distance state of one drag gesture. Time comes
/// from event timestamps, so replays are deterministic.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragTracker {
    last_time: Option<f64>,
    total_distance: f32,
}

impl DragTracker {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn total_distance(&self) -> f32 {
        self.total_distance
    }

    /// Effective sensitivity for this step, then record the step.
    fn sensitivity(&mut self, profile: &SensitivityProfile, dx: f32, time: f64) -> f32 {
        let Some(last_time) = self.last_time else {
            self.last_time = Some(time);
            self.total_distance = dx.abs();
            return profile.base;
        };

        let elapsed = (time - last_time) as f32;
        let speed_sensitivity = if elapsed > 0.0 {
            let speed = dx.abs() / elapsed;
            let multiplier = if speed < SLOW_SPEED {
                0.5
            } else if speed > FAST_SPEED {
                2.0
            } else {
                1.0
            };
            profile.base * (1.0 + (multiplier - 1.0) * profile.speed_factor)
        } else {
            profile.base
        };

        self.total_distance += dx.abs();
        let accel_multiplier = if self.total_distance < SHORT_DRAG {
            0.7
        } else if self.total_distance > LONG_DRAG {
            1.5
        } else {
            1.0
        };
        self.last_time = Some(time);

        speed_sensitivity * (1.0 + (accel_multiplier - 1.0) * profile.accel_factor)
    }
}

// ============================================================================
// SmartControl
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SmartControl {
    config: ControlConfig,
    tracker: DragTracker,
}

impl SmartControl {
    pub fn new(config: ControlConfig) -> Self {
        Self { config, tracker: DragTracker::default() }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Forget drag speed/acceleration history (new gesture or parameter).
    pub fn reset_drag(&mut self) {
        self.tracker.reset();
    }

    fn precision(&self, modifiers: Modifiers) -> f32 {
        if modifiers.contains(Modifiers::PRECISION) && self.config.precision_factor > 0.0 {
            1.0 / self.config.precision_factor
        } else {
            1.0
        }
    }

    fn profile(&self, parameter: ControlParameter) -> &SensitivityProfile {
        let profiles = &self.config.sensitivity;
        match parameter {
            ControlParameter::Distance => &profiles.distance,
            ControlParameter::Power => &profiles.power,
            ControlParameter::Scale => &profiles.scale,
            ControlParameter::Spread => &profiles.spread,
            ControlParameter::Blend => &profiles.blend,
            ControlParameter::Temperature => &profiles.temperature,
        }
    }

    /// Apply wheel ticks. `None` when `kind` does not expose the parameter.
    pub fn wheel(
        &self,
        parameter: ControlParameter,
        kind: LightKind,
        current: f32,
        ticks: i32,
        modifiers: Modifiers,
    ) -> Option<ControlChange> {
        if !parameter.is_available(kind) {
            return None;
        }
        let range = parameter.range();
        let cur = range.clamp(current);
        let scale = self.precision(modifiers);
        let ticks = ticks as f32;

        let raw = match parameter {
            ControlParameter::Distance => cur * (1.0 + self.config.distance_step * scale).powf(ticks),
            ControlParameter::Scale => cur * (1.0 + self.config.scale_step * scale).powf(ticks),
            ControlParameter::Power => {
                let decade = 10f32.powf(cur.max(range.min).log10().floor());
                cur + ticks * decade * self.config.power_decade_fraction * scale
            }
            ControlParameter::Spread => cur + ticks * self.config.spread_step * scale,
            ControlParameter::Blend => cur + ticks * self.config.blend_step * scale,
            ControlParameter::Temperature => cur + ticks * self.config.temperature_step * scale,
        };
        Some(finish(parameter, current, raw))
    }

    /// Apply a horizontal drag of `dx` pixels observed at `time` seconds.
    pub fn drag(
        &mut self,
        parameter: ControlParameter,
        kind: LightKind,
        current: f32,
        dx: f32,
        time: f64,
        modifiers: Modifiers,
    ) -> Option<ControlChange> {
        if !parameter.is_available(kind) {
            return None;
        }
        let profile = *self.profile(parameter);
        let sensitivity = self.tracker.sensitivity(&profile, dx, time);
        let amount = dx * sensitivity * self.precision(modifiers);
        let cur = parameter.range().clamp(current);

        let raw = match parameter {
            ControlParameter::Distance | ControlParameter::Scale => cur + amount,
            ControlParameter::Power => cur + amount * cur,
            ControlParameter::Spread => cur + (amount * 0.05).to_degrees(),
            ControlParameter::Blend => cur + amount * 0.05,
            ControlParameter::Temperature => cur + amount * 100.0,
        };
        Some(finish(parameter, current, raw))
    }
}

fn finish(parameter: ControlParameter, before: f32, raw: f32) -> ControlChange {
    let range = parameter.range();
    let after = range.clamp(raw);
    ControlChange { parameter, before, after, clamped: after != raw }
}

//! # Input Events
//!
//! Host-neutral input vocabulary consumed by `ModalSession::handle_event`.
//! Events are serde-serializable so sessions can be scripted and replayed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::control::ControlParameter;
use crate::positioning::PositioningMode;

bitflags::bitflags! {
    /// Modifier keys held during a session.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u8 {
        /// Grid / angle / surface snapping
        const SNAP      = 0b0001;
        /// Fine adjustment (steps divided by the precision factor)
        const PRECISION = 0b0010;
        /// Constrain to one axis
        const AXIS_LOCK = 0b0100;
    }
}

/// A single modifier key, as carried by key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Snap,
    Precision,
    AxisLock,
}

impl Modifier {
    pub fn flag(self) -> Modifiers {
        match self {
            Modifier::Snap => Modifiers::SNAP,
            Modifier::Precision => Modifiers::PRECISION,
            Modifier::AxisLock => Modifiers::AXIS_LOCK,
        }
    }
}

/// Short labels for the active modifiers, in a fixed order.
pub fn modifier_labels(modifiers: Modifiers) -> Vec<&'static str> {
    let mut labels = Vec::new();
    if modifiers.contains(Modifiers::SNAP) {
        labels.push("Snap");
    }
    if modifiers.contains(Modifiers::PRECISION) {
        labels.push("Precision");
    }
    if modifiers.contains(Modifiers::AXIS_LOCK) {
        labels.push("Axis Lock");
    }
    labels
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    /// Cursor position in viewport pixels; `time` in seconds feeds drag
    /// speed tracking.
    PointerMove {
        position: Vec2,
        #[serde(default)]
        time: f64,
    },
    /// Positive ticks increase the active control parameter.
    Wheel { ticks: i32 },
    ModifierDown { modifier: Modifier },
    ModifierUp { modifier: Modifier },
    SetMode { mode: PositioningMode },
    /// Route pointer drags to a parameter, or back to positioning with `None`.
    SetControl {
        #[serde(default)]
        parameter: Option<ControlParameter>,
    },
    Confirm,
    Cancel,
}

impl InputEvent {
    pub fn pointer(x: f32, y: f32, time: f64) -> Self {
        InputEvent::PointerMove { position: Vec2::new(x, y), time }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InputEvent::PointerMove { .. } => "pointer_move",
            InputEvent::Wheel { .. } => "wheel",
            InputEvent::ModifierDown { .. } => "modifier_down",
            InputEvent::ModifierUp { .. } => "modifier_up",
            InputEvent::SetMode { .. } => "set_mode",
            InputEvent::SetControl { .. } => "set_control",
            InputEvent::Confirm => "confirm",
            InputEvent::Cancel => "cancel",
        }
    }
}

//! # Overlay Feedback
//!
//! Draw primitives derived from a session and its latest positioning result.
//! Holds no state of its own and never mutates the session; hosts call
//! `render` every frame and draw whatever comes out.
//!
//! ## Table of Contents
//! - `OverlayPrimitive` / `LineStyle` - what to draw
//! - `render` / `render_with` - derivation
//! - `camera_links` - shot cameras the light is (or will be) assigned to
//!
//! ## Output Order
//! 1. Guide line from the light to its pivot or the surface under the cursor
//! 2. Orbit arcs (azimuth ring and elevation meridian) in Orbit mode
//! 3. Cursor glyph on the hit surface
//! 4. Text block (mode, values with units, control, modifiers)
//! 5. Fallback indicator when the result is invalid
//!
//! `camera_links` is separate because it needs the host's assignment store
//! and camera positions: one link per assigned camera, then a badge at the
//! light naming them.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::assignment::CameraLightStore;
use crate::camera::CameraId;
use crate::config::RigConfig;
use crate::control::ControlParameter;
use crate::input::modifier_labels;
use crate::light::LightCapabilities;
use crate::positioning::{OrbitAngles, OrbitState, PositioningMode, PositioningResult};
use crate::session::ModalSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Guide,
    Arc,
    /// Drawn when the result is a fallback
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "primitive", rename_all = "snake_case")]
pub enum OverlayPrimitive {
    Line { from: Vec3, to: Vec3, style: LineStyle },
    Polyline { points: Vec<Vec3>, style: LineStyle },
    CursorGlyph { position: Vec3, normal: Vec3, radius: f32 },
    Text { lines: Vec<String> },
    Fallback { position: Vec3, reason: String },
    /// Camera to light. `pending` until the session commits the assignment.
    CameraLink { camera: CameraId, from: Vec3, to: Vec3, pending: bool },
    AssignmentBadge { position: Vec3, cameras: Vec<CameraId> },
}

/// Render with the default settings.
pub fn render<'a>(
    session: &'a ModalSession,
    result: Option<&'a PositioningResult>,
) -> impl Iterator<Item = OverlayPrimitive> + 'a {
    render_with(session, result, &RigConfig::default())
}

/// Derive the overlay for `session`. `result` overrides the session's own
/// last positioning result.
pub fn render_with<'a>(
    session: &'a ModalSession,
    result: Option<&'a PositioningResult>,
    config: &RigConfig,
) -> impl Iterator<Item = OverlayPrimitive> + 'a {
    let overlay = &config.overlay;
    let result = result.or_else(|| session.last_result());
    let invalid = result.filter(|r| !r.valid);

    let guide = guide_line(session, result);

    let arcs = (overlay.show_orbit_arcs && *session.mode() == PositioningMode::Orbit)
        .then(|| orbit_arcs(session.orbit(), overlay.arc_segments, config.positioning.elevation_epsilon))
        .into_iter()
        .flatten();

    let cursor = session.last_snapshot().and_then(|snapshot| {
        Some(OverlayPrimitive::CursorGlyph {
            position: snapshot.hit_point?,
            normal: snapshot.normal?,
            radius: overlay.cursor_size,
        })
    });

    let text = overlay
        .show_text
        .then(|| OverlayPrimitive::Text { lines: text_lines(session, result) });

    let fallback = invalid.map(|r| OverlayPrimitive::Fallback {
        position: r.transform.position,
        reason: r.reason.map(|reason| reason.to_string()).unwrap_or_default(),
    });

    guide.into_iter().chain(arcs).chain(cursor).chain(text).chain(fallback)
}

/// Links from the shot cameras in `cameras` to the session's light. Cameras
/// without a known position are skipped.
pub fn camera_links(
    session: &ModalSession,
    store: &dyn CameraLightStore,
    cameras: &[(CameraId, Vec3)],
) -> Vec<OverlayPrimitive> {
    let light = session.light_id();
    let to = session.working().transform.position;
    let pending = session.assignment_target();

    let mut linked = Vec::new();
    let mut prims = Vec::new();
    for (camera, from) in cameras {
        let assigned = store.lights_for(camera).contains(&light);
        let is_target = pending == Some(camera);
        if !assigned && !is_target {
            continue;
        }
        prims.push(OverlayPrimitive::CameraLink {
            camera: camera.clone(),
            from: *from,
            to,
            pending: !assigned,
        });
        linked.push(camera.clone());
    }

    if !linked.is_empty() {
        linked.sort();
        prims.push(OverlayPrimitive::AssignmentBadge { position: to, cameras: linked });
    }
    prims
}

fn guide_line(session: &ModalSession, result: Option<&PositioningResult>) -> Option<OverlayPrimitive> {
    let light = session.working();
    let target = result
        .and_then(|r| r.pivot)
        .or(light.pivot)
        .or_else(|| session.last_snapshot().and_then(|s| s.hit_point))?;
    let style = match result {
        Some(r) if !r.valid => LineStyle::Fallback,
        _ => LineStyle::Guide,
    };
    Some(OverlayPrimitive::Line { from: light.transform.position, to: target, style })
}

/// Azimuth ring at the current elevation and elevation meridian at the
/// current azimuth.
fn orbit_arcs(orbit: &OrbitState, segments: u32, elevation_epsilon: f32) -> Vec<OverlayPrimitive> {
    if orbit.radius <= 0.0 {
        return Vec::new();
    }
    let segments = segments.max(3);
    let point = |angles: OrbitAngles| orbit.center + angles.direction() * orbit.radius;

    let ring = (0..=segments)
        .map(|i| point(OrbitAngles::new(TAU * i as f32 / segments as f32, orbit.angles.elevation)))
        .collect();
    let limit = FRAC_PI_2 - elevation_epsilon;
    let meridian = (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            point(OrbitAngles::new(orbit.angles.azimuth, -limit + 2.0 * limit * t))
        })
        .collect();

    vec![
        OverlayPrimitive::Polyline { points: ring, style: LineStyle::Arc },
        OverlayPrimitive::Polyline { points: meridian, style: LineStyle::Arc },
    ]
}

fn text_lines(session: &ModalSession, result: Option<&PositioningResult>) -> Vec<String> {
    let light = session.working();
    let mut lines = vec![format!("{} - {}", session.mode(), light.name)];

    let mut shown = vec![ControlParameter::Distance, ControlParameter::Power, ControlParameter::Temperature];
    if light.supports(LightCapabilities::SPREAD) {
        shown.push(ControlParameter::Spread);
    }
    if light.supports(LightCapabilities::BLEND) {
        shown.push(ControlParameter::Blend);
    }
    if light.supports(LightCapabilities::SIZE) {
        shown.push(ControlParameter::Scale);
    }

    let active = session.wheel_parameter();
    for parameter in shown {
        let marker = if parameter == active { ">" } else { " " };
        lines.push(format!("{marker} {}: {}", parameter, parameter.format(session.value_of(parameter))));
    }

    let modifiers = modifier_labels(session.modifiers());
    if !modifiers.is_empty() {
        lines.push(format!("Modifiers: {}", modifiers.join(", ")));
    }
    if let Some(reason) = result.and_then(|r| r.reason) {
        lines.push(format!("Fallback: {reason}"));
    }
    lines
}

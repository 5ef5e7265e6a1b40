//! Human (colored) and JSON rendering of command results.

use anyhow::Result;
use colored::Colorize;
use glam::Vec3;
use serde::Serialize;
use serde_json::json;

use lightrig_core::assignment::LightVisibility;
use lightrig_core::camera::CameraId;
use lightrig_core::config::RigConfig;
use lightrig_core::control::ControlParameter;
use lightrig_core::light::{LightEntity, LightKind};
use lightrig_core::overlay::OverlayPrimitive;
use lightrig_core::session::{ModalSession, SessionState};
use lightrig_core::store::LightScene;
use lightrig_core::suggest::{LightSuggestion, SceneAnalysis};

/// One replayed event and where it left the working light.
#[derive(Debug, Serialize)]
pub struct Step {
    pub event: &'static str,
    pub state: SessionState,
    pub position: Vec3,
    pub valid: Option<bool>,
    pub reason: Option<String>,
}

impl Step {
    pub fn new(event: &'static str, state: SessionState, session: &ModalSession) -> Self {
        let result = session.last_result();
        Self {
            event,
            state,
            position: session.working().transform.position,
            valid: result.map(|r| r.valid),
            reason: result.and_then(|r| r.reason).map(|r| r.to_string()),
        }
    }
}

pub struct Printer {
    json: bool,
}

impl Printer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn session(
        &self,
        session: &ModalSession,
        steps: &[Step],
        stored: &LightEntity,
        overlay: &[OverlayPrimitive],
    ) -> Result<()> {
        if self.json {
            let report = json!({
                "state": session.state(),
                "mode": session.mode(),
                "steps": steps,
                "result": session.last_result(),
                "last_change": session.last_change(),
                "working": session.working(),
                "stored": stored,
                "overlay": overlay,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        let state = match session.state() {
            SessionState::Confirmed => "CONFIRMED".green().bold(),
            SessionState::Cancelled => "CANCELLED".red().bold(),
            other => format!("{other:?}").to_uppercase().yellow().bold(),
        };
        println!("{} {} ({} mode)", state, session.working().name.bold(), session.mode());

        for (i, step) in steps.iter().enumerate() {
            let marker = match step.valid {
                Some(false) => "!".yellow(),
                _ => " ".normal(),
            };
            println!("  {:>3} {} {:<14} {}", i + 1, marker, step.event, fmt_vec(step.position).dimmed());
        }

        if let Some(result) = session.last_result() {
            if let Some(reason) = result.reason {
                println!("  {} {}", "fallback:".yellow(), reason);
            }
        }

        let light = session.working();
        println!("  {} {}", "position:".cyan(), fmt_vec(light.transform.position));
        println!("  {} {}", "forward: ".cyan(), fmt_vec(light.transform.forward()));
        if let Some(pivot) = light.pivot {
            println!("  {} {}", "pivot:   ".cyan(), fmt_vec(pivot));
        }
        for parameter in ControlParameter::ALL {
            if let Some(value) = parameter.read(&light.params) {
                if parameter.is_available(light.kind) {
                    println!("  {:<12} {}", format!("{parameter}:"), parameter.format(value));
                }
            }
        }
        if stored.transform != light.transform && session.state() == SessionState::Confirmed {
            println!("  {}", "stored light differs from working copy".red());
        }

        for primitive in overlay {
            println!("  {} {}", "overlay".magenta(), describe(primitive));
        }
        Ok(())
    }

    pub fn assignment(&self, camera: &CameraId, organized: &str, visibility: &LightVisibility, lights: &LightScene) {
        let names = |ids: &[lightrig_core::light::LightId]| -> Vec<String> {
            ids.iter()
                .filter_map(|id| lights.iter().find(|l| l.id == *id).map(|l| l.name.clone()))
                .collect()
        };
        let shown = names(&visibility.shown);
        let hidden = names(&visibility.hidden);

        if self.json {
            let report = json!({
                "camera": camera,
                "organized_name": organized,
                "shown": shown,
                "hidden": hidden,
            });
            println!("{report:#}");
            return;
        }
        println!("{} {}", "camera".cyan(), camera.as_str().bold());
        println!("  organized name: {}", organized.green());
        println!("  shown:  {}", shown.join(", "));
        println!("  hidden: {}", hidden.join(", ").dimmed());
    }

    pub fn suggestion(&self, kind: LightKind, analysis: &SceneAnalysis, suggestion: &LightSuggestion) {
        if self.json {
            let report = json!({
                "kind": kind,
                "analysis": analysis,
                "suggestion": suggestion,
            });
            println!("{report:#}");
            return;
        }
        println!("{} {} light", "suggested".green().bold(), kind.name());
        println!("  scene size: {:.2}m ({} objects)", analysis.scene_size, analysis.object_count);
        println!("  position:   {}", fmt_vec(suggestion.transform.position));
        println!("  distance:   {}", ControlParameter::Distance.format(suggestion.distance));
        println!("  power:      {}", ControlParameter::Power.format(suggestion.params.power));
        println!("  size:       {}", ControlParameter::Scale.format(suggestion.params.size));
        if let Some(size_y) = suggestion.size_y {
            println!("  size y:     {}", ControlParameter::Scale.format(size_y));
        }
    }

    pub fn config(&self, config: &RigConfig) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(config)?);
        } else {
            print!("{}", config.to_toml_string()?);
        }
        Ok(())
    }
}

fn fmt_vec(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

fn describe(primitive: &OverlayPrimitive) -> String {
    match primitive {
        OverlayPrimitive::Line { from, to, style } => format!("line {:?} {} -> {}", style, fmt_vec(*from), fmt_vec(*to)),
        OverlayPrimitive::Polyline { points, style } => format!("polyline {:?} ({} points)", style, points.len()),
        OverlayPrimitive::CursorGlyph { position, .. } => format!("cursor at {}", fmt_vec(*position)),
        OverlayPrimitive::Text { lines } => lines.join(" | "),
        OverlayPrimitive::Fallback { position, reason } => format!("fallback at {}: {}", fmt_vec(*position), reason),
        OverlayPrimitive::CameraLink { camera, from, pending, .. } => {
            let state = if *pending { " (pending)" } else { "" };
            format!("link {} from {}{}", camera, fmt_vec(*from), state)
        }
        OverlayPrimitive::AssignmentBadge { cameras, .. } => {
            let names: Vec<&str> = cameras.iter().map(CameraId::as_str).collect();
            format!("assigned to {}", names.join(", "))
        }
    }
}

//! # LightRig CLI
//!
//! Headless harness for the positioning engine: load a TOML scene, run a
//! single placement, replay a scripted edit session, manage camera-light
//! assignments, or print the effective configuration.
//!
//! ## Usage
//!
//! ```bash
//! # Place the "key" light with Normal mode under the viewport center
//! lightrig place --scene demos/scene.toml --light key --mode normal --cursor 640,360
//!
//! # Replay an input script and commit
//! lightrig replay --scene demos/scene.toml --light key --script demos/events.json
//!
//! # Assign a light to a camera and print its organized name
//! lightrig assign --scene demos/scene.toml --store lights.json --camera Camera.001 --light key
//!
//! # Suggest a starting setup for a new area light
//! lightrig suggest --scene demos/scene.toml --kind area --cursor 640,500
//!
//! # Print the effective config as TOML
//! lightrig config
//! ```

mod output;
mod scene_file;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glam::{Vec2, Vec3};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lightrig_core::assignment::{self, AssignmentMap, AssignmentMode, CameraLightStore};
use lightrig_core::camera::{viewport_ray, CameraId};
use lightrig_core::config::RigConfig;
use lightrig_core::input::{InputEvent, Modifier};
use lightrig_core::light::LightKind;
use lightrig_core::overlay::{self, OverlayPrimitive};
use lightrig_core::positioning::PositioningMode;
use lightrig_core::scene::SceneQuery;
use lightrig_core::session::{ModalSession, SessionContext, SessionState};
use lightrig_core::store::LightStore;
use lightrig_core::suggest;

use output::Printer;
use scene_file::LoadedScene;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "lightrig")]
#[command(about = "Interactive light positioning, headless")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ~/.lightrig/config.toml)
    #[arg(short, long, global = true, env = "LIGHTRIG_CONFIG")]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of colored text
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one positioning algorithm for a cursor position
    Place {
        /// Scene file
        #[arg(short, long)]
        scene: PathBuf,
        /// Light name or id
        #[arg(short, long)]
        light: String,
        /// highlight, normal, target, orbit, free, move, flip-horizontal, flip-vertical, flip-depth, flip-pivot, flip-180
        #[arg(short, long, default_value = "highlight")]
        mode: PositioningMode,
        /// Cursor position in viewport pixels, `x,y`
        #[arg(long, value_parser = parse_vec2)]
        cursor: Option<Vec2>,
        /// Explicit target point for target mode, `x,y,z`
        #[arg(long, value_parser = parse_vec3)]
        target: Option<Vec3>,
        /// Wheel ticks applied to the distance after placing
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        wheel: i32,
        /// Held modifiers (snap, precision, axis-lock)
        #[arg(long = "modifier", value_parser = parse_modifier)]
        modifiers: Vec<Modifier>,
        /// Include overlay primitives in the output
        #[arg(long)]
        overlay: bool,
    },

    /// Replay a JSON input-event script as one session
    Replay {
        #[arg(short, long)]
        scene: PathBuf,
        #[arg(short, long)]
        light: String,
        /// JSON array of input events
        #[arg(long)]
        script: PathBuf,
        #[arg(short, long, default_value = "highlight")]
        mode: PositioningMode,
        /// Assign the light to this camera on commit
        #[arg(long)]
        assign: Option<String>,
        /// Assignment store to update on commit
        #[arg(long)]
        store: Option<PathBuf>,
        #[arg(long)]
        overlay: bool,
    },

    /// Assign or unassign a light to a camera in an assignment store
    Assign {
        #[arg(short, long)]
        scene: PathBuf,
        /// Assignment store (JSON)
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        camera: String,
        #[arg(short, long)]
        light: String,
        /// Remove the assignment instead
        #[arg(long)]
        unassign: bool,
    },

    /// Suggest distance, power and size for a new light under the cursor
    Suggest {
        #[arg(short, long)]
        scene: PathBuf,
        /// point, spot, area or sun
        #[arg(short, long, value_parser = parse_kind)]
        kind: LightKind,
        #[arg(long, value_parser = parse_vec2)]
        cursor: Option<Vec2>,
    },

    /// Print the effective configuration, optionally writing it out
    Config {
        /// Write the effective config to this path
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

fn parse_vec2(s: &str) -> std::result::Result<Vec2, String> {
    let parts = parse_floats(s)?;
    match parts.as_slice() {
        [x, y] => Ok(Vec2::new(*x, *y)),
        _ => Err(format!("expected x,y but got '{s}'")),
    }
}

fn parse_vec3(s: &str) -> std::result::Result<Vec3, String> {
    let parts = parse_floats(s)?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z but got '{s}'")),
    }
}

fn parse_floats(s: &str) -> std::result::Result<Vec<f32>, String> {
    s.split(',')
        .map(|part| part.trim().parse::<f32>().map_err(|e| format!("'{part}': {e}")))
        .collect()
}

fn parse_modifier(s: &str) -> std::result::Result<Modifier, String> {
    match s.to_ascii_lowercase().as_str() {
        "snap" => Ok(Modifier::Snap),
        "precision" => Ok(Modifier::Precision),
        "axis-lock" | "axis_lock" => Ok(Modifier::AxisLock),
        other => Err(format!("unknown modifier '{other}'")),
    }
}

fn parse_kind(s: &str) -> std::result::Result<LightKind, String> {
    LightKind::ALL
        .into_iter()
        .find(|kind| kind.name().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown light kind '{s}'"))
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = RigConfig::load_or_default(cli.config.as_deref());
    let printer = Printer::new(cli.json);

    match cli.command {
        Command::Place { scene, light, mode, cursor, target, wheel, modifiers, overlay } => {
            let mode = match (mode, target) {
                (PositioningMode::Target { distance, .. }, Some(point)) => {
                    PositioningMode::Target { point: Some(point), distance }
                }
                (mode, _) => mode,
            };
            let mut events: Vec<InputEvent> = modifiers
                .into_iter()
                .map(|modifier| InputEvent::ModifierDown { modifier })
                .collect();
            let mut loaded = LoadedScene::load(&scene)?;
            let cursor = cursor.unwrap_or_else(|| loaded.viewport.center());
            events.push(InputEvent::PointerMove { position: cursor, time: 0.0 });
            if wheel != 0 {
                events.push(InputEvent::Wheel { ticks: wheel });
            }
            run_session(&mut loaded, &light, mode, events, None, None, overlay, &config, &printer)
        }
        Command::Replay { scene, light, script, mode, assign, store, overlay } => {
            let content = std::fs::read_to_string(&script)
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            let events: Vec<InputEvent> = serde_json::from_str(&content)
                .with_context(|| format!("Invalid event script {}", script.display()))?;
            let mut loaded = LoadedScene::load(&scene)?;
            let camera = assign.map(CameraId::new);
            run_session(&mut loaded, &light, mode, events, camera, store, overlay, &config, &printer)
        }
        Command::Assign { scene, store, camera, light, unassign } => {
            let loaded = LoadedScene::load(&scene)?;
            let id = loaded.resolve_light(&light)?;
            let camera = CameraId::new(camera);
            let mut map = AssignmentMap::load(&store)?;
            if unassign {
                map.unassign(&camera, id);
            } else {
                map.assign(&camera, id);
            }
            map.save(&store)?;

            let name = loaded.lights.get(id).map(|l| l.name).unwrap_or_default();
            let mode = if unassign { AssignmentMode::Scene } else { AssignmentMode::Camera };
            let organized = assignment::organized_light_name(&name, mode, Some(&camera));
            let visibility = assignment::visible_lights(&map, &camera, &loaded.lights.ids());
            printer.assignment(&camera, &organized, &visibility, &loaded.lights);
            Ok(())
        }
        Command::Suggest { scene, kind, cursor } => {
            let loaded = LoadedScene::load(&scene)?;
            let cursor = cursor.unwrap_or_else(|| loaded.viewport.center());
            let ray = viewport_ray(&loaded.camera, &loaded.viewport, cursor);
            let snapshot = loaded.scene.cast(&ray, config.positioning.max_ray_distance);
            let (Some(hit), Some(normal)) = (snapshot.hit_point, snapshot.normal) else {
                bail!("Cursor {},{} does not hit any surface", cursor.x, cursor.y);
            };
            let analysis = suggest::analyze(&loaded.scene, snapshot.object);
            let suggestion = suggest::suggest(kind, hit, normal, &analysis);
            printer.suggestion(kind, &analysis, &suggestion);
            Ok(())
        }
        Command::Config { write } => {
            if let Some(path) = write {
                config.save(&path)?;
                info!("Wrote config to {:?}", path);
            }
            printer.config(&config)
        }
    }
}

// ============================================================================
// Sessions
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn run_session(
    loaded: &mut LoadedScene,
    light: &str,
    mode: PositioningMode,
    events: Vec<InputEvent>,
    assign_to: Option<CameraId>,
    store: Option<PathBuf>,
    with_overlay: bool,
    config: &RigConfig,
    printer: &Printer,
) -> Result<()> {
    let id = loaded.resolve_light(light)?;
    let mut assignments = match &store {
        Some(path) => AssignmentMap::load(path)?,
        None => AssignmentMap::new(),
    };
    if assign_to.is_some() && store.is_none() {
        warn!("--assign without --store: the assignment is not persisted");
    }

    let mut ctx = SessionContext::new(
        &loaded.scene,
        &loaded.camera,
        &loaded.viewport,
        &mut loaded.lights,
        &mut assignments,
        config,
    );
    let mut session = ModalSession::begin(id, mode, &ctx)?;
    if let Some(camera) = assign_to {
        session = session.with_assignment(camera);
    }

    let mut steps = Vec::with_capacity(events.len());
    for event in events {
        let name = event.name();
        let state = session.handle_event(event, &mut ctx)?;
        steps.push(output::Step::new(name, state, &session));
        if state.is_terminal() {
            break;
        }
    }
    let state = session.state();
    drop(ctx);

    if state == SessionState::Confirmed {
        if let Some(path) = &store {
            assignments.save(path)?;
        }
    }

    let stored = loaded.lights.get(id).context("Light vanished during the session")?;
    let prims: Vec<OverlayPrimitive> = if with_overlay {
        overlay::render_with(&session, None, config)
            .chain(overlay::camera_links(&session, &assignments, &loaded.cameras))
            .collect()
    } else {
        Vec::new()
    };
    printer.session(&session, &steps, &stored, &prims)
}

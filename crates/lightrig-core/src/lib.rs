//! # LightRig Core
//!
//! Interactive light positioning: place, aim and tune lights in a 3D scene
//! from cursor input, with every edit confined to a cancellable session.
//!
//! ## Table of Contents
//! - `scene` - ray queries and bounds (`SceneQuery`, `PrimitiveScene`)
//! - `positioning` - Highlight, Normal, Target, Orbit, Free and Flip algorithms
//! - `session` - modal session state machine (`ModalSession`)
//! - `registry` - one live session per light (`SessionRegistry`)
//! - `control` - wheel/drag to bounded parameter changes (`SmartControl`)
//! - `overlay` - draw primitives derived from a session
//! - `assignment` - camera-light assignment store and naming
//! - `suggest` - starting distance/power/size for new lights
//! - `light`, `camera`, `input`, `store` - data model and host seams
//! - `config`, `error`, `math` - shared infrastructure
//!
//! ## Quick Start
//! ```ignore
//! let mut ctx = SessionContext::new(&scene, &camera, &viewport, &mut lights, &mut assignments, &config);
//! let mut session = ModalSession::begin(light_id, PositioningMode::Normal, &ctx)?;
//! session.handle_event(InputEvent::pointer(640.0, 360.0, 0.0), &mut ctx)?;
//! session.handle_event(InputEvent::Confirm, &mut ctx)?;
//! ```

pub mod assignment;
pub mod camera;
pub mod config;
pub mod control;
pub mod error;
pub mod input;
pub mod light;
pub mod math;
pub mod overlay;
pub mod positioning;
pub mod registry;
pub mod scene;
pub mod session;
pub mod store;
pub mod suggest;

pub use assignment::{AssignmentMap, AssignmentMode, CameraLightStore, LightVisibility};
pub use camera::{CameraId, CameraPose, Viewport};
pub use config::RigConfig;
pub use control::{ControlChange, ControlParameter, ParamRange, SmartControl};
pub use error::{Result, RigError};
pub use input::{InputEvent, Modifier, Modifiers};
pub use light::{LightEntity, LightId, LightKind, LightParams, LightTransform};
pub use overlay::{LineStyle, OverlayPrimitive};
pub use positioning::{FallbackReason, FlipPlane, PositioningMode, PositioningResult};
pub use registry::SessionRegistry;
pub use scene::{ObjectId, PrimitiveScene, Ray, SceneQuery, SceneSnapshot};
pub use session::{ModalSession, SessionContext, SessionState};
pub use store::{LightScene, LightStore};

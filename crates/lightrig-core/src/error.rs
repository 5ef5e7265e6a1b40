//! # LightRig Errors
//!
//! Error types for the positioning engine.
//!
//! Geometry problems (ray misses, degenerate normals, parallel planes) are
//! never errors: they come back as a `PositioningResult` with `valid = false`.
//! Out-of-range parameters are clamped silently. The variants below cover the
//! few operations that must fail loudly to the caller.

use thiserror::Error;

use crate::light::LightId;
use crate::session::SessionState;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RigError>;

/// Errors surfaced by the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RigError {
    // ========================================================================
    // Session Errors
    // ========================================================================

    /// The session tried to commit but its target light no longer exists.
    #[error("Commit failed: light {light} no longer exists")]
    CommitFailed { light: LightId },

    /// The session already reached a terminal state.
    #[error("Session already finished ({state:?})")]
    SessionFinished { state: SessionState },

    /// No light with this id exists in the store.
    #[error("Light not found: {0}")]
    LightNotFound(LightId),

    /// No session is registered for this light.
    #[error("No active session for light {0}")]
    NoSession(LightId),

    // ========================================================================
    // Configuration / Persistence Errors
    // ========================================================================

    #[error("Config error: {0}")]
    Config(String),

    #[error("Config I/O error: {0}")]
    ConfigIo(String),

    #[error("Assignment store error: {0}")]
    Assignment(String),
}

impl From<toml::de::Error> for RigError {
    fn from(err: toml::de::Error) -> Self {
        RigError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RigError {
    fn from(err: toml::ser::Error) -> Self {
        RigError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RigError {
    fn from(err: serde_json::Error) -> Self {
        RigError::Assignment(err.to_string())
    }
}

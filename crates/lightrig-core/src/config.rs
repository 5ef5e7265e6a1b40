//! # LightRig Configuration
//!
//! Parses `config.toml`, the tuning file for positioning, smart control, and
//! overlay drawing. Default location is `~/.lightrig/config.toml`.
//!
//! ## Table of Contents
//! 1. RigConfig - Top-level config
//! 2. PositioningConfig - Distances, thresholds, snapping
//! 3. ControlConfig - Wheel steps, drag sensitivity profiles
//! 4. OverlayConfig - Feedback drawing
//! 5. Loading

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, RigError};

// ============================================================================
// 1. RigConfig - Top-level config
// ============================================================================

/// Engine configuration, parsed from `config.toml`. Every section and field
/// is optional; missing values take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RigConfig {
    #[serde(default)]
    pub positioning: PositioningConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

// ============================================================================
// 2. PositioningConfig - Distances, thresholds, snapping
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositioningConfig {
    /// Light-to-surface distance used when nothing better is known (meters)
    #[serde(default = "default_distance")]
    pub default_distance: f32,
    /// Longest raycast the engine issues (meters)
    #[serde(default = "default_max_ray_distance")]
    pub max_ray_distance: f32,
    /// Highlight treats `dot(-view, normal)` below this as grazing (≈ cos 89°)
    #[serde(default = "default_grazing_cos")]
    pub grazing_cos: f32,
    /// Orbit radians per pointer pixel
    #[serde(default = "default_orbit_sensitivity")]
    pub orbit_sensitivity: f32,
    /// Orbit elevation stays within ±(π/2 − epsilon)
    #[serde(default = "default_elevation_epsilon")]
    pub elevation_epsilon: f32,
    /// Free-mode SNAP grid (meters)
    #[serde(default = "default_grid_size")]
    pub grid_size: f32,
    /// Free-mode SNAP angle increment (degrees)
    #[serde(default = "default_angle_increment")]
    pub angle_increment: f32,
}

fn default_distance() -> f32 { 5.0 }
fn default_max_ray_distance() -> f32 { 10_000.0 }
fn default_grazing_cos() -> f32 { 0.0175 }
fn default_orbit_sensitivity() -> f32 { 0.01 }
fn default_elevation_epsilon() -> f32 { 1e-3 }
fn default_grid_size() -> f32 { 0.25 }
fn default_angle_increment() -> f32 { 15.0 }

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            default_distance: default_distance(),
            max_ray_distance: default_max_ray_distance(),
            grazing_cos: default_grazing_cos(),
            orbit_sensitivity: default_orbit_sensitivity(),
            elevation_epsilon: default_elevation_epsilon(),
            grid_size: default_grid_size(),
            angle_increment: default_angle_increment(),
        }
    }
}

// ============================================================================
// 3. ControlConfig - Wheel steps, drag sensitivity profiles
// ============================================================================

/// Drag sensitivity for one parameter.
///
/// Effective sensitivity is `base`, scaled by the pointer speed multiplier
/// (weighted by `speed_factor`) and the accumulated drag multiplier
/// (weighted by `accel_factor`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityProfile {
    pub base: f32,
    pub speed_factor: f32,
    pub accel_factor: f32,
}

impl SensitivityProfile {
    pub const fn new(base: f32, speed_factor: f32, accel_factor: f32) -> Self {
        Self { base, speed_factor, accel_factor }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityProfiles {
    #[serde(default = "profile_distance")]
    pub distance: SensitivityProfile,
    #[serde(default = "profile_power")]
    pub power: SensitivityProfile,
    #[serde(default = "profile_scale")]
    pub scale: SensitivityProfile,
    #[serde(default = "profile_spread")]
    pub spread: SensitivityProfile,
    #[serde(default = "profile_blend")]
    pub blend: SensitivityProfile,
    #[serde(default = "profile_temperature")]
    pub temperature: SensitivityProfile,
}

fn profile_distance() -> SensitivityProfile { SensitivityProfile::new(0.015, 1.5, 2.0) }
fn profile_power() -> SensitivityProfile { SensitivityProfile::new(0.008, 1.2, 1.8) }
fn profile_scale() -> SensitivityProfile { SensitivityProfile::new(0.004, 1.0, 1.5) }
fn profile_spread() -> SensitivityProfile { SensitivityProfile::new(0.001, 0.8, 1.2) }
fn profile_blend() -> SensitivityProfile { SensitivityProfile::new(0.002, 0.9, 1.3) }
fn profile_temperature() -> SensitivityProfile { SensitivityProfile::new(0.006, 1.3, 1.6) }

impl Default for SensitivityProfiles {
    fn default() -> Self {
        Self {
            distance: profile_distance(),
            power: profile_power(),
            scale: profile_scale(),
            spread: profile_spread(),
            blend: profile_blend(),
            temperature: profile_temperature(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Divisor applied to every step while PRECISION is held
    #[serde(default = "default_precision_factor")]
    pub precision_factor: f32,
    /// Multiplicative distance change per wheel tick (0.1 = 10%)
    #[serde(default = "default_ratio_step")]
    pub distance_step: f32,
    /// Multiplicative size change per wheel tick
    #[serde(default = "default_ratio_step")]
    pub scale_step: f32,
    /// Power step per tick as a fraction of the current power's decade
    #[serde(default = "default_power_decade_fraction")]
    pub power_decade_fraction: f32,
    /// Degrees per wheel tick
    #[serde(default = "default_spread_step")]
    pub spread_step: f32,
    #[serde(default = "default_blend_step")]
    pub blend_step: f32,
    /// Kelvin per wheel tick
    #[serde(default = "default_temperature_step")]
    pub temperature_step: f32,
    #[serde(default)]
    pub sensitivity: SensitivityProfiles,
}

fn default_precision_factor() -> f32 { 10.0 }
fn default_ratio_step() -> f32 { 0.1 }
fn default_power_decade_fraction() -> f32 { 0.1 }
fn default_spread_step() -> f32 { 1.0 }
fn default_blend_step() -> f32 { 0.01 }
fn default_temperature_step() -> f32 { 100.0 }

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            precision_factor: default_precision_factor(),
            distance_step: default_ratio_step(),
            scale_step: default_ratio_step(),
            power_decade_fraction: default_power_decade_fraction(),
            spread_step: default_spread_step(),
            blend_step: default_blend_step(),
            temperature_step: default_temperature_step(),
            sensitivity: SensitivityProfiles::default(),
        }
    }
}

// ============================================================================
// 4. OverlayConfig - Feedback drawing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Segments per orbit arc polyline
    #[serde(default = "default_arc_segments")]
    pub arc_segments: u32,
    #[serde(default = "default_true")]
    pub show_orbit_arcs: bool,
    #[serde(default = "default_true")]
    pub show_text: bool,
    /// Cursor glyph radius (meters)
    #[serde(default = "default_cursor_size")]
    pub cursor_size: f32,
}

fn default_arc_segments() -> u32 { 32 }
fn default_true() -> bool { true }
fn default_cursor_size() -> f32 { 0.1 }

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            arc_segments: default_arc_segments(),
            show_orbit_arcs: true,
            show_text: true,
            cursor_size: default_cursor_size(),
        }
    }
}

// ============================================================================
// 5. Loading
// ============================================================================

impl RigConfig {
    /// Default config location (`~/.lightrig/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".lightrig").join("config.toml"))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load a config file; I/O and parse errors are returned.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| RigError::ConfigIo(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` (or the default location), falling back to defaults
    /// when the file is missing or invalid.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Self::default(),
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded LightRig config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Failed to load config {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    /// Write the config as pretty TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RigError::ConfigIo(e.to_string()))?;
        }
        fs::write(path, self.to_toml_string()?).map_err(|e| RigError::ConfigIo(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = RigConfig::from_toml_str("").unwrap();
        assert_eq!(config, RigConfig::default());
    }

    #[test]
    fn test_defaults_round_trip() {
        let text = RigConfig::default().to_toml_string().unwrap();
        assert_eq!(RigConfig::from_toml_str(&text).unwrap(), RigConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = RigConfig::from_toml_str(
            r#"
            [positioning]
            default_distance = 3.5

            [control.sensitivity.power]
            base = 0.02
            speed_factor = 1.0
            accel_factor = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(config.positioning.default_distance, 3.5);
        assert_eq!(config.positioning.grazing_cos, 0.0175);
        assert_eq!(config.control.sensitivity.power.base, 0.02);
        assert_eq!(config.control.sensitivity.distance, profile_distance());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(RigConfig::from_toml_str("positioning = 3"), Err(RigError::Config(_))));
    }

    #[test]
    fn test_save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = RigConfig::default();
        config.positioning.grid_size = 0.5;
        config.overlay.arc_segments = 12;
        config.save(&path).unwrap();

        assert_eq!(RigConfig::load(&path).unwrap(), config);
        assert_eq!(RigConfig::load_or_default(Some(path.as_path())), config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = RigConfig::load_or_default(Some(Path::new("/nonexistent/lightrig/config.toml")));
        assert_eq!(config, RigConfig::default());
    }
}

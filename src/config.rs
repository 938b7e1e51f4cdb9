//! Per-frame inputs and output of the renderer
//!
//! `RenderConfig` and `AnimationState` are built by the caller for every frame
//! and are read-only inside the pipeline. `RenderFrame` is what comes back.

use crate::error::ConfigError;
use crate::math3d::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// How occupied cells are colored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Green,
    Rainbow,
    Synthwave,
    Depth,
    White,
}

impl ColorMode {
    /// All modes in key order (1-5)
    pub const ALL: [ColorMode; 5] = [
        ColorMode::Green,
        ColorMode::Rainbow,
        ColorMode::Synthwave,
        ColorMode::Depth,
        ColorMode::White,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColorMode::Green => "green",
            ColorMode::Rainbow => "rainbow",
            ColorMode::Synthwave => "synthwave",
            ColorMode::Depth => "depth",
            ColorMode::White => "white",
        }
    }

    /// Mode for a zero-based key index, `None` past the last mode
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownColorMode(s.to_string()))
    }
}

pub const DEFAULT_WIDTH: usize = 80;
pub const DEFAULT_HEIGHT: usize = 24;

/// Immutable description of one frame: grid, look, geometry and sampling density
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Grid width in character cells
    pub width: usize,
    /// Grid height in character cells
    pub height: usize,
    pub color_mode: ColorMode,
    /// Distance from the strip's center line to the origin
    pub major_radius: f64,
    /// Half the width of the strip's cross-section
    pub half_width: f64,
    pub u_step: f64,
    pub v_step: f64,
    pub view_distance: f64,
    /// Direction towards the light. Normalized on use; zero falls back to +Z.
    pub light_direction: [f64; 3],
}

impl RenderConfig {
    /// Reference configuration for a `width` x `height` grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            color_mode: ColorMode::Green,
            major_radius: 2.0,
            half_width: 0.8,
            u_step: 0.07,
            v_step: 0.05,
            view_distance: 5.0,
            light_direction: [0.0, 1.0, -1.0],
        }
    }

    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    pub fn with_steps(mut self, u_step: f64, v_step: f64) -> Self {
        self.u_step = u_step;
        self.v_step = v_step;
        self
    }

    pub fn with_light(mut self, direction: [f64; 3]) -> Self {
        self.light_direction = direction;
        self
    }

    /// Number of cells in the grid
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn light(&self) -> Vec3 {
        let [x, y, z] = self.light_direction;
        Vec3::new(x, y, z)
    }

    /// True when both sampling steps can drive a terminating sweep
    pub fn has_valid_steps(&self) -> bool {
        is_positive(self.u_step) && is_positive(self.v_step)
    }

    /// Boundary check for values arriving from files, flags or remote input.
    ///
    /// The renderer itself never fails; anything rejected here would otherwise
    /// produce an empty or meaningless frame.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("u_step", self.u_step), ("v_step", self.v_step)] {
            if !is_positive(value) {
                return Err(ConfigError::InvalidStep { name, value });
            }
        }
        for (name, value) in [
            ("major_radius", self.major_radius),
            ("half_width", self.half_width),
        ] {
            if !is_positive(value) {
                return Err(ConfigError::InvalidGeometry { name, value });
            }
        }
        if !(self.view_distance.is_finite() && self.view_distance >= 0.0) {
            return Err(ConfigError::InvalidViewDistance(self.view_distance));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing fields take default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

#[inline]
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Rotation angles in radians. Any range is fine; only sin/cos are taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    pub angle_a: f64,
    pub angle_b: f64,
    pub angle_c: f64,
}

impl AnimationState {
    pub const fn new(angle_a: f64, angle_b: f64, angle_c: f64) -> Self {
        Self {
            angle_a,
            angle_b,
            angle_c,
        }
    }
}

/// One fully composed frame, control sequences included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderFrame {
    pub output: String,
}

impl RenderFrame {
    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn into_string(self) -> String {
        self.output
    }
}

impl fmt::Display for RenderFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output)
    }
}

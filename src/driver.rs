//! Animation driver state
//!
//! Everything interactive (pause, speed, color mode, light position, drag
//! rotation) lives here as explicit state changed by [`Command`]s between
//! frames. The renderer never sees any of it except through the
//! `(RenderConfig, AnimationState)` pair from [`DriverState::frame_inputs`].

use crate::config::{AnimationState, ColorMode, RenderConfig};
use serde::Deserialize;

/// Auto-rotation rates in radians per second, before the speed multiplier
pub const ROTATION_RATES: [f64; 3] = [0.4, 0.5, 0.3];

pub const SPEED_STEP: f64 = 0.2;
pub const MIN_SPEED: f64 = 0.2;
pub const MAX_SPEED: f64 = 3.0;

/// Radians of rotation per pixel of drag
pub const DRAG_SENSITIVITY: f64 = 0.008;

/// Seconds after a drag ends before auto-rotation resumes
pub const AUTO_ROTATE_DELAY: f64 = 2.0;

/// A state transition requested by the host (keyboard, socket, MQTT...)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    TogglePause,
    SelectColor { mode: ColorMode },
    Faster,
    Slower,
    /// Pointer position in [-1, 1]², +y up. Moves the light.
    PointLight { x: f64, y: f64 },
    DragStart,
    /// Pointer offset in pixels from where the drag started
    DragMove { dx: f64, dy: f64 },
    DragEnd,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    angle_a: f64,
    angle_b: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverState {
    angles: AnimationState,
    speed: f64,
    paused: bool,
    color_mode: ColorMode,
    pointer: (f64, f64),
    drag: Option<DragAnchor>,
    auto_rotate: bool,
    resume_in: Option<f64>,
    quit: bool,
}

impl Default for DriverState {
    fn default() -> Self {
        Self {
            angles: AnimationState::default(),
            speed: 1.0,
            paused: false,
            color_mode: ColorMode::Green,
            pointer: (0.0, 1.0),
            drag: None,
            auto_rotate: true,
            resume_in: None,
            quit: false,
        }
    }
}

impl DriverState {
    pub fn new(color_mode: ColorMode) -> Self {
        Self {
            color_mode,
            ..Self::default()
        }
    }

    pub fn angles(&self) -> AnimationState {
        self.angles
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::TogglePause => self.paused = !self.paused,
            Command::SelectColor { mode } => self.color_mode = mode,
            Command::Faster => self.speed = (self.speed + SPEED_STEP).min(MAX_SPEED),
            Command::Slower => self.speed = (self.speed - SPEED_STEP).max(MIN_SPEED),
            Command::PointLight { x, y } => {
                // While dragging the pointer rotates instead of lighting
                if self.drag.is_none() && x.is_finite() && y.is_finite() {
                    self.pointer = (x, y);
                }
            },
            Command::DragStart => {
                self.drag = Some(DragAnchor {
                    angle_a: self.angles.angle_a,
                    angle_b: self.angles.angle_b,
                });
                self.auto_rotate = false;
                self.resume_in = None;
            },
            Command::DragMove { dx, dy } => {
                if let Some(anchor) = self.drag {
                    if dx.is_finite() && dy.is_finite() {
                        self.angles.angle_b = anchor.angle_b + dx * DRAG_SENSITIVITY;
                        self.angles.angle_a = anchor.angle_a + dy * DRAG_SENSITIVITY;
                    }
                }
            },
            Command::DragEnd => {
                if self.drag.take().is_some() {
                    self.resume_in = Some(AUTO_ROTATE_DELAY);
                }
            },
            Command::Quit => self.quit = true,
        }
    }

    /// Advance wall-clock time by `dt` seconds
    pub fn advance(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        if let Some(remaining) = self.resume_in {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.resume_in = None;
                self.auto_rotate = true;
            } else {
                self.resume_in = Some(remaining);
            }
        }

        if !self.paused && self.auto_rotate {
            let step = dt * self.speed;
            self.angles.angle_a += ROTATION_RATES[0] * step;
            self.angles.angle_b += ROTATION_RATES[1] * step;
            self.angles.angle_c += ROTATION_RATES[2] * step;
        }
    }

    /// Light direction from the pointer: (x, y, -1), normalized
    pub fn light_direction(&self) -> [f64; 3] {
        let (x, y) = self.pointer;
        let len = (x * x + y * y + 1.0).sqrt();
        [x / len, y / len, -1.0 / len]
    }

    /// Inputs for the next frame, layered over `base`
    pub fn frame_inputs(&self, base: &RenderConfig) -> (RenderConfig, AnimationState) {
        let config = base
            .clone()
            .with_color_mode(self.color_mode)
            .with_light(self.light_direction());
        (config, self.angles)
    }
}

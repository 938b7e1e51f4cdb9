//! Rotating Mobius strip rendered as 24-bit colored text glyphs.
//!
//! The core is [`Renderer::render`]: given a [`RenderConfig`] and an
//! [`AnimationState`] it produces one [`RenderFrame`] of ANSI text for a
//! fixed-size character grid. Identical inputs give byte-identical output.
//!
//! [`driver`], [`control`] and [`mqtt`] hold the interactive side (pause,
//! speed, color mode, light, drag rotation) as explicit state transitions
//! applied between frames.

pub mod buffer_pool;
pub mod color;
pub mod composer;
pub mod config;
pub mod control;
pub mod driver;
pub mod error;
pub mod math3d;
pub mod mqtt;
pub mod projection;
pub mod renderer;
pub mod shading;
pub mod surface;
pub mod terminal;
pub mod util;
pub mod visibility;

pub use config::{AnimationState, ColorMode, RenderConfig, RenderFrame};
pub use driver::{Command, DriverState};
pub use error::ConfigError;
pub use renderer::{render_frame, Renderer};

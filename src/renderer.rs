//! Per-frame rendering pipeline
//!
//! sweep (u, v) -> rotate -> project -> depth test -> shade winners -> compose
//!
//! A [`Renderer`] owns the scratch buffers, so the same instance must not be
//! driven from two threads at once. Independent outputs each get their own.

use crate::buffer_pool::{BufferPool, CellShade};
use crate::composer;
use crate::config::{AnimationState, RenderConfig, RenderFrame};
use crate::math3d::Rotation;
use crate::projection::Projector;
use crate::shading::{glyph_index, Light};
use crate::surface::MobiusStrip;
use crate::visibility;

/// Typical bytes per cell: one 24-bit color sequence plus a glyph
const BYTES_PER_CELL_HINT: usize = 20;

/// Rendering context. Holds reusable buffers and nothing that affects output:
/// identical inputs always give byte-identical frames.
#[derive(Debug, Default)]
pub struct Renderer {
    pool: BufferPool,
    warned_invalid_steps: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one frame into a new string
    pub fn render(&mut self, config: &RenderConfig, state: &AnimationState) -> RenderFrame {
        let mut output = String::with_capacity(config.cell_count() * BYTES_PER_CELL_HINT);
        self.render_into(config, state, &mut output);
        RenderFrame { output }
    }

    /// Render one frame into `out`, replacing its contents but keeping its allocation
    pub fn render_into(&mut self, config: &RenderConfig, state: &AnimationState, out: &mut String) {
        out.clear();

        if !config.has_valid_steps() && !self.warned_invalid_steps {
            log::warn!(
                "Sampling steps must be positive (u_step={}, v_step={}); rendering background only",
                config.u_step,
                config.v_step
            );
            self.warned_invalid_steps = true;
        }

        let strip = MobiusStrip::new(config.major_radius, config.half_width);
        let projector = Projector::new(config, &strip);
        let light = Light::from_config(config);
        let rotation = Rotation::new(state.angle_a, state.angle_b, state.angle_c);
        let width = config.width;

        let mut buffers = self.pool.acquire(config.cell_count());

        strip.sweep(config.u_step, config.v_step, |sample| {
            let Some(screen) = projector.project(rotation.apply(sample.point)) else {
                return;
            };

            visibility::resolve(&mut buffers, screen.index(width), screen.inv_depth, || {
                let normal = sample.normal().map(|n| rotation.apply(n));
                let intensity = light.intensity(normal);
                CellShade {
                    glyph: glyph_index(intensity),
                    luminance: intensity,
                    param_u: sample.u,
                    normalized_depth: projector.normalize_depth(screen.inv_depth),
                }
            });
        });

        let composed = composer::compose(out, &buffers, width, config.height, config.color_mode);
        debug_assert!(composed.is_ok(), "writing into a String cannot fail");
    }
}

/// One-shot render with a throwaway context
pub fn render_frame(config: &RenderConfig, state: &AnimationState) -> RenderFrame {
    Renderer::new().render(config, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{visible_text, ROW_SEPARATOR};
    use crate::config::ColorMode;
    use crate::shading::GLYPH_RAMP;
    use crate::util::Rng;

    fn assert_grid_shape(output: &str, width: usize, height: usize) {
        let rows: Vec<&str> = output.split(ROW_SEPARATOR).collect();
        assert_eq!(rows.len(), height, "row count for {}x{}", width, height);
        for row in rows {
            assert_eq!(visible_text(row).chars().count(), width, "row width for {}x{}", width, height);
        }
    }

    #[test]
    fn test_frame_has_grid_shape() {
        let mut renderer = Renderer::new();
        let state = AnimationState::new(0.4, 1.1, -0.3);
        for (width, height) in [(1, 1), (4, 2), (80, 24), (33, 17), (120, 40), (0, 5)] {
            let frame = renderer.render(&RenderConfig::new(width, height), &state);
            assert!(frame.as_str().starts_with("\x1b[H"));
            assert!(frame.as_str().ends_with("\x1b[0m"));
            assert_grid_shape(frame.as_str(), width, height);
        }
    }

    #[test]
    fn test_zero_height_is_empty_frame() {
        let frame = render_frame(&RenderConfig::new(7, 0), &AnimationState::default());
        assert_eq!(frame.as_str(), "\x1b[H\x1b[0m");
    }

    #[test]
    fn test_render_is_deterministic() {
        let config = RenderConfig::new(64, 20).with_color_mode(ColorMode::Rainbow);
        let state = AnimationState::new(1.3, 0.2, 2.7);

        let mut renderer = Renderer::new();
        let first = renderer.render(&config, &state);
        // Different frame in between must not leak into the next one
        renderer.render(&config, &AnimationState::new(0.0, 0.5, 0.0));
        let second = renderer.render(&config, &state);
        let fresh = render_frame(&config, &state);

        assert_eq!(first, second);
        assert_eq!(first, fresh);
    }

    #[test]
    fn test_resize_between_frames() {
        let mut renderer = Renderer::new();
        let state = AnimationState::new(0.3, 0.6, 0.9);
        let small = RenderConfig::new(20, 10);
        let large = RenderConfig::new(90, 30);

        let a = renderer.render(&small, &state);
        assert_grid_shape(a.as_str(), 20, 10);
        let b = renderer.render(&large, &state);
        assert_grid_shape(b.as_str(), 90, 30);
        let c = renderer.render(&small, &state);
        assert_eq!(a, c);
    }

    #[test]
    fn test_surface_outside_viewport_gives_background() {
        // A ring hundreds of cells across, centered on a 4x2 grid
        let mut config = RenderConfig::new(4, 2);
        config.major_radius = 1000.0;
        let frame = render_frame(&config, &AnimationState::default());
        assert_eq!(frame.as_str(), "\x1b[H    \r\n    \x1b[0m");
    }

    #[test]
    fn test_single_cell_default_frame() {
        let config = RenderConfig::new(1, 1);
        let state = AnimationState::default();
        let frame = render_frame(&config, &state);

        let visible = visible_text(frame.as_str());
        assert_eq!(visible.chars().count(), 1);
        // The strip surrounds the center cell, so it is always hit
        assert!(frame.as_str().starts_with("\x1b[H\x1b[38;2;0;"));
        let glyph = visible.as_bytes()[0];
        assert!(GLYPH_RAMP[1..].contains(&glyph));

        for _ in 0..3 {
            assert_eq!(render_frame(&config, &state), frame);
        }
    }

    #[test]
    fn test_invalid_steps_render_background() {
        let config = RenderConfig::new(4, 2).with_steps(0.0, 0.05);
        let frame = render_frame(&config, &AnimationState::default());
        assert_eq!(frame.as_str(), "\x1b[H    \r\n    \x1b[0m");

        let config = RenderConfig::new(4, 2).with_steps(0.07, -0.05);
        let frame = render_frame(&config, &AnimationState::default());
        assert_eq!(frame.as_str(), "\x1b[H    \r\n    \x1b[0m");
    }

    #[test]
    fn test_color_mode_only_changes_colors() {
        let state = AnimationState::new(0.9, 0.1, 0.4);
        let base = RenderConfig::new(60, 20);
        let reference = visible_text(render_frame(&base, &state).as_str());
        assert!(reference.chars().any(|c| c != ' ' && c != '.'));

        for mode in ColorMode::ALL {
            let frame = render_frame(&base.clone().with_color_mode(mode), &state);
            assert_eq!(visible_text(frame.as_str()), reference, "mode {}", mode);
        }
    }

    #[test]
    fn test_zero_light_uses_default_direction() {
        let state = AnimationState::new(0.5, 0.5, 0.5);
        let zero = RenderConfig::new(40, 16).with_light([0.0, 0.0, 0.0]);
        let default = RenderConfig::new(40, 16).with_light([0.0, 0.0, 1.0]);
        assert_eq!(render_frame(&zero, &state), render_frame(&default, &state));
    }

    #[test]
    fn test_occupied_cells_use_lit_glyphs() {
        // Every drawn cell has at least ambient light, so never the blank glyph
        let mut rng = Rng::new(99);
        let mut renderer = Renderer::new();
        let config = RenderConfig::new(48, 18).with_color_mode(ColorMode::White);
        for _ in 0..8 {
            let state = AnimationState::new(
                rng.range_f64(-10.0, 10.0),
                rng.range_f64(-10.0, 10.0),
                rng.range_f64(-10.0, 10.0),
            );
            let frame = renderer.render(&config, &state);
            for segment in frame.as_str().split("\x1b[38;2;").skip(1) {
                let glyph = segment
                    .split_once('m')
                    .and_then(|(_, rest)| rest.chars().next())
                    .unwrap();
                assert!(glyph != ' ', "colored cell without a glyph");
                assert!(GLYPH_RAMP.contains(&(glyph as u8)) || glyph == '.');
            }
        }
    }

    #[test]
    fn test_render_into_reuses_string() {
        let mut renderer = Renderer::new();
        let config = RenderConfig::new(30, 10);
        let state = AnimationState::new(0.1, 0.2, 0.3);
        let mut out = String::from("stale");
        renderer.render_into(&config, &state, &mut out);
        assert!(out.starts_with("\x1b[H") && out.ends_with("\x1b[0m"));
        assert_eq!(out, renderer.render(&config, &state).output);
    }
}

//! Color utilities: HSL conversion and the per-mode cell colorizer

use crate::buffer_pool::CellShade;
use crate::config::ColorMode;
use std::f64::consts::TAU;

/// Dim cells never go darker than this, so they stay visible on black
pub const MIN_BRIGHTNESS: u8 = 18;

/// Synthwave hue band, in degrees
const SYNTHWAVE_HUE_START: f64 = 180.0;
const SYNTHWAVE_HUE_SPAN: f64 = 140.0;

/// Depth mode maps far to blue (240°) and near to red (0°)
const DEPTH_HUE_FAR: f64 = 240.0;

const LIGHTNESS_BASE: f64 = 0.12;

/// HSL to RGB color conversion
/// h: degrees (wrapped into 0-360), s: 0-1, l: 0-1
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = h.rem_euclid(360.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = l - c / 2.0;

    let (r1, g1, b1) = match h_prime as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (to_channel(r1 + m), to_channel(g1 + m), to_channel(b1 + m))
}

#[inline]
fn to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Intensity as a byte, floored at [`MIN_BRIGHTNESS`]
#[inline]
pub fn brightness(intensity: f64) -> u8 {
    to_channel(intensity).max(MIN_BRIGHTNESS)
}

/// RGB for an occupied cell under the given mode
pub fn colorize(mode: ColorMode, shade: &CellShade) -> (u8, u8, u8) {
    let intensity = shade.luminance;
    match mode {
        ColorMode::Green => (0, brightness(intensity), 0),
        ColorMode::White => {
            let v = brightness(intensity);
            (v, v, v)
        },
        ColorMode::Rainbow => {
            let hue = (shade.param_u / TAU * 360.0).rem_euclid(360.0);
            hsl_to_rgb(hue, 0.9, LIGHTNESS_BASE + intensity * 0.55)
        },
        ColorMode::Synthwave => {
            let t = shade.param_u / TAU;
            let hue = (SYNTHWAVE_HUE_START + t * SYNTHWAVE_HUE_SPAN).rem_euclid(360.0);
            hsl_to_rgb(hue, 0.85, LIGHTNESS_BASE + intensity * 0.5)
        },
        ColorMode::Depth => {
            let hue = (1.0 - shade.normalized_depth) * DEPTH_HUE_FAR;
            hsl_to_rgb(hue, 0.8, LIGHTNESS_BASE + intensity * 0.5)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shade(luminance: f64, param_u: f64, normalized_depth: f64) -> CellShade {
        CellShade {
            glyph: 6,
            luminance,
            param_u,
            normalized_depth,
        }
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), (255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), (0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), (0, 0, 255));
        assert_eq!(hsl_to_rgb(60.0, 1.0, 0.5), (255, 255, 0));
        assert_eq!(hsl_to_rgb(300.0, 1.0, 0.5), (255, 0, 255));
    }

    #[test]
    fn test_hsl_grays_and_extremes() {
        assert_eq!(hsl_to_rgb(200.0, 0.0, 0.5), (128, 128, 128));
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.0), (0, 0, 0));
        assert_eq!(hsl_to_rgb(0.0, 1.0, 1.0), (255, 255, 255));
    }

    #[test]
    fn test_hsl_wraps_hue() {
        assert_eq!(hsl_to_rgb(360.0, 1.0, 0.5), hsl_to_rgb(0.0, 1.0, 0.5));
        assert_eq!(hsl_to_rgb(-120.0, 1.0, 0.5), hsl_to_rgb(240.0, 1.0, 0.5));
    }

    #[test]
    fn test_green_and_white_floor() {
        assert_eq!(colorize(ColorMode::Green, &shade(0.0, 0.0, 0.0)), (0, MIN_BRIGHTNESS, 0));
        assert_eq!(colorize(ColorMode::Green, &shade(1.0, 0.0, 0.0)), (0, 255, 0));
        assert_eq!(colorize(ColorMode::White, &shade(0.5, 0.0, 0.0)), (128, 128, 128));
        assert_eq!(
            colorize(ColorMode::White, &shade(0.01, 0.0, 0.0)),
            (MIN_BRIGHTNESS, MIN_BRIGHTNESS, MIN_BRIGHTNESS)
        );
    }

    #[test]
    fn test_rainbow_follows_u() {
        // u = 0 is red, u = 2π/3 is green
        let (r, g, b) = colorize(ColorMode::Rainbow, &shade(0.7, 0.0, 0.0));
        assert!(r > g && r > b);
        let (r, g, b) = colorize(ColorMode::Rainbow, &shade(0.7, TAU / 3.0, 0.0));
        assert!(g > r && g > b);
    }

    #[test]
    fn test_synthwave_stays_in_band() {
        // Hue 180 (cyan) at u = 0, 320 (magenta-pink) near the end of the turn
        let (r, g, b) = colorize(ColorMode::Synthwave, &shade(0.7, 0.0, 0.0));
        assert!(g == b && r < g);
        let (r, g, b) = colorize(ColorMode::Synthwave, &shade(0.7, TAU * 0.999, 0.0));
        assert!(r > g && b > g);
    }

    #[test]
    fn test_depth_near_red_far_blue() {
        let (r, _, b) = colorize(ColorMode::Depth, &shade(0.7, 0.0, 1.0));
        assert!(r > b);
        let (r, _, b) = colorize(ColorMode::Depth, &shade(0.7, 0.0, 0.0));
        assert!(b > r);
    }
}

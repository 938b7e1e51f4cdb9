//! Bilateral Blinn-Phong lighting and the glyph ramp
//!
//! The strip has no consistent outside, so both dot products use their
//! absolute value. A face turned away from the light is shaded like the same
//! face turned towards it instead of going black.

use crate::config::RenderConfig;
use crate::math3d::Vec3;

/// Characters from faint to dense
pub const GLYPH_RAMP: &[u8; 13] = b" .,-~:;=!*#$@";

/// Highest valid glyph index
pub const RAMP_MAX: u8 = (GLYPH_RAMP.len() - 1) as u8;

pub const AMBIENT: f64 = 0.06;
pub const DIFFUSE_WEIGHT: f64 = 0.65;
pub const SPECULAR_WEIGHT: f64 = 0.55;

/// Used when the configured light direction has zero length
pub const DEFAULT_LIGHT: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// The camera looks down -Z
pub const VIEW_DIRECTION: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// Light state for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    direction: Vec3,
    half_vector: Vec3,
}

impl Light {
    pub fn new(direction: Vec3) -> Self {
        let direction = direction.normalize_or(DEFAULT_LIGHT);
        let half_vector = (direction + VIEW_DIRECTION).normalize_or(DEFAULT_LIGHT);
        Self {
            direction,
            half_vector,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.light())
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn half_vector(&self) -> Vec3 {
        self.half_vector
    }

    /// Brightness in [0, 1] for a rotated unit normal.
    ///
    /// A missing normal (degenerate sample) gets ambient light only.
    #[inline]
    pub fn intensity(&self, normal: Option<Vec3>) -> f64 {
        let Some(n) = normal else {
            return AMBIENT;
        };

        let diffuse = n.dot(&self.direction).abs();

        // s^16 by four squarings
        let s = n.dot(&self.half_vector).abs();
        let s2 = s * s;
        let s4 = s2 * s2;
        let s8 = s4 * s4;
        let specular = s8 * s8;

        (AMBIENT + DIFFUSE_WEIGHT * diffuse + SPECULAR_WEIGHT * specular).clamp(0.0, 1.0)
    }
}

/// Nearest ramp index for an intensity, clamped to the ramp
#[inline]
pub fn glyph_index(intensity: f64) -> u8 {
    let scaled = (intensity * RAMP_MAX as f64).round();
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else {
        (scaled as u8).min(RAMP_MAX)
    }
}

#[inline]
pub fn glyph(index: u8) -> char {
    GLYPH_RAMP[(index.min(RAMP_MAX)) as usize] as char
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_light_is_normalized() {
        let light = Light::new(Vec3::new(0.0, 1.0, -1.0));
        assert_abs_diff_eq!(light.direction().length(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(light.half_vector().length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_light_falls_back_to_default() {
        let light = Light::new(Vec3::zero());
        assert_eq!(light.direction(), DEFAULT_LIGHT);
        // light + view cancels out, so the half vector falls back too
        assert_eq!(light.half_vector(), DEFAULT_LIGHT);
    }

    #[test]
    fn test_lighting_is_two_sided() {
        let light = Light::new(Vec3::new(0.3, 0.5, -0.8));
        let n = Vec3::new(0.2, -0.4, 0.9).normalize_or(DEFAULT_LIGHT);
        assert_abs_diff_eq!(light.intensity(Some(n)), light.intensity(Some(-n)), epsilon = 1e-12);
    }

    #[test]
    fn test_specular_matches_powi() {
        let light = Light::new(Vec3::new(0.0, 1.0, -1.0));
        let n = Vec3::new(0.1, 0.6, -0.3).normalize_or(DEFAULT_LIGHT);
        let diffuse = n.dot(&light.direction()).abs();
        let specular = n.dot(&light.half_vector()).abs().powi(16);
        let expected = (AMBIENT + DIFFUSE_WEIGHT * diffuse + SPECULAR_WEIGHT * specular).min(1.0);
        assert_abs_diff_eq!(light.intensity(Some(n)), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_intensity_is_clamped() {
        // Normal along the half vector saturates diffuse + specular
        let light = Light::new(Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(light.intensity(Some(Vec3::new(0.0, 0.0, 1.0))), 1.0);
        for i in 0..64 {
            let t = i as f64 * 0.1;
            let n = Vec3::new(t.cos(), t.sin(), (t * 0.7).sin()).normalize_or(DEFAULT_LIGHT);
            let v = light.intensity(Some(n));
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_degenerate_normal_is_ambient() {
        let light = Light::new(Vec3::new(0.0, 1.0, -1.0));
        assert_eq!(light.intensity(None), AMBIENT);
    }

    #[test]
    fn test_glyph_index_rounds_and_clamps() {
        assert_eq!(glyph_index(0.0), 0);
        assert_eq!(glyph_index(1.0), RAMP_MAX);
        assert_eq!(glyph_index(0.5), 6);
        assert_eq!(glyph_index(0.06), 1);
        assert_eq!(glyph_index(2.0), RAMP_MAX);
        assert_eq!(glyph_index(-1.0), 0);
        assert_eq!(glyph_index(f64::NAN), 0);
    }

    #[test]
    fn test_ramp_ends() {
        assert_eq!(glyph(0), ' ');
        assert_eq!(glyph(RAMP_MAX), '@');
        assert_eq!(glyph(200), '@');
    }
}

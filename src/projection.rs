//! Perspective projection from object space to character cells

use crate::config::RenderConfig;
use crate::math3d::Vec3;
use crate::surface::MobiusStrip;

/// Fraction of the shorter grid axis the surface spans at the camera constant
const SCREEN_FILL: f64 = 0.18;

/// Character cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 0.5;

/// A sample that landed inside the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: usize,
    pub y: usize,
    /// 1 / camera depth; larger is nearer
    pub inv_depth: f64,
}

impl ScreenPoint {
    #[inline]
    pub fn index(&self, width: usize) -> usize {
        self.y * width + self.x
    }
}

/// Fixed perspective camera looking down +Z at the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    width: usize,
    height: usize,
    half_width: f64,
    half_height: f64,
    /// Distance added to every rotated z so the whole surface sits in front of the eye
    camera_distance: f64,
    /// Projection scale in cells per unit at unit inverse depth
    scale: f64,
    min_inv_depth: f64,
    max_inv_depth: f64,
}

impl Projector {
    pub fn new(config: &RenderConfig, strip: &MobiusStrip) -> Self {
        let extent = strip.extent();
        let camera_distance = config.view_distance + extent + 1.0;
        let shorter_axis = (config.width as f64).min(config.height as f64 * 2.0);

        Self {
            width: config.width,
            height: config.height,
            half_width: config.width as f64 / 2.0,
            half_height: config.height as f64 / 2.0,
            camera_distance,
            scale: shorter_axis * camera_distance * SCREEN_FILL,
            min_inv_depth: 1.0 / (camera_distance + extent),
            max_inv_depth: 1.0 / (camera_distance - extent),
        }
    }

    #[inline]
    pub fn camera_distance(&self) -> f64 {
        self.camera_distance
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Theoretical inverse-depth bounds for any point of the surface
    #[inline]
    pub fn inv_depth_range(&self) -> (f64, f64) {
        (self.min_inv_depth, self.max_inv_depth)
    }

    /// Project a rotated point. Returns `None` outside the grid or behind the eye.
    #[inline]
    pub fn project(&self, p: Vec3) -> Option<ScreenPoint> {
        let depth = p.z + self.camera_distance;
        if depth <= 0.0 {
            return None;
        }
        let inv_depth = 1.0 / depth;

        // Truncate toward zero: anything in (-1, 0) folds into column or row 0
        let sx = (self.half_width + self.scale * inv_depth * p.x).trunc();
        let sy = (self.half_height - self.scale * inv_depth * p.y * CELL_ASPECT).trunc();

        if sx < 0.0 || sy < 0.0 || sx >= self.width as f64 || sy >= self.height as f64 {
            return None;
        }

        Some(ScreenPoint {
            x: sx as usize,
            y: sy as usize,
            inv_depth,
        })
    }

    /// Linear map of inverse depth onto [0, 1], far to near
    #[inline]
    pub fn normalize_depth(&self, inv_depth: f64) -> f64 {
        let range = self.max_inv_depth - self.min_inv_depth;
        if range <= 0.0 {
            return 0.0;
        }
        ((inv_depth - self.min_inv_depth) / range).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn projector(width: usize, height: usize) -> Projector {
        let config = RenderConfig::new(width, height);
        let strip = MobiusStrip::new(config.major_radius, config.half_width);
        Projector::new(&config, &strip)
    }

    #[test]
    fn test_camera_constants() {
        let p = projector(80, 24);
        // 5 + 2 + 0.8 + 1
        assert_relative_eq!(p.camera_distance(), 8.8, max_relative = 1e-12);
        // min(80, 48) * 8.8 * 0.18
        assert_relative_eq!(p.scale(), 48.0 * 8.8 * 0.18, max_relative = 1e-12);
        let (lo, hi) = p.inv_depth_range();
        assert_relative_eq!(lo, 1.0 / 11.6, max_relative = 1e-12);
        assert_relative_eq!(hi, 1.0 / 6.0, max_relative = 1e-12);
    }

    #[test]
    fn test_origin_lands_in_center_cell() {
        let p = projector(80, 24);
        let s = p.project(Vec3::zero()).unwrap();
        assert_eq!((s.x, s.y), (40, 12));
        assert_eq!(s.index(80), 12 * 80 + 40);
    }

    #[test]
    fn test_vertical_axis_is_compressed_and_flipped() {
        let p = projector(80, 24);
        let right = p.project(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let up = p.project(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        let dx = right.x as f64 - 40.0;
        let dy = 12.0 - up.y as f64;
        assert!(dx > 0.0 && dy > 0.0);
        assert!((dx / 2.0 - dy).abs() <= 1.0);
    }

    #[test]
    fn test_nearer_points_have_larger_inverse_depth() {
        let p = projector(80, 24);
        let near = p.project(Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let far = p.project(Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(near.inv_depth > far.inv_depth);
    }

    #[test]
    fn test_off_grid_points_are_discarded() {
        let p = projector(10, 10);
        assert!(p.project(Vec3::new(1000.0, 0.0, 0.0)).is_none());
        assert!(p.project(Vec3::new(-1000.0, 0.0, 0.0)).is_none());
        assert!(p.project(Vec3::new(0.0, 1000.0, 0.0)).is_none());
        assert!(p.project(Vec3::new(0.0, 0.0, -100.0)).is_none());
    }

    #[test]
    fn test_partial_cell_left_of_grid_folds_into_column_zero() {
        // 10x10: scale 15.84, camera distance 8.8, so screen x = 5 + 1.8 * x at z = 0
        let p = projector(10, 10);
        let s = p.project(Vec3::new(-5.3 / 1.8, 0.0, 0.0)).unwrap();
        assert_eq!((s.x, s.y), (0, 5));

        // Screen x of -1.2 is a whole cell outside
        assert!(p.project(Vec3::new(-6.2 / 1.8, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_partial_cell_above_grid_folds_into_row_zero() {
        // screen y = 5 - 0.9 * y at z = 0
        let p = projector(10, 10);
        let s = p.project(Vec3::new(0.0, 5.3 / 0.9, 0.0)).unwrap();
        assert_eq!((s.x, s.y), (5, 0));
        assert!(p.project(Vec3::new(0.0, 6.2 / 0.9, 0.0)).is_none());
    }

    #[test]
    fn test_empty_grid_projects_nothing() {
        let p = projector(0, 0);
        assert!(p.project(Vec3::zero()).is_none());
    }

    #[test]
    fn test_normalize_depth_bounds() {
        let p = projector(80, 24);
        let (lo, hi) = p.inv_depth_range();
        assert_relative_eq!(p.normalize_depth(lo), 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.normalize_depth(hi), 1.0, epsilon = 1e-12);
        assert_eq!(p.normalize_depth(hi * 2.0), 1.0);
        assert_eq!(p.normalize_depth(0.0), 0.0);
    }
}

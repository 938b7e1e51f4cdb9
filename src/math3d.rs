//! 3D Math Utilities for the Surface Renderer
//!
//! Provides the small amount of vector math the rasterizer needs: vectors,
//! rigid rotations with cached trigonometry, and normalization with a fallback.

use std::ops::{Add, Mul, Neg, Sub};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector
    #[inline]
    pub fn try_normalize(&self) -> Option<Self> {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Some(Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            })
        } else {
            None
        }
    }

    /// Unit vector, substituting `fallback` when this vector cannot be normalized
    #[inline]
    pub fn normalize_or(&self, fallback: Self) -> Self {
        self.try_normalize().unwrap_or(fallback)
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Approximate equality check for floating point comparison
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    #[inline]
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

// ============================================================================
// Rotation
// ============================================================================

/// Rigid rotation about X, then Y, then Z.
///
/// Sine and cosine are computed once per frame so the per-sample cost is
/// only multiplies. Points and normals go through the same `apply`, which is
/// valid for normals because the transform is orthonormal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    sin_x: f64,
    cos_x: f64,
    sin_y: f64,
    cos_y: f64,
    sin_z: f64,
    cos_z: f64,
}

impl Rotation {
    pub fn new(rx: f64, ry: f64, rz: f64) -> Self {
        let (sin_x, cos_x) = rx.sin_cos();
        let (sin_y, cos_y) = ry.sin_cos();
        let (sin_z, cos_z) = rz.sin_cos();
        Self {
            sin_x,
            cos_x,
            sin_y,
            cos_y,
            sin_z,
            cos_z,
        }
    }

    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn apply(&self, v: Vec3) -> Vec3 {
        // X axis
        let y1 = v.y * self.cos_x - v.z * self.sin_x;
        let z1 = v.y * self.sin_x + v.z * self.cos_x;
        // Y axis
        let x2 = v.x * self.cos_y + z1 * self.sin_y;
        let z2 = -v.x * self.sin_y + z1 * self.cos_y;
        // Z axis
        Vec3 {
            x: x2 * self.cos_z - y1 * self.sin_z,
            y: x2 * self.sin_z + y1 * self.cos_z,
            z: z2,
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

//! Mobius strip parameterization and the (u, v) sampling sweep
//!
//! Points:  r = R + v·cos(u/2);  P = (r·cos u, r·sin u, v·sin(u/2))
//! for u in [0, 2π) and v in [-w, w].
//!
//! Normals come from the analytic partials ∂P/∂u × ∂P/∂v. The strip is
//! non-orientable, so the sign of a normal carries no meaning; shading uses
//! absolute dot products.

use crate::math3d::Vec3;
use std::f64::consts::TAU;

/// Slack on the inclusive upper end of the v sweep
const V_END_EPSILON: f64 = 1e-9;

/// Mobius strip with a half twist
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MobiusStrip {
    pub major_radius: f64,
    pub half_width: f64,
}

/// Trigonometry shared by every sample on one u line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Meridian {
    pub u: f64,
    cos_u: f64,
    sin_u: f64,
    cos_half_u: f64,
    sin_half_u: f64,
}

impl Meridian {
    pub fn new(u: f64) -> Self {
        let (sin_u, cos_u) = u.sin_cos();
        let (sin_half_u, cos_half_u) = (u * 0.5).sin_cos();
        Self {
            u,
            cos_u,
            sin_u,
            cos_half_u,
            sin_half_u,
        }
    }

    /// ∂P/∂v, which depends on u alone
    #[inline]
    pub fn partial_v(&self) -> Vec3 {
        Vec3::new(
            self.cos_half_u * self.cos_u,
            self.cos_half_u * self.sin_u,
            self.sin_half_u,
        )
    }
}

/// One point of the sweep, in object space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub u: f64,
    pub v: f64,
    pub point: Vec3,
    radius: f64,
    meridian: Meridian,
}

impl SurfaceSample {
    /// ∂P/∂u at this sample
    #[inline]
    pub fn partial_u(&self) -> Vec3 {
        let m = &self.meridian;
        let d_radius = -self.v * m.sin_half_u * 0.5;
        Vec3::new(
            d_radius * m.cos_u - self.radius * m.sin_u,
            d_radius * m.sin_u + self.radius * m.cos_u,
            self.v * m.cos_half_u * 0.5,
        )
    }

    #[inline]
    pub fn partial_v(&self) -> Vec3 {
        self.meridian.partial_v()
    }

    /// Unit normal, or `None` where the partials are parallel.
    ///
    /// Computed on demand so hidden samples never pay for it.
    #[inline]
    pub fn normal(&self) -> Option<Vec3> {
        self.partial_u().cross(&self.partial_v()).try_normalize()
    }
}

impl MobiusStrip {
    pub fn new(major_radius: f64, half_width: f64) -> Self {
        Self {
            major_radius,
            half_width,
        }
    }

    /// Upper bound on any coordinate's magnitude, used to place the camera
    #[inline]
    pub fn extent(&self) -> f64 {
        self.major_radius + self.half_width
    }

    #[inline]
    pub fn sample(&self, meridian: &Meridian, v: f64) -> SurfaceSample {
        let radius = self.major_radius + v * meridian.cos_half_u;
        SurfaceSample {
            u: meridian.u,
            v,
            point: Vec3::new(
                radius * meridian.cos_u,
                radius * meridian.sin_u,
                v * meridian.sin_half_u,
            ),
            radius,
            meridian: *meridian,
        }
    }

    pub fn point(&self, u: f64, v: f64) -> Vec3 {
        self.sample(&Meridian::new(u), v).point
    }

    /// Visit every sample of the parameter grid, u-major.
    ///
    /// u runs over [0, 2π) and v over [-w, w] inclusive. Steps that are not
    /// finite and positive visit nothing.
    pub fn sweep<F>(&self, u_step: f64, v_step: f64, mut visit: F)
    where
        F: FnMut(&SurfaceSample),
    {
        if !(u_step.is_finite() && u_step > 0.0 && v_step.is_finite() && v_step > 0.0) {
            return;
        }

        let v_start = -self.half_width;
        let v_end = self.half_width + V_END_EPSILON;

        for u in (0_u64..).map(|i| i as f64 * u_step).take_while(|&u| u < TAU) {
            let meridian = Meridian::new(u);
            for v in (0_u64..).map(|j| v_start + j as f64 * v_step).take_while(|&v| v <= v_end) {
                visit(&self.sample(&meridian, v));
            }
        }
    }
}

//! Smoothing kernels for the density constraints.
//!
//! Poly6 estimates density, the Spiky gradient drives the constraint
//! gradient, following "Position Based Fluids" (Macklin & Muller 2013) with
//! coefficients normalized for 2D so that densities come out as area
//! densities.

use glam::DVec2;

use crate::types::PARTICLE_RAD;

/// Smoothing radius shared by all density constraints.
pub const KERNEL_RADIUS: f64 = 4.0 * PARTICLE_RAD;

/// Poly6 kernel, W(r, h) = 4/(pi h^8) * (h^2 - r^2)^3 for r <= h.
#[inline]
#[must_use]
pub fn poly6(r_sq: f64, h: f64) -> f64 {
    let h_sq = h * h;
    if r_sq >= h_sq {
        return 0.0;
    }
    let diff = h_sq - r_sq;
    let coefficient = 4.0 / (std::f64::consts::PI * h.powi(8));
    coefficient * diff * diff * diff
}

/// Gradient of the Spiky kernel,
/// grad W(r, h) = -30/(pi h^5) * (h - |r|)^2 * (r / |r|) for r <= h.
#[inline]
#[must_use]
pub fn spiky_gradient(r: DVec2, h: f64) -> DVec2 {
    let r_len = r.length();
    if r_len >= h || r_len < 1e-9 {
        return DVec2::ZERO;
    }
    let diff = h - r_len;
    let coefficient = -30.0 / (std::f64::consts::PI * h.powi(5));
    coefficient * diff * diff * (r / r_len)
}

//! Azimuth / pseudorapidity helpers.

use glam::DVec3;
use std::f64::consts::{PI, TAU};

/// Map an azimuth into `[0, 2π)`.
#[inline]
pub fn wrap_phi(phi: f64) -> f64 {
    let wrapped = phi - TAU * (phi / TAU).floor();
    // A tiny negative input rounds up to exactly 2π.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Signed azimuth difference `phi1 - phi2` folded into `(-π, π]`.
#[inline]
pub fn phi_diff(phi1: f64, phi2: f64) -> f64 {
    let d = phi1 - phi2;
    if d > PI {
        d - TAU
    } else if d <= -PI {
        d + TAU
    } else {
        d
    }
}

/// Azimuth of a direction vector, in `[0, 2π)`.
#[inline]
pub fn phi_of(v: DVec3) -> f64 {
    wrap_phi(v.y.atan2(v.x))
}

/// Pseudorapidity of a direction vector.
///
/// Returns a non-finite value for vectors along the beam axis; callers drop those.
#[inline]
pub fn eta_of(v: DVec3) -> f64 {
    let rho = v.x.hypot(v.y);
    (v.z / rho).asinh()
}

/// Polar angle for a pseudorapidity: `θ = 2·atan(exp(−η))`.
#[inline]
pub fn theta_of_eta(eta: f64) -> f64 {
    2.0 * (-eta).exp().atan()
}

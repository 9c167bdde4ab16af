//! Angle wrapping for heading and bearing residuals.

use core::f64::consts::{PI, TAU};

use nalgebra::SVector;

/// Wrap an angle into `(-PI, PI]`.
///
/// The result differs from the input by a whole number of turns. NaN and
/// infinities are returned as NaN.
pub fn normalize_angle(angle: f64) -> f64 {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Wrap component `index` of `v` in place.
#[inline]
pub fn normalize_component<const D: usize>(v: &mut SVector<f64, D>, index: usize) {
    v[index] = normalize_angle(v[index]);
}

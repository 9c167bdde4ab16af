//! Weighted averaging strategies for sigma points.

use nalgebra::{SMatrix, SVector};

use crate::angle::normalize_angle;

/// Trait for computing weighted averages of sigma points.
pub trait WeightedMean<const D: usize>: Clone {
    /// Compute the weighted mean of the columns of `sigma_points` into `output`.
    fn weighted_mean<const S: usize>(
        &self,
        sigma_points: &SMatrix<f64, D, S>,
        weights: &SVector<f64, S>,
        output: &mut SVector<f64, D>,
    );
}

/// Linear averaging for Euclidean components (default).
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearAveraging;

impl<const D: usize> WeightedMean<D> for LinearAveraging {
    fn weighted_mean<const S: usize>(
        &self,
        sigma_points: &SMatrix<f64, D, S>,
        weights: &SVector<f64, S>,
        output: &mut SVector<f64, D>,
    ) {
        output.fill(0.0);

        for i in 0..S {
            output.axpy(weights[i], &sigma_points.column(i), 1.0);
        }
    }
}

/// Averaging with one angular component.
///
/// Angular deviations are accumulated relative to the first sigma point after
/// wrapping into `(-PI, PI]`, so points straddling the `±PI` seam average to a
/// heading near the seam instead of near zero. The other components are
/// averaged linearly. Weights are expected to sum to one.
#[derive(Clone, Copy, Debug)]
pub struct AngularAveraging {
    /// Row holding the angle.
    pub index: usize,
}

impl AngularAveraging {
    /// Treat row `index` as an angle.
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl<const D: usize> WeightedMean<D> for AngularAveraging {
    fn weighted_mean<const S: usize>(
        &self,
        sigma_points: &SMatrix<f64, D, S>,
        weights: &SVector<f64, S>,
        output: &mut SVector<f64, D>,
    ) {
        LinearAveraging.weighted_mean(sigma_points, weights, output);

        if S == 0 {
            return;
        }

        let reference = sigma_points[(self.index, 0)];
        let mut angle = reference;
        for i in 0..S {
            angle += weights[i] * normalize_angle(sigma_points[(self.index, i)] - reference);
        }
        output[self.index] = normalize_angle(angle);
    }
}

use nalgebra::{Cholesky, Matrix2};

use super::weights::UTWeights;
use crate::state::{
    AugmentedCovariance, AugmentedSigmaMatrix, AugmentedVector, Belief, N_AUG, N_SIGMA, N_X,
};
use crate::ukf::error::UkfError;

/// Sigma-point generator over the noise-augmented CTRV state.
///
/// The state mean is extended with two zero-mean noise terms (longitudinal
/// and yaw acceleration) whose variances form the bottom-right block of the
/// augmented covariance. Points are spread by `sqrt(λ + L)` along each column
/// of the lower Cholesky factor, with `λ = 3 - n_x` and `L = N_AUG`.
#[derive(Clone, Debug)]
pub struct AugmentedSigmaPoints {
    lambda: f64,
    process_noise: Matrix2<f64>,
}

impl AugmentedSigmaPoints {
    /// Create a generator from the process noise standard deviations.
    ///
    /// # Arguments
    /// * `std_a` - Longitudinal acceleration noise (m/s²)
    /// * `std_yawdd` - Yaw acceleration noise (rad/s²)
    pub fn new(std_a: f64, std_yawdd: f64) -> Self {
        Self {
            lambda: 3.0 - N_X as f64,
            process_noise: Matrix2::new(std_a * std_a, 0.0, 0.0, std_yawdd * std_yawdd),
        }
    }

    /// Spreading parameter λ.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Weights matching the generated points. They depend only on λ and `N_AUG`.
    pub fn weights(&self) -> UTWeights<N_SIGMA> {
        UTWeights::from_spread(N_AUG, self.lambda)
    }

    /// Build the augmented mean and block-diagonal augmented covariance.
    pub fn augment(&self, belief: &Belief) -> (AugmentedVector, AugmentedCovariance) {
        let mut mean = AugmentedVector::zeros();
        mean.fixed_rows_mut::<N_X>(0).copy_from(&belief.mean);

        let mut covariance = AugmentedCovariance::zeros();
        covariance
            .fixed_view_mut::<N_X, N_X>(0, 0)
            .copy_from(&belief.covariance);
        covariance
            .fixed_view_mut::<2, 2>(N_X, N_X)
            .copy_from(&self.process_noise);

        (mean, covariance)
    }

    /// Generate the `2 L + 1` augmented sigma points for `belief`.
    ///
    /// Column 0 is the augmented mean; columns `1..=L` and `L+1..=2L` are the
    /// mean plus and minus the scaled square-root columns.
    pub fn generate(&self, belief: &Belief) -> Result<AugmentedSigmaMatrix, UkfError> {
        if !belief.is_finite() {
            return Err(UkfError::NonFiniteState);
        }

        let (mean, covariance) = self.augment(belief);
        let sqrt_cov = Cholesky::new(covariance)
            .ok_or(UkfError::NotPositiveDefinite)?
            .l();
        let scaled_sqrt = sqrt_cov * (self.lambda + N_AUG as f64).sqrt();

        let mut sigma_pts = AugmentedSigmaMatrix::zeros();
        sigma_pts.set_column(0, &mean);

        for i in 0..N_AUG {
            let col = scaled_sqrt.column(i);
            sigma_pts.column_mut(i + 1).copy_from(&(mean + col));
            sigma_pts.column_mut(i + 1 + N_AUG).copy_from(&(mean - col));
        }

        Ok(sigma_pts)
    }
}

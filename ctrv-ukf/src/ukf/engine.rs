use nalgebra::{Cholesky, SMatrix, SVector};

use super::averaging::{LinearAveraging, WeightedMean};
use super::error::UkfError;
use crate::angle::normalize_component;
use crate::measurement::{MeasurementModel, SensorKind};
use crate::sigma_points::UTWeights;
use crate::state::{
    symmetrize, Belief, PredictedSigmaMatrix, StateCovariance, StateVector, N_SIGMA, N_X, YAW,
};

/// Smallest admissible ratio of a squared Cholesky pivot of S to its largest
/// diagonal entry.
const INNOVATION_CONDITION_TOLERANCE: f64 = 1e-12;

/// Predicted belief together with the sigma points it was recovered from.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// Predicted belief.
    pub belief: Belief,
    /// Propagated sigma points.
    pub sigma_points: PredictedSigmaMatrix,
}

/// Result of fusing one measurement into a [`Prediction`].
#[derive(Clone, Debug, PartialEq)]
pub struct Correction<const Z: usize> {
    /// Corrected belief.
    pub belief: Belief,
    /// Predicted measurement mean.
    pub z_pred: SVector<f64, Z>,
    /// Innovation covariance S, including measurement noise.
    pub innovation_cov: SMatrix<f64, Z, Z>,
    /// Measurement residual `z - z_pred`, angle-wrapped where the sensor needs it.
    pub innovation: SVector<f64, Z>,
    /// Kalman gain.
    pub kalman_gain: SMatrix<f64, N_X, Z>,
    /// Normalized innovation squared, `yᵀ S⁻¹ y`.
    pub nis: f64,
}

/// Core unscented transform math shared by prediction and both measurement
/// updates. Holds the weights computed once per filter; they depend only on
/// the spread parameter and the augmented dimension.
#[derive(Clone, Debug)]
pub struct UnscentedEngine {
    pub(crate) weights: UTWeights<N_SIGMA>,
}

impl UnscentedEngine {
    /// Create an engine that recombines sigma points with `weights`.
    pub fn new(weights: UTWeights<N_SIGMA>) -> Self {
        Self { weights }
    }

    /// Recombination weights.
    pub fn weights(&self) -> &UTWeights<N_SIGMA> {
        &self.weights
    }

    /// State residual `x - mean` with the heading wrapped.
    pub fn state_residual(x: &StateVector, mean: &StateVector) -> StateVector {
        let mut diff = x - mean;
        normalize_component(&mut diff, YAW);
        diff
    }

    /// Recover the predicted mean and covariance from propagated sigma points.
    pub fn predict(&self, sigma_points: PredictedSigmaMatrix) -> Result<Prediction, UkfError> {
        let mut mean = StateVector::zeros();
        LinearAveraging.weighted_mean(&sigma_points, &self.weights.w, &mut mean);

        let mut covariance = StateCovariance::zeros();
        for i in 0..N_SIGMA {
            let deviation = Self::state_residual(&sigma_points.column(i).into_owned(), &mean);
            covariance.gemm(
                self.weights[i],
                &deviation,
                &deviation.transpose(),
                1.0,
            );
        }

        let belief = Belief::new(mean, symmetrize(&covariance));
        if !belief.is_finite() {
            return Err(UkfError::NonFiniteState);
        }

        Ok(Prediction {
            belief,
            sigma_points,
        })
    }

    /// Invert the innovation covariance through its Cholesky factor.
    ///
    /// S is rejected as singular when it is not positive-definite, when a
    /// squared pivot falls below `INNOVATION_CONDITION_TOLERANCE` times its
    /// largest diagonal entry, or when a pivot is at the round-off level of
    /// the predicted measurement itself.
    fn invert_innovation<const Z: usize>(
        innovation_cov: &SMatrix<f64, Z, Z>,
        z_pred: &SVector<f64, Z>,
        sensor: SensorKind,
    ) -> Result<SMatrix<f64, Z, Z>, UkfError> {
        let singular = UkfError::SingularInnovation { sensor };

        let max_diag = innovation_cov.diagonal().max();
        if !max_diag.is_finite() || max_diag <= 0.0 {
            return Err(singular);
        }

        let cholesky = Cholesky::new(*innovation_cov).ok_or(singular)?;
        let pivots = cholesky.l_dirty().diagonal();
        let min_pivot = pivots.min();
        let roundoff = f64::EPSILON * (1.0 + z_pred.amax());
        if min_pivot * min_pivot <= INNOVATION_CONDITION_TOLERANCE * max_diag
            || min_pivot <= roundoff
        {
            return Err(singular);
        }

        let s_inv = cholesky.inverse();
        if s_inv.iter().any(|v| !v.is_finite()) {
            return Err(singular);
        }
        Ok(s_inv)
    }

    /// Fuse measurement `z` into `prior` through `model`.
    ///
    /// Sigma points are mapped into measurement space, their weighted mean and
    /// spread (plus R) form the innovation covariance S, and the cross
    /// correlation with the state deviations yields the gain `K = T S⁻¹`.
    pub fn update<M, const Z: usize>(
        &self,
        model: &M,
        prior: &Prediction,
        z: &SVector<f64, Z>,
    ) -> Result<Correction<Z>, UkfError>
    where
        M: MeasurementModel<Z>,
    {
        let mut z_sigma = SMatrix::<f64, Z, N_SIGMA>::zeros();
        for i in 0..N_SIGMA {
            let x = prior.sigma_points.column(i).into_owned();
            z_sigma.set_column(i, &model.measure(&x));
        }

        let z_pred = model.mean(&z_sigma, &self.weights);

        let mut innovation_cov = model.noise_covariance().clone_owned();
        let mut cross_cov = SMatrix::<f64, N_X, Z>::zeros();
        for i in 0..N_SIGMA {
            let z_dev = model.residual(&z_pred, &z_sigma.column(i).into_owned());
            let x_dev = Self::state_residual(
                &prior.sigma_points.column(i).into_owned(),
                &prior.belief.mean,
            );
            innovation_cov.gemm(self.weights[i], &z_dev, &z_dev.transpose(), 1.0);
            cross_cov.gemm(self.weights[i], &x_dev, &z_dev.transpose(), 1.0);
        }
        let innovation_cov = symmetrize(&innovation_cov);
        let s_inv = Self::invert_innovation(&innovation_cov, &z_pred, model.sensor())?;

        let innovation = model.residual(&z_pred, z);
        let nis = innovation.dot(&(s_inv * innovation));

        let kalman_gain = cross_cov * s_inv;
        let mean = prior.belief.mean + kalman_gain * innovation;
        let covariance =
            prior.belief.covariance - kalman_gain * innovation_cov * kalman_gain.transpose();

        let belief = Belief::new(mean, symmetrize(&covariance));
        if !belief.is_finite() || !nis.is_finite() {
            return Err(UkfError::NonFiniteState);
        }

        Ok(Correction {
            belief,
            z_pred,
            innovation_cov,
            innovation,
            kalman_gain,
            nis,
        })
    }
}

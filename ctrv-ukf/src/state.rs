//! Filter belief: the CTRV state vector and its covariance.
//!
//! The state is `[px, py, v, yaw, yaw_rate]` in SI units and radians. Every
//! matrix shape in the crate derives from the constants below.

use nalgebra::{SMatrix, SVector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// State dimension.
pub const N_X: usize = 5;
/// Augmented state dimension (state plus longitudinal and yaw acceleration noise).
pub const N_AUG: usize = N_X + 2;
/// Number of sigma points, `2 * N_AUG + 1`.
pub const N_SIGMA: usize = 2 * N_AUG + 1;

/// Index of the x position.
pub const PX: usize = 0;
/// Index of the y position.
pub const PY: usize = 1;
/// Index of the speed magnitude.
pub const SPEED: usize = 2;
/// Index of the heading angle.
pub const YAW: usize = 3;
/// Index of the turn rate.
pub const YAW_RATE: usize = 4;

/// CTRV state `[px, py, v, yaw, yaw_rate]`.
pub type StateVector = SVector<f64, N_X>;
/// Covariance of [`StateVector`].
pub type StateCovariance = SMatrix<f64, N_X, N_X>;

/// Augmented mean `[px, py, v, yaw, yaw_rate, nu_a, nu_yawdd]`.
pub type AugmentedVector = SVector<f64, N_AUG>;
/// Covariance of [`AugmentedVector`], block-diagonal in state and noise.
pub type AugmentedCovariance = SMatrix<f64, N_AUG, N_AUG>;

/// Augmented sigma points, one per column.
pub type AugmentedSigmaMatrix = SMatrix<f64, N_AUG, N_SIGMA>;
/// Sigma points after propagation through the motion model, one per column.
pub type PredictedSigmaMatrix = SMatrix<f64, N_X, N_SIGMA>;

/// Immutable snapshot of the Gaussian belief over the state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Belief {
    /// `[px, py, v, yaw, yaw_rate]`
    pub mean: StateVector,
    /// State covariance, kept symmetric.
    pub covariance: StateCovariance,
}

impl Belief {
    /// Create a belief from its mean and covariance.
    pub fn new(mean: StateVector, covariance: StateCovariance) -> Self {
        Self { mean, covariance }
    }

    /// Position `(px, py)` in meters.
    pub fn position(&self) -> (f64, f64) {
        (self.mean[PX], self.mean[PY])
    }

    /// Speed magnitude (m/s).
    pub fn speed(&self) -> f64 {
        self.mean[SPEED]
    }

    /// Heading (rad), not wrapped.
    pub fn yaw(&self) -> f64 {
        self.mean[YAW]
    }

    /// Turn rate (rad/s).
    pub fn yaw_rate(&self) -> f64 {
        self.mean[YAW_RATE]
    }

    /// Cartesian velocity implied by speed and heading.
    pub fn velocity(&self) -> (f64, f64) {
        let v = self.speed();
        let yaw = self.yaw();
        (v * yaw.cos(), v * yaw.sin())
    }

    /// True when neither the mean nor the covariance holds NaN or infinity.
    pub fn is_finite(&self) -> bool {
        self.mean.iter().all(|x| x.is_finite()) && self.covariance.iter().all(|x| x.is_finite())
    }
}

/// Average a square matrix with its transpose, removing round-off asymmetry.
pub fn symmetrize<const D: usize>(matrix: &SMatrix<f64, D, D>) -> SMatrix<f64, D, D> {
    (matrix + matrix.transpose()) * 0.5
}

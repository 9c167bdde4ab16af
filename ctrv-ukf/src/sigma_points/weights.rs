//! Unscented transform weights shared by sigma-point generation and recovery.

use nalgebra::SVector;

/// Recombination weights for `S` sigma points.
///
/// One vector serves both mean and covariance recovery: `w[0] = λ / (λ + L)`
/// and every other weight is `1 / (2 (λ + L))`, so the weights sum to one.
#[derive(Clone, Debug, PartialEq)]
pub struct UTWeights<const S: usize> {
    /// Weight of each sigma point.
    pub w: SVector<f64, S>,
}

impl<const S: usize> UTWeights<S> {
    /// Construct weights for an `dim`-dimensional sigma set with spread `lambda`.
    ///
    /// `S` must be `2 * dim + 1`.
    pub fn from_spread(dim: usize, lambda: f64) -> Self {
        debug_assert_eq!(S, 2 * dim + 1, "sigma count must be 2 * dim + 1");

        let n_lambda = dim as f64 + lambda;
        let mut w = SVector::<f64, S>::from_element(0.5 / n_lambda);
        w[0] = lambda / n_lambda;

        Self { w }
    }

    /// Sum of all weights.
    #[inline]
    pub fn sum(&self) -> f64 {
        self.w.sum()
    }

    /// Number of sigma points.
    #[inline]
    pub fn len(&self) -> usize {
        S
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        S == 0
    }
}

impl<const S: usize> core::ops::Index<usize> for UTWeights<S> {
    type Output = f64;

    #[inline]
    fn index(&self, i: usize) -> &f64 {
        &self.w[i]
    }
}

#[cfg(test)]
mod augmented {
    use crate::sigma_points::AugmentedSigmaPoints;
    use crate::state::{Belief, StateCovariance, StateVector, N_AUG, N_SIGMA, N_X};
    use crate::ukf::error::UkfError;
    use approx::abs_diff_eq;

    const EPS: f64 = 1e-12;

    fn belief() -> Belief {
        let mean = StateVector::new(5.7441, 1.38, 2.2049, 0.5015, 0.3528);
        let covariance = StateCovariance::from_row_slice(&[
            0.0043, -0.0013, 0.0030, -0.0022, -0.0020, //
            -0.0013, 0.0077, 0.0011, 0.0071, 0.0060, //
            0.0030, 0.0011, 0.0054, 0.0007, 0.0008, //
            -0.0022, 0.0071, 0.0007, 0.0098, 0.0100, //
            -0.0020, 0.0060, 0.0008, 0.0100, 0.0123, //
        ]);
        Belief::new(mean, covariance)
    }

    #[test]
    fn weights_sum_to_one() {
        let gen = AugmentedSigmaPoints::new(0.2, 0.2);
        let weights = gen.weights();
        assert_eq!(weights.len(), N_SIGMA);
        assert!(abs_diff_eq!(weights.sum(), 1.0, epsilon = EPS));

        let lambda = gen.lambda();
        assert!(abs_diff_eq!(lambda, -2.0, epsilon = EPS));
        assert!(abs_diff_eq!(
            weights[0],
            lambda / (lambda + N_AUG as f64),
            epsilon = EPS
        ));
        for i in 1..N_SIGMA {
            assert!(
                abs_diff_eq!(weights[i], 0.5 / (lambda + N_AUG as f64), epsilon = EPS),
                "weight mismatch at {}",
                i
            );
        }
    }

    #[test]
    fn head_point_is_augmented_mean() {
        let gen = AugmentedSigmaPoints::new(0.2, 0.2);
        let b = belief();
        let pts = gen.generate(&b).unwrap();

        for r in 0..N_X {
            assert!(abs_diff_eq!(pts[(r, 0)], b.mean[r], epsilon = EPS));
        }
        assert_eq!(pts[(N_X, 0)], 0.0);
        assert_eq!(pts[(N_X + 1, 0)], 0.0);
    }

    #[test]
    fn points_are_reflected_about_mean() {
        let gen = AugmentedSigmaPoints::new(0.2, 0.2);
        let pts = gen.generate(&belief()).unwrap();

        for k in 1..=N_AUG {
            for r in 0..N_AUG {
                let sum = pts[(r, k)] + pts[(r, k + N_AUG)];
                assert!(
                    abs_diff_eq!(sum, 2.0 * pts[(r, 0)], epsilon = EPS),
                    "reflection mismatch at ({},{})",
                    r,
                    k
                );
            }
        }
    }

    #[test]
    fn reference_values() {
        let gen = AugmentedSigmaPoints::new(0.2, 0.2);
        let pts = gen.generate(&belief()).unwrap();
        // sqrt(λ + L) = sqrt(5); first column of L is P[:,0] / sqrt(P[0,0]).
        let scale = 5.0_f64.sqrt();
        let expected_px = 5.7441 + scale * 0.0043_f64.sqrt();
        assert!(abs_diff_eq!(pts[(0, 1)], expected_px, epsilon = 1e-9));
        // Noise columns only move their own row.
        assert!(abs_diff_eq!(pts[(N_X, N_X + 1)], scale * 0.2, epsilon = 1e-12));
        assert!(abs_diff_eq!(pts[(0, N_X + 1)], 5.7441, epsilon = 1e-12));
        assert!(abs_diff_eq!(
            pts[(N_X + 1, N_AUG + N_AUG)],
            -scale * 0.2,
            epsilon = 1e-12
        ));
    }

    #[test]
    fn augmented_covariance_is_block_diagonal() {
        let gen = AugmentedSigmaPoints::new(3.0, 0.5);
        let b = belief();
        let (mean, cov) = gen.augment(&b);

        assert_eq!(mean.fixed_rows::<N_X>(0).into_owned(), b.mean);
        assert_eq!(cov.fixed_view::<N_X, N_X>(0, 0).into_owned(), b.covariance);
        assert_eq!(cov[(N_X, N_X)], 9.0);
        assert_eq!(cov[(N_X + 1, N_X + 1)], 0.25);
        for r in 0..N_X {
            assert_eq!(cov[(r, N_X)], 0.0);
            assert_eq!(cov[(N_X + 1, r)], 0.0);
        }
    }

    #[test]
    fn indefinite_covariance_is_rejected() {
        let gen = AugmentedSigmaPoints::new(3.0, 0.5);
        let mut b = belief();
        b.covariance[(2, 2)] = -1.0;
        assert_eq!(gen.generate(&b), Err(UkfError::NotPositiveDefinite));
    }

    #[test]
    fn nan_covariance_is_rejected() {
        let gen = AugmentedSigmaPoints::new(3.0, 0.5);
        let mut b = belief();
        b.covariance[(1, 1)] = f64::NAN;
        assert_eq!(gen.generate(&b), Err(UkfError::NonFiniteState));
    }
}

mod traits {
    use crate::state::{N_AUG, N_SIGMA};
    use nalgebra::base::dimension::{DimAdd, DimMul};
    use nalgebra::constraint::{DimEq, ShapeConstraint};
    use nalgebra::{Const, DimName, U1, U2, U3, U5, U7};

    /// The compile-time number of sigma points (2 × N + 1) for the standard UT.
    type UTSigmaCount<N> = <<N as DimMul<U2>>::Output as DimAdd<U1>>::Output;

    trait AssertDimEq<A: DimName, B: DimName>
    where
        ShapeConstraint: DimEq<A, B>,
    {
        fn check();
    }

    impl<A: DimName, B: DimName> AssertDimEq<A, B> for ()
    where
        ShapeConstraint: DimEq<A, B>,
    {
        fn check() {}
    }

    #[test]
    fn ut_sigma_count() {
        <() as AssertDimEq<UTSigmaCount<U1>, U3>>::check(); // 2 × 1 + 1 = 3
        <() as AssertDimEq<UTSigmaCount<U2>, U5>>::check(); // 2 × 2 + 1 = 5
        <() as AssertDimEq<UTSigmaCount<U3>, U7>>::check(); // 2 × 3 + 1 = 7
        <() as AssertDimEq<UTSigmaCount<Const<N_AUG>>, Const<N_SIGMA>>>::check();
    }
}

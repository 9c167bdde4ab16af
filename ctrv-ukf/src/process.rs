//! Constant turn rate and velocity (CTRV) motion model.
//!
//! The object moves at constant speed `v` while turning at constant rate
//! `ψ̇`. Two augmented noise terms, longitudinal acceleration `ν_a` and yaw
//! acceleration `ν_ψ̈`, perturb the motion over the interval.

use crate::state::{
    AugmentedSigmaMatrix, AugmentedVector, PredictedSigmaMatrix, StateVector, N_SIGMA, N_X, SPEED,
    YAW, YAW_RATE,
};

/// Turn rates at or below this magnitude use the straight-line branch.
pub const YAW_RATE_EPSILON: f64 = 1e-3;

/// Noise-free displacement over `dt` for speed `v`, heading `yaw` and turn rate `yaw_rate`.
pub fn deterministic_displacement(v: f64, yaw: f64, yaw_rate: f64, dt: f64) -> StateVector {
    if yaw_rate.abs() > YAW_RATE_EPSILON {
        let r = v / yaw_rate;
        let yaw_end = yaw + yaw_rate * dt;
        StateVector::new(
            r * (yaw_end.sin() - yaw.sin()),
            r * (-yaw_end.cos() + yaw.cos()),
            0.0,
            yaw_rate * dt,
            0.0,
        )
    } else {
        StateVector::new(
            v * yaw.cos() * dt,
            v * yaw.sin() * dt,
            0.0,
            yaw_rate * dt,
            0.0,
        )
    }
}

/// Displacement contributed by the acceleration noise over `dt`.
pub fn noise_displacement(yaw: f64, nu_a: f64, nu_yawdd: f64, dt: f64) -> StateVector {
    let half_dt2 = 0.5 * dt * dt;
    StateVector::new(
        half_dt2 * yaw.cos() * nu_a,
        half_dt2 * yaw.sin() * nu_a,
        dt * nu_a,
        half_dt2 * nu_yawdd,
        dt * nu_yawdd,
    )
}

/// CTRV process model over the noise-augmented state.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ctrv;

impl Ctrv {
    /// Propagate one augmented point `[px, py, v, ψ, ψ̇, ν_a, ν_ψ̈]` by `dt` seconds.
    pub fn propagate(&self, point: &AugmentedVector, dt: f64) -> StateVector {
        let v = point[SPEED];
        let yaw = point[YAW];
        let yaw_rate = point[YAW_RATE];
        let nu_a = point[N_X];
        let nu_yawdd = point[N_X + 1];

        point.fixed_rows::<N_X>(0).into_owned()
            + deterministic_displacement(v, yaw, yaw_rate, dt)
            + noise_displacement(yaw, nu_a, nu_yawdd, dt)
    }

    /// Propagate every augmented sigma point by `dt` seconds.
    pub fn predict_sigma_points(
        &self,
        sigma_points: &AugmentedSigmaMatrix,
        dt: f64,
    ) -> PredictedSigmaMatrix {
        let mut predicted = PredictedSigmaMatrix::zeros();
        for i in 0..N_SIGMA {
            let point = sigma_points.column(i).into_owned();
            predicted.set_column(i, &self.propagate(&point, dt));
        }
        predicted
    }
}

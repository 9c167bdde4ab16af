use nalgebra::{Matrix3, SMatrix, Vector3};

use super::{MeasurementModel, SensorKind, N_RADAR};
use crate::angle::normalize_component;
use crate::sigma_points::UTWeights;
use crate::state::{StateVector, N_SIGMA, PX, PY, SPEED, YAW};
use crate::ukf::averaging::{AngularAveraging, WeightedMean};

/// Index of the bearing in a radar measurement.
pub const BEARING: usize = 1;

/// Radar observation model: z = [ρ, φ, ρ̇].
///
/// ρ = √(px² + py²), φ = atan2(py, px), ρ̇ = (px·cosψ·v + py·sinψ·v) / ρ.
/// The divisor of ρ̇ is floored at `min_range`, so a state at the sensor
/// origin yields a large but finite range rate instead of NaN.
#[derive(Clone, Debug)]
pub struct RadarModel {
    noise: Matrix3<f64>,
    min_range: f64,
}

impl RadarModel {
    /// # Arguments
    /// * `std_rho` - Range std deviation (meters)
    /// * `std_phi` - Bearing std deviation (radians)
    /// * `std_rho_dot` - Range rate std deviation (m/s)
    /// * `min_range` - Floor on the range used as the ρ̇ divisor (meters)
    pub fn new(std_rho: f64, std_phi: f64, std_rho_dot: f64, min_range: f64) -> Self {
        Self {
            noise: Matrix3::from_diagonal(&Vector3::new(
                std_rho * std_rho,
                std_phi * std_phi,
                std_rho_dot * std_rho_dot,
            )),
            min_range,
        }
    }

    /// Floor on the range rate divisor (meters).
    pub fn min_range(&self) -> f64 {
        self.min_range
    }
}

impl MeasurementModel<N_RADAR> for RadarModel {
    fn sensor(&self) -> SensorKind {
        SensorKind::Radar
    }

    fn measure(&self, x: &StateVector) -> Vector3<f64> {
        let px = x[PX];
        let py = x[PY];
        let v = x[SPEED];
        let yaw = x[YAW];

        let rho = px.hypot(py);
        let phi = py.atan2(px);
        let rho_dot = (px * yaw.cos() * v + py * yaw.sin() * v) / rho.max(self.min_range);

        Vector3::new(rho, phi, rho_dot)
    }

    fn residual(&self, z_pred: &Vector3<f64>, z_meas: &Vector3<f64>) -> Vector3<f64> {
        let mut diff = z_meas - z_pred;
        normalize_component(&mut diff, BEARING);
        diff
    }

    fn noise_covariance(&self) -> &Matrix3<f64> {
        &self.noise
    }

    fn mean(
        &self,
        z_sigma: &SMatrix<f64, N_RADAR, N_SIGMA>,
        weights: &UTWeights<N_SIGMA>,
    ) -> Vector3<f64> {
        let mut z_pred = Vector3::zeros();
        AngularAveraging::new(BEARING).weighted_mean(z_sigma, &weights.w, &mut z_pred);
        z_pred
    }
}

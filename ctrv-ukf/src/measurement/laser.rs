use nalgebra::{Matrix2, Vector2};

use super::{MeasurementModel, SensorKind, N_LASER};
use crate::state::{StateVector, PX, PY};

/// Laser observation model: z = [px, py].
#[derive(Clone, Debug)]
pub struct LaserModel {
    noise: Matrix2<f64>,
}

impl LaserModel {
    /// # Arguments
    /// * `std_px` - Std deviation in x (meters)
    /// * `std_py` - Std deviation in y (meters)
    pub fn new(std_px: f64, std_py: f64) -> Self {
        Self {
            noise: Matrix2::new(std_px * std_px, 0.0, 0.0, std_py * std_py),
        }
    }
}

impl MeasurementModel<N_LASER> for LaserModel {
    fn sensor(&self) -> SensorKind {
        SensorKind::Laser
    }

    fn measure(&self, x: &StateVector) -> Vector2<f64> {
        Vector2::new(x[PX], x[PY])
    }

    fn noise_covariance(&self) -> &Matrix2<f64> {
        &self.noise
    }
}

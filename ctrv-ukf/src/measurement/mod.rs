//! Sensor readings and the measurement models that predict them.
//!
//! Two sensors feed the filter:
//! - **Laser**: z = [px, py], a linear projection of the state.
//! - **Radar**: z = [ρ, φ, ρ̇], range, bearing and range rate, nonlinear.
//!
//! Both models share the same unscented update machinery through
//! [`MeasurementModel`]; only the projection, residual and noise differ.

use core::fmt;

use nalgebra::{SMatrix, SVector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::sigma_points::UTWeights;
use crate::state::{StateVector, N_SIGMA};
use crate::ukf::averaging::{LinearAveraging, WeightedMean};
use crate::ukf::error::UkfError;

pub mod laser;
pub mod radar;

pub use laser::LaserModel;
pub use radar::RadarModel;

/// Laser measurement dimension.
pub const N_LASER: usize = 2;
/// Radar measurement dimension.
pub const N_RADAR: usize = 3;

/// Which sensor produced a reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SensorKind {
    /// Position-only sensor, linear in the state.
    Laser,
    /// Range/bearing/range-rate sensor, nonlinear in the state.
    Radar,
}

impl SensorKind {
    /// Number of components in a reading of this kind.
    pub fn dim(self) -> usize {
        match self {
            SensorKind::Laser => N_LASER,
            SensorKind::Radar => N_RADAR,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Laser => write!(f, "laser"),
            SensorKind::Radar => write!(f, "radar"),
        }
    }
}

/// The observed values carried by a [`Measurement`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Reading {
    /// Cartesian position (meters)
    Laser { px: f64, py: f64 },
    /// Range (meters), bearing (radians) and range rate (m/s)
    Radar { rho: f64, phi: f64, rho_dot: f64 },
}

impl Reading {
    /// Sensor that produced this reading.
    pub fn sensor(&self) -> SensorKind {
        match self {
            Reading::Laser { .. } => SensorKind::Laser,
            Reading::Radar { .. } => SensorKind::Radar,
        }
    }

    /// Build a reading from its raw components, in sensor order.
    pub fn from_raw(sensor: SensorKind, raw: &[f64]) -> Result<Self, UkfError> {
        if raw.len() != sensor.dim() {
            return Err(UkfError::MeasurementDimension {
                sensor,
                expected: sensor.dim(),
                actual: raw.len(),
            });
        }
        Ok(match sensor {
            SensorKind::Laser => Reading::Laser {
                px: raw[0],
                py: raw[1],
            },
            SensorKind::Radar => Reading::Radar {
                rho: raw[0],
                phi: raw[1],
                rho_dot: raw[2],
            },
        })
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        match *self {
            Reading::Laser { px, py } => px.is_finite() && py.is_finite(),
            Reading::Radar { rho, phi, rho_dot } => {
                rho.is_finite() && phi.is_finite() && rho_dot.is_finite()
            }
        }
    }
}

/// One timestamped sensor reading.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    /// Observed values.
    pub reading: Reading,
    /// Acquisition time in microseconds. Must not decrease between calls.
    pub timestamp_us: i64,
}

impl Measurement {
    /// Timestamp a reading.
    pub fn new(reading: Reading, timestamp_us: i64) -> Self {
        Self {
            reading,
            timestamp_us,
        }
    }

    /// Laser measurement at `(px, py)`.
    pub fn laser(px: f64, py: f64, timestamp_us: i64) -> Self {
        Self::new(Reading::Laser { px, py }, timestamp_us)
    }

    /// Radar measurement of range, bearing and range rate.
    pub fn radar(rho: f64, phi: f64, rho_dot: f64, timestamp_us: i64) -> Self {
        Self::new(Reading::Radar { rho, phi, rho_dot }, timestamp_us)
    }

    /// Sensor that produced this measurement.
    pub fn sensor(&self) -> SensorKind {
        self.reading.sensor()
    }
}

/// A measurement model for the CTRV state and a `Z`-dimensional measurement.
pub trait MeasurementModel<const Z: usize> {
    /// Sensor this model describes.
    fn sensor(&self) -> SensorKind;

    /// Project a state into measurement space.
    fn measure(&self, x: &StateVector) -> SVector<f64, Z>;

    /// Compute the residual between a predicted measurement `z_pred` and an
    /// actual or sigma-point measurement `z_meas`. Angular components are
    /// wrapped by implementations that have them.
    fn residual(&self, z_pred: &SVector<f64, Z>, z_meas: &SVector<f64, Z>) -> SVector<f64, Z> {
        z_meas - z_pred
    }

    /// Additive measurement noise covariance R.
    fn noise_covariance(&self) -> &SMatrix<f64, Z, Z>;

    /// Weighted mean of measurement sigma points.
    fn mean(
        &self,
        z_sigma: &SMatrix<f64, Z, N_SIGMA>,
        weights: &UTWeights<N_SIGMA>,
    ) -> SVector<f64, Z> {
        let mut z_pred = SVector::<f64, Z>::zeros();
        LinearAveraging.weighted_mean(z_sigma, &weights.w, &mut z_pred);
        z_pred
    }
}

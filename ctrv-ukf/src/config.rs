//! Construction-time filter configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ukf::error::UkfError;

/// Process noise standard deviations.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProcessNoise {
    /// Longitudinal acceleration (m/s²)
    pub std_a: f64,
    /// Yaw acceleration (rad/s²)
    pub std_yawdd: f64,
}

/// Laser measurement noise standard deviations, as rated for the sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LaserNoise {
    /// x position (m)
    pub std_px: f64,
    /// y position (m)
    pub std_py: f64,
}

/// Radar measurement noise standard deviations, as rated for the sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RadarNoise {
    /// Range (m)
    pub std_rho: f64,
    /// Bearing (rad)
    pub std_phi: f64,
    /// Range rate (m/s)
    pub std_rho_dot: f64,
}

/// Placeholder values for the state components a single reading cannot observe.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InitialGuess {
    /// Speed seeded on the first reading of either sensor (m/s).
    pub speed: f64,
    /// Heading seeded on a first laser reading (rad).
    pub laser_yaw: f64,
    /// Turn rate seeded on a first laser reading (rad/s).
    pub laser_yaw_rate: f64,
}

/// Filter configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterConfig {
    /// When false, laser readings are ignored, including for initialization.
    pub use_laser: bool,
    /// When false, radar readings are ignored, including for initialization.
    pub use_radar: bool,
    /// Process noise of the CTRV model.
    pub process_noise: ProcessNoise,
    /// Laser measurement noise.
    pub laser_noise: LaserNoise,
    /// Radar measurement noise.
    pub radar_noise: RadarNoise,
    /// Placeholders for the first belief.
    pub initial: InitialGuess,
    /// Floor on the range used as the divisor of the predicted range rate (m).
    pub min_range: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            use_laser: true,
            use_radar: true,
            process_noise: ProcessNoise {
                std_a: 3.0,
                std_yawdd: 0.5,
            },
            laser_noise: LaserNoise {
                std_px: 0.15,
                std_py: 0.15,
            },
            radar_noise: RadarNoise {
                std_rho: 0.3,
                std_phi: 0.03,
                std_rho_dot: 0.3,
            },
            initial: InitialGuess {
                speed: 4.0,
                laser_yaw: 0.5,
                laser_yaw_rate: 0.0,
            },
            min_range: 1e-4,
        }
    }
}

impl FilterConfig {
    /// Enable or disable laser readings.
    pub fn with_laser(mut self, enabled: bool) -> Self {
        self.use_laser = enabled;
        self
    }

    /// Enable or disable radar readings.
    pub fn with_radar(mut self, enabled: bool) -> Self {
        self.use_radar = enabled;
        self
    }

    /// Set the longitudinal and yaw acceleration noise std deviations.
    pub fn with_process_noise(mut self, std_a: f64, std_yawdd: f64) -> Self {
        self.process_noise = ProcessNoise { std_a, std_yawdd };
        self
    }

    /// Set the laser position noise std deviations (meters).
    pub fn with_laser_noise(mut self, std_px: f64, std_py: f64) -> Self {
        self.laser_noise = LaserNoise { std_px, std_py };
        self
    }

    /// Set the radar range, bearing and range rate noise std deviations.
    pub fn with_radar_noise(mut self, std_rho: f64, std_phi: f64, std_rho_dot: f64) -> Self {
        self.radar_noise = RadarNoise {
            std_rho,
            std_phi,
            std_rho_dot,
        };
        self
    }

    /// Replace the placeholders used for unobservable state on initialization.
    pub fn with_initial_guess(mut self, initial: InitialGuess) -> Self {
        self.initial = initial;
        self
    }

    /// Set the floor on the range used as the range rate divisor (meters).
    pub fn with_min_range(mut self, min_range: f64) -> Self {
        self.min_range = min_range;
        self
    }

    /// Check that every noise level is a positive finite number and the
    /// placeholders are finite.
    pub fn validate(&self) -> Result<(), UkfError> {
        fn positive(value: f64, what: &'static str) -> Result<(), UkfError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(UkfError::InvalidConfig(what))
            }
        }

        positive(self.process_noise.std_a, "std_a must be positive")?;
        positive(self.process_noise.std_yawdd, "std_yawdd must be positive")?;
        positive(self.laser_noise.std_px, "laser std_px must be positive")?;
        positive(self.laser_noise.std_py, "laser std_py must be positive")?;
        positive(self.radar_noise.std_rho, "radar std_rho must be positive")?;
        positive(self.radar_noise.std_phi, "radar std_phi must be positive")?;
        positive(self.radar_noise.std_rho_dot, "radar std_rho_dot must be positive")?;
        positive(self.min_range, "min_range must be positive")?;

        let InitialGuess {
            speed,
            laser_yaw,
            laser_yaw_rate,
        } = self.initial;
        if !(speed.is_finite() && laser_yaw.is_finite() && laser_yaw_rate.is_finite()) {
            return Err(UkfError::InvalidConfig("initial guess must be finite"));
        }
        Ok(())
    }
}

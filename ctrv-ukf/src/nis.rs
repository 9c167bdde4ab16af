//! Normalized innovation squared (NIS) consistency diagnostics.
//!
//! For a well-tuned filter the NIS of a `k`-dimensional measurement follows a
//! chi-square distribution with `k` degrees of freedom, so about 95 % of the
//! values should fall below the 0.95 quantile. These statistics are for
//! reporting only and never feed back into estimation.

use crate::measurement::SensorKind;

/// Chi-square 0.95 quantile for 2 degrees of freedom (laser).
pub const CHI2_95_2DOF: f64 = 5.991;
/// Chi-square 0.95 quantile for 3 degrees of freedom (radar).
pub const CHI2_95_3DOF: f64 = 7.815;

/// Chi-square 0.95 quantile for the measurement dimension of `sensor`.
pub fn chi_square_95(sensor: SensorKind) -> f64 {
    match sensor {
        SensorKind::Laser => CHI2_95_2DOF,
        SensorKind::Radar => CHI2_95_3DOF,
    }
}

/// Running NIS statistics for one sensor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NisStats {
    /// Number of recorded values.
    pub count: u64,
    /// Number of values below the 95 % quantile.
    pub below_threshold: u64,
    /// Sum of recorded values.
    pub sum: f64,
    /// Most recent value.
    pub last: Option<f64>,
}

impl NisStats {
    /// Mean NIS, or `None` before any value was recorded.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Fraction of recorded values below the 95 % quantile.
    pub fn fraction_below(&self) -> Option<f64> {
        (self.count > 0).then(|| self.below_threshold as f64 / self.count as f64)
    }
}

/// Per-sensor NIS consistency monitor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NisMonitor {
    laser: NisStats,
    radar: NisStats,
}

impl NisMonitor {
    /// Create an empty monitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one NIS value from `sensor`.
    pub fn record(&mut self, sensor: SensorKind, nis: f64) {
        let threshold = chi_square_95(sensor);
        let stats = match sensor {
            SensorKind::Laser => &mut self.laser,
            SensorKind::Radar => &mut self.radar,
        };
        stats.count += 1;
        stats.sum += nis;
        stats.last = Some(nis);
        if nis < threshold {
            stats.below_threshold += 1;
        }
    }

    /// Statistics recorded for `sensor`.
    pub fn stats(&self, sensor: SensorKind) -> &NisStats {
        match sensor {
            SensorKind::Laser => &self.laser,
            SensorKind::Radar => &self.radar,
        }
    }
}

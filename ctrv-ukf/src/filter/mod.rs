//! Measurement-driven CTRV filter.
//!
//! [`CtrvFilter::step`] is a pure function from a prior belief, one reading
//! and an elapsed time to a [`Posterior`]. [`CtrvFilter::process_measurement`]
//! wraps it with the bookkeeping a live sensor stream needs: sensor enable
//! flags, initialization on the first accepted reading, the clock and the
//! per-sensor NIS values. State is committed only when a cycle succeeds.

use log::{debug, trace, warn};
use nalgebra::{Vector2, Vector3};

use crate::config::FilterConfig;
use crate::measurement::{LaserModel, Measurement, RadarModel, Reading, SensorKind};
use crate::nis::NisMonitor;
use crate::process::Ctrv;
use crate::sigma_points::AugmentedSigmaPoints;
use crate::state::{Belief, PredictedSigmaMatrix, StateCovariance, StateVector, N_SIGMA, PX, PY};
use crate::ukf::engine::{Prediction, UnscentedEngine};
use crate::ukf::error::UkfError;

pub mod initializer;

pub use initializer::initial_belief;

const MICROS_PER_SECOND: f64 = 1e6;

/// Seconds between two microsecond timestamps, without overflowing on any pair.
fn elapsed_seconds(last_us: i64, current_us: i64) -> f64 {
    (i128::from(current_us) - i128::from(last_us)) as f64 / MICROS_PER_SECOND
}

/// Result of one predict/update cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Posterior {
    /// Corrected belief.
    pub belief: Belief,
    /// Propagated sigma points the correction was computed from.
    pub sigma_points: PredictedSigmaMatrix,
    /// Sensor whose reading was fused.
    pub sensor: SensorKind,
    /// Normalized innovation squared of the fused reading.
    pub nis: f64,
    /// Elapsed time of the prediction (seconds).
    pub dt: f64,
}

/// What [`CtrvFilter::process_measurement`] did with a measurement.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The sensor is disabled; nothing changed.
    Ignored,
    /// First accepted reading; the belief was seeded without prediction.
    Initialized(Belief),
    /// A full predict/update cycle ran and was committed.
    Updated(Posterior),
}

/// Unscented Kalman filter tracking a CTRV target from laser and radar readings.
#[derive(Clone, Debug)]
pub struct CtrvFilter {
    config: FilterConfig,
    sigma_generator: AugmentedSigmaPoints,
    engine: UnscentedEngine,
    process: Ctrv,
    laser: LaserModel,
    radar: RadarModel,
    belief: Option<Belief>,
    last_timestamp_us: Option<i64>,
    nis_laser: f64,
    nis_radar: f64,
    monitor: NisMonitor,
}

impl CtrvFilter {
    /// Build a filter from a validated configuration.
    pub fn new(config: FilterConfig) -> Result<Self, UkfError> {
        config.validate()?;

        let sigma_generator = AugmentedSigmaPoints::new(
            config.process_noise.std_a,
            config.process_noise.std_yawdd,
        );
        let engine = UnscentedEngine::new(sigma_generator.weights());
        let laser = LaserModel::new(config.laser_noise.std_px, config.laser_noise.std_py);
        let radar = RadarModel::new(
            config.radar_noise.std_rho,
            config.radar_noise.std_phi,
            config.radar_noise.std_rho_dot,
            config.min_range,
        );

        Ok(Self {
            config,
            sigma_generator,
            engine,
            process: Ctrv,
            laser,
            radar,
            belief: None,
            last_timestamp_us: None,
            nis_laser: 0.0,
            nis_radar: 0.0,
            monitor: NisMonitor::new(),
        })
    }

    /// Configuration the filter was built with.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// True once a reading has seeded the belief.
    pub fn is_initialized(&self) -> bool {
        self.belief.is_some()
    }

    /// Current belief, or `None` before the first accepted reading.
    pub fn belief(&self) -> Option<&Belief> {
        self.belief.as_ref()
    }

    /// Current state mean, or zeros before initialization.
    pub fn state(&self) -> StateVector {
        self.belief
            .as_ref()
            .map_or_else(StateVector::zeros, |b| b.mean)
    }

    /// Current state covariance, or identity before initialization.
    pub fn covariance(&self) -> StateCovariance {
        self.belief
            .as_ref()
            .map_or_else(StateCovariance::identity, |b| b.covariance)
    }

    /// NIS of the last update from `sensor`; 0 until that sensor has updated.
    pub fn nis(&self, sensor: SensorKind) -> f64 {
        match sensor {
            SensorKind::Laser => self.nis_laser,
            SensorKind::Radar => self.nis_radar,
        }
    }

    /// Running NIS consistency statistics for both sensors.
    pub fn nis_monitor(&self) -> &NisMonitor {
        &self.monitor
    }

    /// Timestamp (µs) of the last accepted measurement.
    pub fn last_timestamp(&self) -> Option<i64> {
        self.last_timestamp_us
    }

    /// Forget the belief and the clock. The next accepted reading reinitializes.
    pub fn reset(&mut self) {
        self.belief = None;
        self.last_timestamp_us = None;
        self.nis_laser = 0.0;
        self.nis_radar = 0.0;
        self.monitor = NisMonitor::new();
    }

    fn sensor_enabled(&self, sensor: SensorKind) -> bool {
        match sensor {
            SensorKind::Laser => self.config.use_laser,
            SensorKind::Radar => self.config.use_radar,
        }
    }

    /// Seed a belief from a single reading.
    pub fn initialize(&self, reading: &Reading) -> Result<Belief, UkfError> {
        if !reading.is_finite() {
            return Err(UkfError::NonFiniteMeasurement {
                sensor: reading.sensor(),
            });
        }
        Ok(initial_belief(&self.config, reading))
    }

    /// Propagate `prior` through the CTRV model over `dt` seconds.
    pub fn predict(&self, prior: &Belief, dt: f64) -> Result<Prediction, UkfError> {
        let sigma_points = self.sigma_generator.generate(prior)?;
        let predicted = self.process.predict_sigma_points(&sigma_points, dt);
        self.engine.predict(predicted)
    }

    /// Predict `prior` forward by `dt` seconds and fuse `reading`.
    ///
    /// Does not consult the sensor enable flags and touches no filter state.
    pub fn step(&self, prior: &Belief, reading: &Reading, dt: f64) -> Result<Posterior, UkfError> {
        let sensor = reading.sensor();
        if !reading.is_finite() {
            return Err(UkfError::NonFiniteMeasurement { sensor });
        }

        let prediction = self.predict(prior, dt)?;
        trace!("predicted {:?} over dt={dt:.6}s", prediction.belief.mean);

        let (belief, nis) = match *reading {
            Reading::Laser { px, py } => {
                let correction =
                    self.engine
                        .update(&self.laser, &prediction, &Vector2::new(px, py))?;
                (correction.belief, correction.nis)
            }
            Reading::Radar { rho, phi, rho_dot } => {
                self.check_range(&prediction.sigma_points);
                let correction = self.engine.update(
                    &self.radar,
                    &prediction,
                    &Vector3::new(rho, phi, rho_dot),
                )?;
                (correction.belief, correction.nis)
            }
        };
        trace!("{sensor} nis={nis:.4}");

        Ok(Posterior {
            belief,
            sigma_points: prediction.sigma_points,
            sensor,
            nis,
            dt,
        })
    }

    fn check_range(&self, sigma_points: &PredictedSigmaMatrix) {
        let min_range = self.radar.min_range();
        let clamped = (0..N_SIGMA)
            .filter(|&i| sigma_points[(PX, i)].hypot(sigma_points[(PY, i)]) < min_range)
            .count();
        if clamped > 0 {
            warn!("{clamped} sigma point(s) within {min_range} m of the radar, range rate divisor clamped");
        }
    }

    /// Process one timestamped measurement.
    ///
    /// Readings from a disabled sensor are ignored. The first accepted reading
    /// seeds the belief; every later one runs a full predict/update cycle.
    /// On error the belief, clock and NIS values are unchanged.
    pub fn process_measurement(&mut self, measurement: &Measurement) -> Result<Outcome, UkfError> {
        let sensor = measurement.sensor();
        if !self.sensor_enabled(sensor) {
            trace!("{sensor} disabled, ignoring reading at {} us", measurement.timestamp_us);
            return Ok(Outcome::Ignored);
        }

        let (Some(prior), Some(last)) = (self.belief.as_ref(), self.last_timestamp_us) else {
            let belief = self.initialize(&measurement.reading)?;
            debug!("initialized from {sensor}: {:?}", belief.mean);
            self.belief = Some(belief.clone());
            self.last_timestamp_us = Some(measurement.timestamp_us);
            return Ok(Outcome::Initialized(belief));
        };

        if measurement.timestamp_us < last {
            let err = UkfError::TimestampRegression {
                last,
                current: measurement.timestamp_us,
            };
            warn!("rejecting {sensor} reading: {err}");
            return Err(err);
        }
        let dt = elapsed_seconds(last, measurement.timestamp_us);

        let posterior = self
            .step(prior, &measurement.reading, dt)
            .inspect_err(|err| {
                warn!("{sensor} cycle at {} us failed: {err}", measurement.timestamp_us)
            })?;

        match sensor {
            SensorKind::Laser => self.nis_laser = posterior.nis,
            SensorKind::Radar => self.nis_radar = posterior.nis,
        }
        self.monitor.record(sensor, posterior.nis);
        self.belief = Some(posterior.belief.clone());
        self.last_timestamp_us = Some(measurement.timestamp_us);
        debug!(
            "{sensor} update at {} us: x={:?}",
            measurement.timestamp_us, posterior.belief.mean
        );

        Ok(Outcome::Updated(posterior))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn filter() -> CtrvFilter {
        CtrvFilter::new(FilterConfig::default()).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let config = FilterConfig::default().with_process_noise(0.0, 0.5);
        assert!(matches!(
            CtrvFilter::new(config),
            Err(UkfError::InvalidConfig(_))
        ));
    }

    #[test]
    fn uninitialized_defaults() {
        let f = filter();
        assert!(!f.is_initialized());
        assert_eq!(f.state(), StateVector::zeros());
        assert_eq!(f.covariance(), StateCovariance::identity());
        assert_eq!(f.nis(SensorKind::Laser), 0.0);
        assert_eq!(f.last_timestamp(), None);
    }

    #[test]
    fn first_reading_initializes_only() {
        let mut f = filter();
        let outcome = f.process_measurement(&Measurement::laser(3.0, 4.0, 100)).unwrap();
        assert!(matches!(outcome, Outcome::Initialized(_)));
        assert_eq!(f.belief().unwrap().position(), (3.0, 4.0));
        assert_eq!(f.last_timestamp(), Some(100));
        assert_eq!(f.nis(SensorKind::Laser), 0.0);
    }

    #[test]
    fn step_is_pure() {
        let f = filter();
        let prior = f.initialize(&Reading::Laser { px: 1.0, py: 1.0 }).unwrap();
        let reading = Reading::Radar {
            rho: 1.5,
            phi: 0.8,
            rho_dot: 0.5,
        };
        let a = f.step(&prior, &reading, 0.05).unwrap();
        let b = f.step(&prior, &reading, 0.05).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.sensor, SensorKind::Radar);
        assert_eq!(a.dt, 0.05);
        assert!(!f.is_initialized());
    }

    #[test]
    fn timestamp_regression_leaves_state() {
        let mut f = filter();
        f.process_measurement(&Measurement::laser(1.0, 0.0, 1_000_000)).unwrap();
        f.process_measurement(&Measurement::laser(1.1, 0.0, 1_100_000)).unwrap();
        let before = f.belief().cloned();
        let nis = f.nis(SensorKind::Laser);

        let result = f.process_measurement(&Measurement::laser(1.2, 0.0, 1_050_000));
        assert_eq!(
            result,
            Err(UkfError::TimestampRegression {
                last: 1_100_000,
                current: 1_050_000
            })
        );
        assert_eq!(f.belief().cloned(), before);
        assert_eq!(f.nis(SensorKind::Laser), nis);
        assert_eq!(f.last_timestamp(), Some(1_100_000));
    }

    #[test]
    fn equal_timestamps_update_without_motion() {
        let mut f = filter();
        f.process_measurement(&Measurement::laser(2.0, 0.0, 0)).unwrap();
        let outcome = f.process_measurement(&Measurement::laser(2.0, 0.0, 0)).unwrap();
        match outcome {
            Outcome::Updated(posterior) => {
                assert_eq!(posterior.dt, 0.0);
                assert_relative_eq!(posterior.belief.position().0, 2.0, epsilon = 1e-9);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn elapsed_time_spans_the_whole_timestamp_range() {
        assert_eq!(elapsed_seconds(1_000_000, 1_500_000), 0.5);
        assert_eq!(elapsed_seconds(-250_000, 250_000), 0.5);
        let span = elapsed_seconds(i64::MIN, i64::MAX);
        assert!(span.is_finite());
        assert_relative_eq!(span, u64::MAX as f64 / 1e6, max_relative = 1e-12);
    }

    #[test]
    fn far_apart_timestamps_do_not_overflow() {
        let mut f = filter();
        f.process_measurement(&Measurement::laser(1.0, 0.0, i64::MIN))
            .unwrap();
        // The cycle itself may be rejected numerically, but never by a panic.
        let _ = f.process_measurement(&Measurement::laser(1.0, 0.0, i64::MAX));
        assert!(f.is_initialized());
    }

    #[test]
    fn non_finite_reading_is_rejected() {
        let mut f = filter();
        let result = f.process_measurement(&Measurement::radar(f64::NAN, 0.0, 0.0, 0));
        assert_eq!(
            result,
            Err(UkfError::NonFiniteMeasurement {
                sensor: SensorKind::Radar
            })
        );
        assert!(!f.is_initialized());
    }

    #[test]
    fn reset_forgets_belief() {
        let mut f = filter();
        f.process_measurement(&Measurement::laser(1.0, 2.0, 0)).unwrap();
        f.process_measurement(&Measurement::laser(1.0, 2.0, 50_000)).unwrap();
        assert_eq!(f.nis_monitor().stats(SensorKind::Laser).count, 1);
        f.reset();
        assert!(!f.is_initialized());
        assert_eq!(f.nis_monitor().stats(SensorKind::Laser).count, 0);
        let outcome = f.process_measurement(&Measurement::laser(5.0, 5.0, 10)).unwrap();
        assert!(matches!(outcome, Outcome::Initialized(_)));
    }

    #[test]
    fn radar_at_origin_stays_finite() {
        let f = filter();
        let prior = Belief::new(
            StateVector::new(0.0, 0.0, 1.0, 0.0, 0.0),
            StateCovariance::identity() * 1e-12,
        );
        let reading = Reading::Radar {
            rho: 0.1,
            phi: 0.0,
            rho_dot: 0.0,
        };
        let posterior = f.step(&prior, &reading, 0.0).unwrap();
        assert!(posterior.belief.is_finite());
    }
}

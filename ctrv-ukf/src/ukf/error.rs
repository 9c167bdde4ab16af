//! Error types for UKF operations.

use thiserror::Error;

use crate::measurement::SensorKind;

/// Errors that can occur while configuring or running the filter.
///
/// Any error aborts the current cycle; the stored belief, clock and NIS
/// values are left as they were before the call.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum UkfError {
    /// The Cholesky decomposition of the augmented covariance failed; the
    /// belief is no longer positive-definite.
    #[error("augmented covariance is not positive-definite")]
    NotPositiveDefinite,
    /// The innovation covariance of a measurement update could not be inverted.
    #[error("innovation covariance for {sensor} is singular")]
    SingularInnovation { sensor: SensorKind },
    /// A computed mean or covariance contains NaN or infinity.
    #[error("filter produced a non-finite mean or covariance")]
    NonFiniteState,
    /// A reading carried NaN or infinity.
    #[error("{sensor} reading contains a non-finite value")]
    NonFiniteMeasurement { sensor: SensorKind },
    /// A raw reading had the wrong number of components for its sensor.
    #[error("{sensor} reading has {actual} components, expected {expected}")]
    MeasurementDimension {
        sensor: SensorKind,
        expected: usize,
        actual: usize,
    },
    /// A measurement is older than the last processed one.
    #[error("timestamp {current} us precedes last processed timestamp {last} us")]
    TimestampRegression { last: i64, current: i64 },
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

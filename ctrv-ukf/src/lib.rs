//! Unscented Kalman filter for tracking a target under the constant turn rate
//! and velocity (CTRV) motion model, fusing laser (Cartesian position) and
//! radar (range, bearing, range rate) readings.
//!
//! ```no_run
//! use ctrv_ukf::{CtrvFilter, FilterConfig, Measurement, Outcome};
//!
//! let mut filter = CtrvFilter::new(FilterConfig::default())?;
//! filter.process_measurement(&Measurement::laser(0.3, 0.6, 0))?;
//! if let Outcome::Updated(posterior) =
//!     filter.process_measurement(&Measurement::radar(1.0, 1.1, 0.4, 50_000))?
//! {
//!     println!("x = {:?}, nis = {}", posterior.belief.mean, posterior.nis);
//! }
//! # Ok::<(), ctrv_ukf::UkfError>(())
//! ```

pub mod angle;
pub mod config;
pub mod filter;
pub mod measurement;
pub mod nis;
pub mod process;
pub mod sigma_points;
pub mod state;
pub mod ukf;

pub use config::FilterConfig;
pub use filter::{CtrvFilter, Outcome, Posterior};
pub use measurement::{Measurement, MeasurementModel, Reading, SensorKind};
pub use nis::NisMonitor;
pub use state::{Belief, StateCovariance, StateVector};
pub use ukf::UkfError;

pub mod averaging;
pub mod engine;
pub mod error;

pub use crate::sigma_points::UTWeights;

pub use averaging::{AngularAveraging, LinearAveraging, WeightedMean};
pub use engine::{Correction, Prediction, UnscentedEngine};
pub use error::UkfError;

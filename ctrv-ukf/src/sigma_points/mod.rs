//! Sigma-point generation for the augmented CTRV state

pub use self::augmented::AugmentedSigmaPoints;
pub use self::weights::UTWeights;

mod augmented;

#[cfg(test)]
mod tests;

pub mod weights;

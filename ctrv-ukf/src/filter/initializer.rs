//! Belief seeding from the first accepted reading.

use nalgebra::Vector5;

use crate::config::FilterConfig;
use crate::measurement::Reading;
use crate::state::{Belief, StateCovariance, StateVector};

/// Seed a belief from a single reading.
///
/// A radar reading is converted from polar to Cartesian position. Speed cannot
/// be recovered from one range rate under an unknown heading, so it starts at
/// the configured placeholder; heading and turn rate start from
/// `ρ̇ cos φ` and `ρ̇ sin φ`, an order-of-magnitude guess only. A laser reading
/// seeds position directly and uses the configured placeholders for the rest.
pub fn initial_belief(config: &FilterConfig, reading: &Reading) -> Belief {
    let initial = &config.initial;
    match *reading {
        Reading::Radar { rho, phi, rho_dot } => {
            let noise = &config.radar_noise;
            let var_rho = noise.std_rho * noise.std_rho;
            Belief::new(
                StateVector::new(
                    rho * phi.cos(),
                    rho * phi.sin(),
                    initial.speed,
                    rho_dot * phi.cos(),
                    rho_dot * phi.sin(),
                ),
                StateCovariance::from_diagonal(&Vector5::new(
                    var_rho,
                    var_rho,
                    1.0,
                    noise.std_phi,
                    noise.std_phi,
                )),
            )
        }
        Reading::Laser { px, py } => {
            let noise = &config.laser_noise;
            Belief::new(
                StateVector::new(px, py, initial.speed, initial.laser_yaw, initial.laser_yaw_rate),
                StateCovariance::from_diagonal(&Vector5::new(
                    noise.std_px * noise.std_px,
                    noise.std_py * noise.std_py,
                    1.0,
                    1.0,
                    1.0,
                )),
            )
        }
    }
}

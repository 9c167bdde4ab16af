use ctrv_ukf::{CtrvFilter, FilterConfig, Measurement, Outcome, SensorKind};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

struct Truth {
    px: f64,
    py: f64,
    v: f64,
    yaw: f64,
    yaw_rate: f64,
}

impl Truth {
    fn advance(&mut self, dt: f64) {
        let yaw_end = self.yaw + self.yaw_rate * dt;
        let r = self.v / self.yaw_rate;
        self.px += r * (yaw_end.sin() - self.yaw.sin());
        self.py += r * (self.yaw.cos() - yaw_end.cos());
        self.yaw = yaw_end;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dt_us: i64 = 50_000;
    let config = FilterConfig::default();
    let mut ukf = CtrvFilter::new(config)?;

    let mut rng = StdRng::seed_from_u64(42);
    let laser = Normal::new(0.0, config.laser_noise.std_px)?;
    let rho_noise = Normal::new(0.0, config.radar_noise.std_rho)?;
    let phi_noise = Normal::new(0.0, config.radar_noise.std_phi)?;
    let rho_dot_noise = Normal::new(0.0, config.radar_noise.std_rho_dot)?;

    let mut truth = Truth {
        px: 20.0,
        py: 5.0,
        v: 5.0,
        yaw: 0.5,
        yaw_rate: 0.25,
    };
    let mut squared_error = [0.0_f64; 4];
    let mut samples = 0usize;

    for step in 0..500 {
        if step > 0 {
            truth.advance(dt_us as f64 / 1e6);
        }
        let timestamp = step as i64 * dt_us;
        let measurement = if step % 2 == 0 {
            Measurement::laser(
                truth.px + laser.sample(&mut rng),
                truth.py + laser.sample(&mut rng),
                timestamp,
            )
        } else {
            let rho = truth.px.hypot(truth.py);
            let phi = truth.py.atan2(truth.px);
            let rho_dot =
                truth.v * (truth.px * truth.yaw.cos() + truth.py * truth.yaw.sin()) / rho;
            Measurement::radar(
                rho + rho_noise.sample(&mut rng),
                phi + phi_noise.sample(&mut rng),
                rho_dot + rho_dot_noise.sample(&mut rng),
                timestamp,
            )
        };

        let Outcome::Updated(posterior) = ukf.process_measurement(&measurement)? else {
            continue;
        };
        let (px, py) = posterior.belief.position();
        let (vx, vy) = posterior.belief.velocity();
        let truth_v = (truth.v * truth.yaw.cos(), truth.v * truth.yaw.sin());
        for (acc, err) in squared_error.iter_mut().zip([
            px - truth.px,
            py - truth.py,
            vx - truth_v.0,
            vy - truth_v.1,
        ]) {
            *acc += err * err;
        }
        samples += 1;

        if step % 50 == 1 {
            let cov = posterior.belief.covariance;
            info!(
                "step {:03} ({}): pos ({:.2}, {:.2})±({:.2}, {:.2}), v {:.2}, yaw rate {:.3}, nis {:.2}, true pos ({:.2}, {:.2})",
                step,
                posterior.sensor,
                px,
                py,
                cov[(0, 0)].sqrt(),
                cov[(1, 1)].sqrt(),
                posterior.belief.speed(),
                posterior.belief.yaw_rate(),
                posterior.nis,
                truth.px,
                truth.py
            );
        }
    }

    let rmse = squared_error.map(|s| (s / samples as f64).sqrt());
    println!(
        "RMSE px {:.3}, py {:.3}, vx {:.3}, vy {:.3}",
        rmse[0], rmse[1], rmse[2], rmse[3]
    );
    for sensor in [SensorKind::Laser, SensorKind::Radar] {
        let stats = ukf.nis_monitor().stats(sensor);
        println!(
            "{sensor}: {} updates, mean NIS {:.2}, {:.1}% below 95% quantile",
            stats.count,
            stats.mean().unwrap_or(0.0),
            100.0 * stats.fraction_below().unwrap_or(0.0)
        );
    }
    Ok(())
}

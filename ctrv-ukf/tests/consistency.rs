use ctrv_ukf::{CtrvFilter, FilterConfig, Measurement, Outcome, SensorKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

const DT_US: i64 = 50_000;

/// Noise-free CTRV target on a left turn that never comes within 4 m of the sensor.
struct Target {
    px: f64,
    py: f64,
    v: f64,
    yaw: f64,
    yaw_rate: f64,
}

impl Target {
    fn advance(&mut self, dt: f64) {
        let yaw_end = self.yaw + self.yaw_rate * dt;
        let r = self.v / self.yaw_rate;
        self.px += r * (yaw_end.sin() - self.yaw.sin());
        self.py += r * (self.yaw.cos() - yaw_end.cos());
        self.yaw = yaw_end;
    }

    fn radar(&self) -> (f64, f64, f64) {
        let rho = self.px.hypot(self.py);
        let rho_dot = self.v * (self.px * self.yaw.cos() + self.py * self.yaw.sin()) / rho;
        (rho, self.py.atan2(self.px), rho_dot)
    }
}

struct Run {
    filter: CtrvFilter,
    squared_error: f64,
    samples: usize,
}

fn simulate(seed: u64, steps: usize) -> Run {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = FilterConfig::default();
    let mut filter = CtrvFilter::new(config).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    let laser_px = Normal::new(0.0, config.laser_noise.std_px).unwrap();
    let laser_py = Normal::new(0.0, config.laser_noise.std_py).unwrap();
    let radar_rho = Normal::new(0.0, config.radar_noise.std_rho).unwrap();
    let radar_phi = Normal::new(0.0, config.radar_noise.std_phi).unwrap();
    let radar_rho_dot = Normal::new(0.0, config.radar_noise.std_rho_dot).unwrap();

    let mut target = Target {
        px: 20.0,
        py: 5.0,
        v: 4.0,
        yaw: 0.5,
        yaw_rate: 0.2,
    };
    let mut squared_error = 0.0;
    let mut samples = 0;

    for k in 0..steps {
        let timestamp = k as i64 * DT_US;
        if k > 0 {
            target.advance(DT_US as f64 / 1e6);
        }
        let measurement = if k % 2 == 0 {
            Measurement::laser(
                target.px + laser_px.sample(&mut rng),
                target.py + laser_py.sample(&mut rng),
                timestamp,
            )
        } else {
            let (rho, phi, rho_dot) = target.radar();
            Measurement::radar(
                rho + radar_rho.sample(&mut rng),
                phi + radar_phi.sample(&mut rng),
                rho_dot + radar_rho_dot.sample(&mut rng),
                timestamp,
            )
        };

        let outcome = filter.process_measurement(&measurement).unwrap();
        if let Outcome::Updated(posterior) = outcome {
            let p = posterior.belief.covariance;
            assert_eq!(p, p.transpose(), "asymmetric covariance at step {k}");
            if k >= 40 {
                let (px, py) = posterior.belief.position();
                squared_error += (px - target.px).powi(2) + (py - target.py).powi(2);
                samples += 1;
            }
        }
    }

    Run {
        filter,
        squared_error,
        samples,
    }
}

#[test]
fn nis_mostly_below_chi_square_quantile() {
    let run = simulate(7, 600);
    let monitor = run.filter.nis_monitor();

    for sensor in [SensorKind::Laser, SensorKind::Radar] {
        let stats = monitor.stats(sensor);
        assert!(stats.count > 250);
        let fraction = stats.fraction_below().unwrap();
        assert!(
            fraction > 0.92,
            "{sensor}: only {:.1}% of NIS values below the 95% quantile",
            100.0 * fraction
        );
    }
}

#[test]
fn tracks_a_turning_target() {
    let run = simulate(11, 400);
    let rmse = (run.squared_error / run.samples as f64).sqrt();
    assert!(rmse < 0.3, "position RMSE {rmse}");

    let belief = run.filter.belief().unwrap();
    assert!((belief.speed() - 4.0).abs() < 1.0);
    assert!((belief.yaw_rate() - 0.2).abs() < 0.3);
}

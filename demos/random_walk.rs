//! Tracking a random walk in the plane.
//!
//! A two dimensional constant acceleration Kalman filter follows a walker whose heading drifts at
//! random. The trail of filtered positions is coloured to fade into the background.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use nalgebra::{Matrix6, Vector6};
use rand::rngs::StdRng;
use rand::SeedableRng;

use track_estimate::cycle::{self, CycleConfig};
use track_estimate::estimators::constant_accel::ConstantAccelFilter;
use track_estimate::models::KalmanState;
use track_estimate::process::{RandomWalk, RandomWalkConfig};
use track_estimate::trail::{fade_gradient, Rgb};

const GRAY: Rgb = [100, 100, 100];
const RED: Rgb = [225, 0, 0];
const TRAIL_LEN: usize = 100;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let walk_config = RandomWalkConfig { observation_noise: 2.0, ..RandomWalkConfig::default() };
    let walk = RandomWalk::new(walk_config)?;
    let state = KalmanState {
        x: Vector6::new(walk_config.x, 0., 0., walk_config.y, 0., 0.),
        X: Matrix6::identity() * 10.,
    };
    let mut filter = ConstantAccelFilter::new(state)?;
    let config = CycleConfig { dt: 0.06, steps: 500, measurement_var: 4.0, ..CycleConfig::default() };
    let stop = Arc::new(AtomicBool::new(false));

    let reports = cycle::run(walk, StdRng::seed_from_u64(0), &mut filter, None, &config, &stop)?;

    println!("t\ttrue x\ttrue y\tmeasured x\tmeasured y\tfiltered x\tfiltered y");
    for r in &reports {
        println!(
            "{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
            r.t, r.truth[0], r.truth[1], r.observation[0], r.observation[1], r.corrected[0], r.corrected[1]
        );
    }

    let recent = &reports[reports.len().saturating_sub(TRAIL_LEN)..];
    let points: Vec<(f64, f64)> = recent.iter().map(|r| (r.corrected[0], r.corrected[1])).collect();
    for ((x, y), colour) in fade_gradient(&points, RED, GRAY, TRAIL_LEN)? {
        println!("trail {:.1} {:.1} #{:02x}{:02x}{:02x}", x, y, colour[0], colour[1], colour[2]);
    }
    Ok(())
}

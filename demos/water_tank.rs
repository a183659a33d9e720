//! Closed loop control of a leaking water tank.
//!
//! A scalar Kalman filter estimates the tank level from noisy readings and a hysteresis controller
//! opens the inlet when the filtered level stays low and closes it when it stays high.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use track_estimate::control::{ControllerConfig, HysteresisController};
use track_estimate::cycle::{self, CycleConfig};
use track_estimate::estimators::scalar::{ScalarKalmanFilter, ScalarModel};
use track_estimate::process::{WaterTank, WaterTankConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tank = WaterTank::new(WaterTankConfig::default())?;
    // The level decays slightly and rises 2 per second with the inlet open
    let model = ScalarModel::new(0.99, 2.0, 1.0, 2.0)?;
    let mut filter = ScalarKalmanFilter::new(model, 10.0, 30.0)?;
    let mut controller = HysteresisController::new(ControllerConfig::default())?;
    let config = CycleConfig::default();
    let stop = Arc::new(AtomicBool::new(false));

    let reports = cycle::run(tank, StdRng::seed_from_u64(0), &mut filter, Some(&mut controller), &config, &stop)?;

    println!("t\ttrue\tmeasured\tpredicted\tfiltered\tvar\tK\tcontrol\tpatience");
    for r in &reports {
        println!(
            "{:.1}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.3}\t{:.3}\t{}\t{}",
            r.t, r.truth[0], r.observation[0], r.predicted[0], r.corrected[0],
            r.covariance[(0, 0)], r.gain[(0, 0)], r.control, r.patience_count
        );
    }
    Ok(())
}

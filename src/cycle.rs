#![allow(non_snake_case)]

//! The estimation loop.
//!
//! A synthetic process runs on its own thread and hands one immutable [`ObservationRecord`] per
//! cycle to the estimator through a bounded channel. The estimator, the controller and the history
//! of [`CycleReport`]s stay on the caller's thread; nothing is shared mutably between the two.
//!
//! With a controller the loop runs in lock step: the control signal computed from cycle n is sent
//! back to the process and applied in cycle n+1. Without one the process runs ahead of the
//! estimator by at most the channel capacity.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread;

use nalgebra::{DMatrix, DVector};
use rand_core::RngCore;
use thiserror::Error;

use crate::control::HysteresisController;
use crate::error::{EstimateError, EstimateResult};
use crate::linalg::check_timestep;
use crate::models::Estimator;
use crate::process::SyntheticProcess;

/// The reading the controller acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlSource {
    /// The raw observation
    Measured,
    /// The corrected estimate
    Filtered,
}

/// Loop configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleConfig {
    /// Elapsed time per cycle
    pub dt: f64,
    /// Number of cycles
    pub steps: usize,
    /// Observation noise variance, on each observed component
    pub measurement_var: f64,
    /// Records the process may run ahead of the estimator
    pub channel_capacity: usize,
    pub control_source: ControlSource,
}

impl Default for CycleConfig {
    fn default() -> Self {
        CycleConfig {
            dt: 0.5,
            steps: 1000,
            measurement_var: 1.0,
            channel_capacity: 16,
            control_source: ControlSource::Filtered,
        }
    }
}

/// What the process hands to the estimator each cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub step: usize,
    pub t: f64,
    pub dt: f64,
    /// Control input the process was driven with
    pub control: DVector<f64>,
    pub observation: DVector<f64>,
    pub truth: DVector<f64>,
}

/// The outcome of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub t: f64,
    pub truth: DVector<f64>,
    pub observation: DVector<f64>,
    pub predicted: DVector<f64>,
    pub corrected: DVector<f64>,
    pub covariance: DMatrix<f64>,
    pub gain: DMatrix<f64>,
    /// Control signal computed this cycle, applied in the next
    pub control: f64,
    pub patience_count: u32,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CycleError {
    #[error(transparent)]
    Estimate(#[from] EstimateError),
    #[error("process thread panicked")]
    ProcessPanicked,
}

/// Run the estimation loop until `config.steps` cycles have completed or `stop` is raised.
///
/// Returns the report of every completed cycle. An error from either side stops both. The `stop`
/// flag is only read, never raised here.
pub fn run<P, R, E>(
    mut process: P,
    mut rng: R,
    estimator: &mut E,
    controller: Option<&mut HysteresisController<f64>>,
    config: &CycleConfig,
    stop: &Arc<AtomicBool>,
) -> Result<Vec<CycleReport>, CycleError>
where
    P: SyntheticProcess + Send + 'static,
    R: RngCore + Send + 'static,
    E: Estimator<f64>,
{
    check_timestep(config.dt)?;
    let (_, z_dim, u_dim) = estimator.dims();
    let (process_z_dim, process_u_dim) = process.dims();
    if (process_z_dim, process_u_dim) != (z_dim, u_dim) {
        return Err(EstimateError::DimensionMismatch {
            what: "process (observation, control)",
            expected: (z_dim, u_dim),
            actual: (process_z_dim, process_u_dim),
        }
        .into());
    }

    let feedback = controller.is_some();
    let (record_tx, record_rx) = sync_channel::<ObservationRecord>(config.channel_capacity);
    let (control_tx, control_rx) = sync_channel::<DVector<f64>>(1);

    log::info!("estimation loop starting: {} steps of {}s", config.steps, config.dt);
    let producer = {
        let stop = Arc::clone(stop);
        let (dt, steps) = (config.dt, config.steps);
        thread::spawn(move || -> EstimateResult<()> {
            let mut control = DVector::zeros(u_dim);
            for step in 0..steps {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                let sample = process.step(dt, &control, &mut rng)?;
                let record = ObservationRecord {
                    step,
                    t: dt * step as f64,
                    dt,
                    control: control.clone(),
                    observation: sample.observation,
                    truth: sample.truth,
                };
                if record_tx.send(record).is_err() {
                    break;
                }
                if feedback {
                    match control_rx.recv() {
                        Ok(next) => control = next,
                        Err(_) => break,
                    }
                }
            }
            Ok(())
        })
    };

    // consume drops its channel ends on return, which unblocks and ends the producer
    let consumed = consume(record_rx, control_tx, estimator, controller, config, stop);
    let produced = producer.join().map_err(|_| CycleError::ProcessPanicked)?;
    let reports = consumed?;
    produced?;
    log::info!("estimation loop stopped after {} cycles", reports.len());

    Ok(reports)
}

/// The estimator side. Owns the receiving end so returning releases a blocked producer.
fn consume<E: Estimator<f64>>(
    record_rx: Receiver<ObservationRecord>,
    control_tx: SyncSender<DVector<f64>>,
    estimator: &mut E,
    mut controller: Option<&mut HysteresisController<f64>>,
    config: &CycleConfig,
    stop: &AtomicBool,
) -> EstimateResult<Vec<CycleReport>> {
    let (_, z_dim, u_dim) = estimator.dims();
    let R = DMatrix::identity(z_dim, z_dim) * config.measurement_var;
    let mut reports = Vec::with_capacity(config.steps);

    for record in record_rx.iter() {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let predicted = estimator.predict_dynamic(record.dt, &record.control)?;
        let corrected = estimator.update_dynamic(&record.observation, &R, record.dt)?;

        let (control, patience_count) = match controller.as_mut() {
            Some(c) => {
                let reading = match config.control_source {
                    ControlSource::Measured => record.observation[0],
                    ControlSource::Filtered => corrected[0],
                };
                let (_, count) = c.step(reading);
                (c.control_signal(), count)
            }
            None => (0.0, 0),
        };

        reports.push(CycleReport {
            t: record.t,
            truth: record.truth,
            observation: record.observation,
            predicted,
            corrected,
            covariance: estimator.covariance(),
            gain: estimator.gain(),
            control,
            patience_count,
        });

        if controller.is_some() && control_tx.send(DVector::from_element(u_dim, control)).is_err() {
            break;
        }
    }

    Ok(reports)
}

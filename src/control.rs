//! Debounced hysteresis control.
//!
//! A bang-bang controller over a scalar reading. A reading outside the dead band must persist for
//! more than `patience` consecutive steps before the output is switched, and the output then holds
//! until it is switched again.
//!
//! The threshold names are inverted: `max_level_to_trigger` is the LOW threshold (readings below it
//! switch the output on) and `min_level_to_trigger` is the HIGH threshold (readings above it switch
//! the output off). Both count on the same patience counter.

use nalgebra::{self as na, RealField};

use crate::error::{EstimateError, EstimateResult};
use crate::linalg::to_f64;

/// Controller configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerConfig<N: RealField> {
    /// Consecutive out of band steps tolerated before switching
    pub patience: u32,
    /// Low threshold
    pub max_level_to_trigger: N,
    /// High threshold
    pub min_level_to_trigger: N,
}

impl<N: RealField> Default for ControllerConfig<N> {
    fn default() -> Self {
        ControllerConfig {
            patience: 10,
            max_level_to_trigger: na::convert(20.0),
            min_level_to_trigger: na::convert(80.0),
        }
    }
}

/// Hysteresis controller with a debounce counter and a sticky output.
#[derive(Debug, Clone, PartialEq)]
pub struct HysteresisController<N: RealField> {
    config: ControllerConfig<N>,
    patience_count: u32,
    control_output: bool,
}

impl<N: RealField> HysteresisController<N> {
    /// The thresholds must be ordered `max_level_to_trigger < min_level_to_trigger`.
    pub fn new(config: ControllerConfig<N>) -> EstimateResult<Self> {
        // IEC 559 NaN values are never true
        if !(config.max_level_to_trigger < config.min_level_to_trigger) {
            return Err(EstimateError::Configuration(
                "max_level_to_trigger must be below min_level_to_trigger",
            ));
        }
        Ok(HysteresisController { config, patience_count: 0, control_output: false })
    }

    pub fn config(&self) -> &ControllerConfig<N> {
        &self.config
    }

    pub fn patience_count(&self) -> u32 {
        self.patience_count
    }

    pub fn control_output(&self) -> bool {
        self.control_output
    }

    /// The output as a control input, one or zero.
    pub fn control_signal(&self) -> N {
        if self.control_output {
            N::one()
        } else {
            N::zero()
        }
    }

    /// Advance with a reading. Returns (control_output, patience_count).
    pub fn step(&mut self, reading: N) -> (bool, u32) {
        let low = reading < self.config.max_level_to_trigger;
        if low || reading > self.config.min_level_to_trigger {
            self.patience_count = self.patience_count.saturating_add(1);
        } else {
            self.patience_count = 0;
        }

        if self.patience_count > self.config.patience {
            if low != self.control_output {
                log::debug!(
                    "control output {} after {} steps at reading {}",
                    low,
                    self.patience_count,
                    to_f64(reading)
                );
            }
            self.control_output = low;
        }

        (self.control_output, self.patience_count)
    }
}

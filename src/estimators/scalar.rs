//! Scalar state estimation.
//!
//! A one state Kalman filter where the model F, B, H and the process noise variance are plain
//! numbers. Prediction adds the process noise variance to the estimate variance so uncertainty grows
//! between observations, the symmetric form of the recursion.

use na::{DMatrix, DVector, Matrix1, RealField, U1};
use nalgebra as na;

use crate::error::{EstimateError, EstimateResult};
use crate::linalg::{check_timestep, to_f64};
use crate::models::{check_control, check_observation, Estimator, StateSpaceModel};

/// Scalar linear model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarModel<N: RealField> {
    /// State transition
    pub f: N,
    /// Control effect per unit time
    pub b: N,
    /// Observation
    pub h: N,
    /// Variance added to the estimate with each prediction
    pub process_noise_var: N,
}

impl<N: RealField> ScalarModel<N> {
    pub fn new(f: N, b: N, h: N, process_noise_var: N) -> EstimateResult<Self> {
        // IEC 559 NaN values are never true
        if !(process_noise_var >= N::zero()) {
            return Err(EstimateError::Configuration("process noise variance must be >= 0"));
        }
        Ok(ScalarModel { f, b, h, process_noise_var })
    }
}

impl<N: RealField> StateSpaceModel<N, U1, U1, U1> for ScalarModel<N> {
    fn Fx(&self, _dt: N) -> Matrix1<N> {
        Matrix1::new(self.f)
    }

    fn Bx(&self) -> Matrix1<N> {
        Matrix1::new(self.b)
    }

    fn Hx(&self) -> Matrix1<N> {
        Matrix1::new(self.h)
    }
}

/// Scalar Kalman filter.
///
/// Owns the state x, its variance p and the gain of the last update.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarKalmanFilter<N: RealField> {
    model: ScalarModel<N>,
    x: N,
    p: N,
    k: N,
}

impl<N: RealField> ScalarKalmanFilter<N> {
    pub fn new(model: ScalarModel<N>, init_x: N, init_p: N) -> EstimateResult<Self> {
        if !(init_p >= N::zero()) {
            return Err(EstimateError::Configuration("initial variance must be >= 0"));
        }
        Ok(ScalarKalmanFilter { model, x: init_x, p: init_p, k: N::zero() })
    }

    pub fn model(&self) -> &ScalarModel<N> {
        &self.model
    }

    /// State estimate
    pub fn x(&self) -> N {
        self.x
    }

    /// Estimate variance
    pub fn p(&self) -> N {
        self.p
    }

    /// Gain of the last update, zero before any update.
    pub fn k(&self) -> N {
        self.k
    }

    /// Predict over dt.
    ///
    /// x = F.x + B.dt.u, p = p + q. Returns the predicted (x, p).
    pub fn predict(&mut self, dt: N, control_input: N) -> EstimateResult<(N, N)> {
        check_timestep(dt)?;
        let m = &self.model;
        self.x = m.f * self.x + m.b * dt * control_input;
        self.p += m.process_noise_var;
        log::trace!("scalar predict dt={} x={} p={}", to_f64(dt), to_f64(self.x), to_f64(self.p));

        Ok((self.x, self.p))
    }

    /// Correct with a reading of the given variance.
    ///
    /// K = p/(p+r), x = (1-K.H).x + K.z, p = (1-K).p. Returns the corrected (x, p, K).
    /// An infinite sensor variance carries no information and leaves x, p unchanged.
    pub fn update(&mut self, reading: N, sensor_variance: N, dt: N) -> EstimateResult<(N, N, N)> {
        check_timestep(dt)?;
        // IEC 559 NaN values are never true
        if !(sensor_variance >= N::zero()) {
            return Err(EstimateError::InvalidCovariance("sensor variance must be >= 0"));
        }
        let s = self.p + sensor_variance;
        if s == N::zero() {
            log::warn!("scalar innovation variance is zero");
            return Err(EstimateError::SingularMatrix("innovation variance p + r"));
        }
        let k = self.p / s;
        self.x = (N::one() - k * self.model.h) * self.x + k * reading;
        self.p = (N::one() - k) * self.p;
        self.k = k;
        log::trace!("scalar update z={} K={} x={} p={}", to_f64(reading), to_f64(k), to_f64(self.x), to_f64(self.p));

        Ok((self.x, self.p, self.k))
    }
}

impl<N: RealField> Estimator<N> for ScalarKalmanFilter<N> {
    fn dims(&self) -> (usize, usize, usize) {
        self.model.dims()
    }

    /// Returns the predicted state.
    fn predict_dynamic(&mut self, dt: N, control: &DVector<N>) -> EstimateResult<DVector<N>> {
        check_control(self.dims(), control)?;
        let (x, _) = self.predict(dt, control[0])?;
        Ok(DVector::from_vec(vec![x]))
    }

    /// Returns the corrected state.
    #[allow(non_snake_case)]
    fn update_dynamic(&mut self, z: &DVector<N>, R: &DMatrix<N>, dt: N) -> EstimateResult<DVector<N>> {
        check_observation(self.dims(), z, R)?;
        let (x, _, _) = self.update(z[0], R[(0, 0)], dt)?;
        Ok(DVector::from_vec(vec![x]))
    }

    fn state(&self) -> DVector<N> {
        DVector::from_vec(vec![self.x])
    }

    fn covariance(&self) -> DMatrix<N> {
        DMatrix::from_element(1, 1, self.p)
    }

    fn gain(&self) -> DMatrix<N> {
        DMatrix::from_element(1, 1, self.k)
    }
}

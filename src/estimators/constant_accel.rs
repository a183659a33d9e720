#![allow(non_snake_case)]

//! Constant acceleration state estimation in two dimensions.
//!
//! The state is the six vector [px, vx, ax, py, vy, ay]; the observation is the position (px, py).
//! The two axes are kinematically independent.
//!
//! Prediction only advances the state mean. The covariance and the gain change exclusively during
//! correction, so no uncertainty is added between observations. A correction uses the gain stored at
//! the end of the previous correction and only then recomputes the gain for the next cycle:
//! ```text
//! x = x + K.(z - H.x)
//! X = X - K.H.X
//! K = X.H'.(H.X.H' + R)^-1
//! ```

use na::{DMatrix, DVector, Matrix2, Matrix2x6, Matrix6, Matrix6x1, Matrix6x2, RealField, Vector1, Vector2, Vector6, U1, U2, U6};
use nalgebra as na;

use crate::error::EstimateResult;
use crate::linalg::{check_covariance, check_timestep, invert_innovation, make_symmetric, to_dmatrix, to_dvector, to_f64};
use crate::models::{check_control, check_observation, Estimator, KalmanState, StateSpaceModel};

/// Position gain used before the first correction.
///
/// A small constant, not derived from the model or the initial covariance. The first corrections
/// therefore barely move the estimate. [`ConstantAccelFilter::with_first_gain`] derives it instead.
pub const INITIAL_GAIN: f64 = 0.01;

/// Constant acceleration kinematics for two independent axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstantAccelModel;

impl<N: RealField> StateSpaceModel<N, U6, U2, U1> for ConstantAccelModel {
    /// Per axis [[1, dt, dt^2/2], [0, 1, dt], [0, 0, 1]].
    fn Fx(&self, dt: N) -> Matrix6<N> {
        let half: N = na::convert(0.5);
        let mut F = Matrix6::identity();
        for &a in &[0usize, 3] {
            F[(a, a + 1)] = dt;
            F[(a, a + 2)] = half * dt * dt;
            F[(a + 1, a + 2)] = dt;
        }
        F
    }

    /// No control influence.
    fn Bx(&self) -> Matrix6x1<N> {
        Matrix6x1::zeros()
    }

    /// Selects px and py.
    fn Hx(&self) -> Matrix2x6<N> {
        let mut H = Matrix2x6::zeros();
        H[(0, 0)] = N::one();
        H[(1, 3)] = N::one();
        H
    }
}

/// The gain used before the first correction, [`INITIAL_GAIN`] on the position components.
pub fn initial_gain<N: RealField>() -> Matrix6x2<N> {
    let H: Matrix2x6<N> = ConstantAccelModel.Hx();
    H.transpose() * na::convert::<f64, N>(INITIAL_GAIN)
}

/// Two dimensional constant acceleration Kalman filter.
#[derive(Clone, PartialEq)]
pub struct ConstantAccelFilter<N: RealField> {
    model: ConstantAccelModel,
    state: KalmanState<N, U6>,
    K: Matrix6x2<N>,
}

impl<N: RealField> ConstantAccelFilter<N> {
    /// Starts from `state` with the [`initial_gain`].
    pub fn new(state: KalmanState<N, U6>) -> EstimateResult<Self> {
        Self::with_gain(state, initial_gain())
    }

    /// Starts from `state` with a given gain for the first correction.
    pub fn with_gain(state: KalmanState<N, U6>, K: Matrix6x2<N>) -> EstimateResult<Self> {
        state.check()?;
        Ok(ConstantAccelFilter { model: ConstantAccelModel, state, K })
    }

    /// Starts from `state` with the first gain derived from its covariance and the expected
    /// observation noise `R`.
    pub fn with_first_gain(state: KalmanState<N, U6>, R: &Matrix2<N>) -> EstimateResult<Self> {
        state.check()?;
        check_covariance(R, "R not PSD")?;
        let K = gain(&ConstantAccelModel.Hx(), &state.X, R)?;
        Ok(ConstantAccelFilter { model: ConstantAccelModel, state, K })
    }

    pub fn kalman_state(&self) -> &KalmanState<N, U6> {
        &self.state
    }

    /// The gain the next correction will use.
    pub fn kalman_gain(&self) -> &Matrix6x2<N> {
        &self.K
    }

    /// Position of the state estimate.
    pub fn position(&self) -> Vector2<N> {
        let H: Matrix2x6<N> = self.model.Hx();
        H * &self.state.x
    }

    /// Predict over dt. x = F(dt).x + B.dt.u, the covariance is unchanged.
    ///
    /// Returns the predicted position.
    pub fn predict(&mut self, dt: N, control_input: &Vector1<N>) -> EstimateResult<Vector2<N>> {
        check_timestep(dt)?;
        let F: Matrix6<N> = self.model.Fx(dt);
        let B: Matrix6x1<N> = self.model.Bx();
        self.state.x = F * &self.state.x + B * control_input * dt;
        log::trace!("constant accel predict dt={}", to_f64(dt));

        Ok(self.position())
    }

    /// Correct with an observed position z with noise covariance R.
    ///
    /// The stored gain corrects the state and covariance, then the gain for the next correction is
    /// computed from the corrected covariance. Nothing is changed if that gain cannot be computed.
    /// Returns the corrected position.
    pub fn update(&mut self, z: &Vector2<N>, R: &Matrix2<N>, dt: N) -> EstimateResult<Vector2<N>> {
        check_timestep(dt)?;
        check_covariance(R, "R not PSD")?;
        let H: Matrix2x6<N> = self.model.Hx();

        let x: Vector6<N> = &self.state.x + &self.K * (z - &H * &self.state.x);
        let mut X: Matrix6<N> = &self.state.X - &self.K * &H * &self.state.X;
        make_symmetric(&mut X);
        let K = gain(&H, &X, R)?;

        self.state.x = x;
        self.state.X = X;
        self.K = K;
        log::trace!("constant accel update trace(X)={}", to_f64(self.state.X.trace()));

        Ok(self.position())
    }
}

/// Kalman gain X.H'.(H.X.H' + R)^-1
fn gain<N: RealField>(H: &Matrix2x6<N>, X: &Matrix6<N>, R: &Matrix2<N>) -> EstimateResult<Matrix6x2<N>> {
    let XHt: Matrix6x2<N> = X * H.transpose();
    let S: Matrix2<N> = H * &XHt + R;
    let SI = invert_innovation(S)?;
    Ok(XHt * SI)
}

impl<N: RealField> Estimator<N> for ConstantAccelFilter<N> {
    fn dims(&self) -> (usize, usize, usize) {
        StateSpaceModel::<N, U6, U2, U1>::dims(&self.model)
    }

    fn predict_dynamic(&mut self, dt: N, control: &DVector<N>) -> EstimateResult<DVector<N>> {
        check_control(self.dims(), control)?;
        let position = self.predict(dt, &Vector1::new(control[0]))?;
        Ok(to_dvector(&position))
    }

    fn update_dynamic(&mut self, z: &DVector<N>, R: &DMatrix<N>, dt: N) -> EstimateResult<DVector<N>> {
        check_observation(self.dims(), z, R)?;
        let z = Vector2::new(z[0], z[1]);
        let R = Matrix2::new(R[(0, 0)], R[(0, 1)], R[(1, 0)], R[(1, 1)]);
        let position = self.update(&z, &R, dt)?;
        Ok(to_dvector(&position))
    }

    fn state(&self) -> DVector<N> {
        to_dvector(&self.state.x)
    }

    fn covariance(&self) -> DMatrix<N> {
        to_dmatrix(&self.state.X)
    }

    fn gain(&self) -> DMatrix<N> {
        to_dmatrix(&self.K)
    }
}

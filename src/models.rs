#![allow(non_snake_case)]

//! Estimation models.
//!
//! State representations are modeled as structs.
//! State space models and the per cycle estimation operations are defined as traits.

use na::{allocator::Allocator, DefaultAllocator, DimName, DMatrix, DVector, MatrixMN, MatrixN, RealField, VectorN};
use nalgebra as na;

use crate::error::EstimateResult;
use crate::linalg;

/// Kalman State.
///
/// Linear representation as a state vector and the state covariance (symmetric positive semi-definite) matrix.
#[derive(PartialEq, Clone)]
pub struct KalmanState<N: RealField, D: DimName>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// State vector
    pub x: VectorN<N, D>,
    /// State covariance matrix (symmetric positive semi-definite)
    pub X: MatrixN<N, D>,
}

impl<N: RealField, D: DimName> KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    pub fn new_zero() -> KalmanState<N, D> {
        KalmanState {
            x: VectorN::zeros(),
            X: MatrixN::zeros(),
        }
    }

    /// Checks the covariance is PSD, returning its reciprocal condition estimate.
    pub fn check(&self) -> EstimateResult<N> {
        linalg::check_covariance(&self.X, "X not PSD")
    }
}

/// A linear state space model.
///
/// D is the state dimension, ZD the observation dimension and UD the control dimension.
pub trait StateSpaceModel<N: RealField, D: DimName, ZD: DimName, UD: DimName>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D, UD> + Allocator<N, ZD, D>,
{
    /// State transition matrix for an elapsed time.
    fn Fx(&self, dt: N) -> MatrixN<N, D>;

    /// Control matrix, the control effect per unit time.
    fn Bx(&self) -> MatrixMN<N, D, UD>;

    /// Observation matrix.
    fn Hx(&self) -> MatrixMN<N, ZD, D>;

    /// (state, observation, control) dimensions.
    fn dims(&self) -> (usize, usize, usize) {
        (D::dim(), ZD::dim(), UD::dim())
    }
}

/// A state estimator driven one cycle at a time.
///
/// The dynamic boundary of the filters. Vectors and matrices are shape checked against the model
/// before any filtering so a mis-sized observation record fails with a dimension mismatch.
pub trait Estimator<N: RealField> {
    /// (state, observation, control) dimensions.
    fn dims(&self) -> (usize, usize, usize);

    /// Predict over dt with a control input. Returns the predicted estimate as reported by the
    /// estimator, its state or the observable part of its state.
    fn predict_dynamic(&mut self, dt: N, control: &DVector<N>) -> EstimateResult<DVector<N>>;

    /// Correct with an observation z and its noise covariance R. Returns the corrected estimate in
    /// the same form as `predict_dynamic`.
    fn update_dynamic(&mut self, z: &DVector<N>, R: &DMatrix<N>, dt: N) -> EstimateResult<DVector<N>>;

    /// The state estimate.
    fn state(&self) -> DVector<N>;

    /// The state covariance.
    fn covariance(&self) -> DMatrix<N>;

    /// The Kalman gain last computed.
    fn gain(&self) -> DMatrix<N>;
}

/// Shape checks for the dynamic boundary of an estimator.
pub(crate) fn check_control<N: RealField>(dims: (usize, usize, usize), control: &DVector<N>) -> EstimateResult<()> {
    linalg::check_shape("control input", control, (dims.2, 1))
}

pub(crate) fn check_observation<N: RealField>(
    dims: (usize, usize, usize),
    z: &DVector<N>,
    R: &DMatrix<N>,
) -> EstimateResult<()> {
    linalg::check_shape("observation", z, (dims.1, 1))?;
    linalg::check_shape("observation covariance", R, (dims.1, dims.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstimateError;
    use na::{Matrix2, Vector2, U2};

    #[test]
    fn zero_state_is_psd() {
        let state = KalmanState::<f64, U2>::new_zero();
        assert_eq!(state.check(), Ok(0.0));
    }

    #[test]
    fn negative_covariance_rejected() {
        let state = KalmanState::<f64, U2> {
            x: Vector2::new(1., 2.),
            X: Matrix2::new(1., 0., 0., -2.),
        };
        assert_eq!(state.check(), Err(EstimateError::InvalidCovariance("X not PSD")));
    }

    #[test]
    fn observation_shapes() {
        let dims = (6, 2, 1);
        let z = DVector::from_vec(vec![1., 2.]);
        assert!(check_observation(dims, &z, &DMatrix::identity(2, 2)).is_ok());
        assert!(check_observation(dims, &z, &DMatrix::identity(3, 3)).is_err());
        assert!(check_observation(dims, &DVector::from_vec(vec![1.]), &DMatrix::identity(2, 2)).is_err());
        assert!(check_control(dims, &DVector::from_vec(vec![0.])).is_ok());
        assert!(check_control(dims, &DVector::<f64>::zeros(0)).is_err());
    }
}

//! Linear algebra support for the filters.
//!
//! Boundary checks are made here, before any matrix operation, so that the filters never fail deep
//! inside a product with a shape or timestep error.

#![allow(non_snake_case)]

use nalgebra as na;
use na::{allocator::Allocator, DefaultAllocator, Dim, DMatrix, DVector, Matrix, MatrixN, RealField, U1};
use na::storage::Storage;

use crate::error::{EstimateError, EstimateResult};

pub mod rcond;

/// Lossy conversion of a scalar for diagnostics. NaN if the scalar has no f64 representation.
pub fn to_f64<N: RealField>(v: N) -> f64 {
    na::try_convert::<N, f64>(v).unwrap_or(std::f64::NAN)
}

/**
 * Checks the elapsed time is > 0
 * IEC 559 NaN values are never true
 */
pub fn check_timestep<N: RealField>(dt: N) -> EstimateResult<N> {
    if dt > N::zero() {
        Ok(dt)
    } else {
        Err(EstimateError::InvalidTimestep { dt: to_f64(dt) })
    }
}

/// Checks a matrix (or vector) has the expected (rows, columns) shape.
pub fn check_shape<N, R, C, S>(
    what: &'static str,
    m: &Matrix<N, R, C, S>,
    expected: (usize, usize),
) -> EstimateResult<()>
where
    N: RealField,
    R: Dim,
    C: Dim,
    S: Storage<N, R, C>,
{
    let actual = m.shape();
    if actual == expected {
        Ok(())
    } else {
        Err(EstimateError::DimensionMismatch { what, expected, actual })
    }
}

/// Checks a covariance is usable: non negative diagonal and no NaN.
pub fn check_covariance<N: RealField, D: Dim>(X: &MatrixN<N, D>, message: &'static str) -> EstimateResult<N>
where
    DefaultAllocator: Allocator<N, D, D>,
{
    let rcond = rcond::rcond_symmetric(X);
    if rcond >= N::zero() {
        Ok(rcond)
    } else {
        Err(EstimateError::InvalidCovariance(message))
    }
}

/// Inverse of an innovation covariance S = H.X.H' + R.
pub fn invert_innovation<N: RealField, D: Dim>(S: MatrixN<N, D>) -> EstimateResult<MatrixN<N, D>>
where
    DefaultAllocator: Allocator<N, D, D>,
{
    match S.try_inverse() {
        Some(SI) => Ok(SI),
        None => {
            log::warn!("innovation covariance is singular");
            Err(EstimateError::SingularMatrix("innovation covariance H.X.H' + R"))
        }
    }
}

/// Copies a fixed size vector to the dynamic boundary.
pub fn to_dvector<N, R, S>(v: &Matrix<N, R, U1, S>) -> DVector<N>
where
    N: RealField,
    R: Dim,
    S: Storage<N, R, U1>,
{
    DVector::from_vec(v.iter().cloned().collect())
}

/// Copies a fixed size matrix to the dynamic boundary.
pub fn to_dmatrix<N, R, C, S>(m: &Matrix<N, R, C, S>) -> DMatrix<N>
where
    N: RealField,
    R: Dim,
    C: Dim,
    S: Storage<N, R, C>,
{
    DMatrix::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)])
}

/// Forces exact symmetry, X = (X + X')/2, removing rounding asymmetry.
pub fn make_symmetric<N: RealField, D: Dim>(X: &mut MatrixN<N, D>)
where
    DefaultAllocator: Allocator<N, D, D>,
{
    let half: N = na::convert(0.5);
    let n = X.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let m = (X[(i, j)] + X[(j, i)]) * half;
            X[(i, j)] = m;
            X[(j, i)] = m;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, Matrix2, Vector3};

    #[test]
    fn timestep_must_be_positive() {
        assert_eq!(check_timestep(0.5), Ok(0.5));
        assert_eq!(check_timestep(0.0), Err(EstimateError::InvalidTimestep { dt: 0.0 }));
        assert!(check_timestep(-1.0).is_err());
        assert!(check_timestep(std::f64::NAN).is_err());
    }

    #[test]
    fn shape_mismatch_reports_both_shapes() {
        let z = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(check_shape("observation", &z, (3, 1)), Ok(()));
        assert_eq!(
            check_shape("observation", &z, (2, 1)),
            Err(EstimateError::DimensionMismatch { what: "observation", expected: (2, 1), actual: (3, 1) })
        );
        let r = DMatrix::<f64>::zeros(1, 2);
        assert!(check_shape("R", &r, (2, 2)).is_err());
    }

    #[test]
    fn singular_innovation() {
        assert!(invert_innovation(Matrix2::<f64>::zeros()).is_err());
        let SI = invert_innovation(Matrix2::new(2.0, 0.0, 0.0, 4.0)).unwrap();
        approx::assert_relative_eq!(SI, Matrix2::new(0.5, 0.0, 0.0, 0.25));
    }

    #[test]
    fn symmetric_after_make_symmetric() {
        let mut X = Matrix2::new(1.0, 0.2, 0.4, 1.0);
        make_symmetric(&mut X);
        assert_eq!(X[(0, 1)], X[(1, 0)]);
        approx::assert_relative_eq!(X[(0, 1)], 0.3);
    }
}

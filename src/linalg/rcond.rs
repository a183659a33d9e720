use nalgebra::{allocator::Allocator, DefaultAllocator, Dim, MatrixN, RealField};

/**
 * Reciprocal condition estimates for covariance matrices.
 *  Used to check that a covariance matrix is usable as an estimate uncertainty.
 */

/* Estimate the reciprocal condition number of a symmetric PSD matrix from its diagonal.
 *
 * The diagonal of a PSD matrix bounds its eigenvalues from the outside so min/max of the
 * diagonal is a cheap estimate, sufficient to reject negative or NaN covariances.
 *
 * Note:
 *  Defined to be 0 for an empty matrix
 *  Defined to be 0 for semi-definite (a zero diagonal element) and for max infinite
 *  Defined to be <0 for a negative diagonal element or any NaN element
 *  By definition rcond <= 1 as min<=max
 */
pub fn rcond_symmetric<N: RealField, D: Dim>(sm: &MatrixN<N, D>) -> N
where
    DefaultAllocator: Allocator<N, D, D>,
{
    let n = sm.nrows();
    if n == 0 {
        return N::zero();
    }
    let mut mind = sm[(0, 0)];
    let mut maxd = mind;

    for i in 0..n {
        let d = sm[(i, i)];
        if d != d {
            // NaN
            return N::one().neg();
        }
        if d < mind {
            mind = d;
        }
        if d > maxd {
            maxd = d;
        }
    }

    rcond_min_max(mind, maxd)
}

fn rcond_min_max<N: RealField>(mind: N, maxd: N) -> N {
    if mind < N::zero() {
        // matrix is negative, mind does not represent a rcond
        return mind;
    }
    let rcond = mind / maxd;
    if rcond != rcond {
        // NaN, (mind == maxd) == (zero or infinity)
        N::zero()
    } else {
        rcond
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix2, Matrix3};

    #[test]
    fn diagonal_ratio() {
        let m = Matrix2::new(4.0, 1.0, 1.0, 2.0);
        approx::assert_relative_eq!(rcond_symmetric(&m), 0.5);
    }

    #[test]
    fn zero_matrix_is_semi_definite() {
        assert_eq!(rcond_symmetric(&Matrix3::<f64>::zeros()), 0.0);
    }

    #[test]
    fn negative_and_nan_are_rejected() {
        assert!(rcond_symmetric(&Matrix2::new(1.0, 0.0, 0.0, -1.0)) < 0.0);
        assert!(rcond_symmetric(&Matrix2::new(1.0, 0.0, 0.0, f64::NAN)) < 0.0);
    }
}

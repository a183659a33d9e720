//! Test the correction ordering of the constant acceleration filter.
//!
//! A correction must use the gain computed at the end of the previous correction, not a gain derived
//! from the covariance immediately preceding it.

#![allow(non_snake_case)]

use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra::{Matrix2, Matrix2x6, Matrix6, Matrix6x2, Vector1, Vector2, Vector6};

use track_estimate::error::EstimateError;
use track_estimate::estimators::constant_accel::{initial_gain, ConstantAccelFilter, ConstantAccelModel};
use track_estimate::models::{KalmanState, StateSpaceModel};

const DT: f64 = 0.06;

fn start() -> KalmanState<f64, nalgebra::U6> {
    KalmanState {
        x: Vector6::new(1., 0., 0., -2., 0., 0.),
        X: Matrix6::identity() * 10.,
    }
}

fn H() -> Matrix2x6<f64> {
    ConstantAccelModel.Hx()
}

fn fresh_gain(X: &Matrix6<f64>, R: &Matrix2<f64>) -> Matrix6x2<f64> {
    let S = H() * X * H().transpose() + R;
    X * H().transpose() * S.try_inverse().unwrap()
}

#[test]
fn correction_uses_previous_gain() {
    let mut kf = ConstantAccelFilter::new(start()).unwrap();
    let K0 = *kf.kalman_gain();
    assert_eq!(K0, initial_gain());

    // Correction 1 uses the initial gain
    let R1 = Matrix2::identity() * 4.;
    let z1 = Vector2::new(2., -1.);
    kf.predict(DT, &Vector1::new(0.)).unwrap();
    let x_pred = kf.kalman_state().x;
    kf.update(&z1, &R1, DT).unwrap();
    assert_relative_eq!(kf.kalman_state().x, x_pred + K0 * (z1 - H() * x_pred), epsilon = 1e-12);
    let K1 = *kf.kalman_gain();
    assert_relative_eq!(K1, fresh_gain(&kf.kalman_state().X, &R1), epsilon = 1e-12);

    // Correction 2 uses the gain from correction 1, not one from its own R
    let R2 = Matrix2::identity() * 0.25;
    let z2 = Vector2::new(5., -5.);
    kf.predict(DT, &Vector1::new(0.)).unwrap();
    let x_pred = kf.kalman_state().x;
    let X_pred = kf.kalman_state().X;
    kf.update(&z2, &R2, DT).unwrap();

    let expect = x_pred + K1 * (z2 - H() * x_pred);
    assert_relative_eq!(kf.kalman_state().x, expect, epsilon = 1e-12);
    let not_expect = x_pred + fresh_gain(&X_pred, &R2) * (z2 - H() * x_pred);
    assert!((kf.kalman_state().x - not_expect).norm() > 0.1);
}

#[test]
fn prediction_adds_no_uncertainty() {
    let mut kf = ConstantAccelFilter::new(start()).unwrap();
    kf.update(&Vector2::new(0., 0.), &Matrix2::identity(), DT).unwrap();
    let X = kf.kalman_state().X;
    let K = *kf.kalman_gain();
    for _ in 0..10 {
        kf.predict(DT, &Vector1::new(1.)).unwrap();
    }
    assert_eq!(kf.kalman_state().X, X);
    assert_eq!(*kf.kalman_gain(), K);
}

#[test]
fn moving_estimate_follows_kinematics() {
    let state = KalmanState {
        x: Vector6::new(0., 1., 0.5, 0., -1., 0.),
        X: Matrix6::identity(),
    };
    let mut kf = ConstantAccelFilter::new(state).unwrap();
    let position = kf.predict(2., &Vector1::new(0.)).unwrap();
    assert_relative_eq!(position, Vector2::new(2. + 1., -2.));
    assert_relative_eq!(kf.kalman_state().x[1], 2.);
}

#[test]
fn stationary_target_is_acquired() {
    let R = Matrix2::identity();
    let state = KalmanState { x: Vector6::zeros(), X: Matrix6::identity() * 100. };
    let mut kf = ConstantAccelFilter::with_first_gain(state, &R).unwrap();
    let target = Vector2::new(5., -3.);
    let mut position = Vector2::zeros();
    for _ in 0..20 {
        kf.predict(DT, &Vector1::new(0.)).unwrap();
        position = kf.update(&target, &R, DT).unwrap();
    }
    assert_abs_diff_eq!(position, target, epsilon = 0.05);
    let X = kf.kalman_state().X;
    assert!(X[(0, 0)] < 1. && X[(3, 3)] < 1.);
}

#[test]
fn negative_observation_noise_rejected() {
    let R = Matrix2::identity() * -5.;
    let rejected = EstimateError::InvalidCovariance("R not PSD");
    assert!(matches!(ConstantAccelFilter::with_first_gain(start(), &R), Err(e) if e == rejected));

    let mut kf = ConstantAccelFilter::new(start()).unwrap();
    let (x, X, K) = (kf.kalman_state().x, kf.kalman_state().X, *kf.kalman_gain());
    assert_eq!(kf.update(&Vector2::new(3., 4.), &R, DT), Err(rejected));
    let mut nan = Matrix2::identity();
    nan[(1, 1)] = std::f64::NAN;
    assert_eq!(kf.update(&Vector2::new(3., 4.), &nan, DT), Err(rejected));
    assert_eq!(kf.kalman_state().x, x);
    assert_eq!(kf.kalman_state().X, X);
    assert_eq!(*kf.kalman_gain(), K);
}

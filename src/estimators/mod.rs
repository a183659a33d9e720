//! The Kalman filter variants.

pub mod constant_accel;
pub mod scalar;

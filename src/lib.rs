//! Track+Estimate, recursive state estimation of noisy tracks.
//!
//! A linear Kalman filter recursively estimates a system's state from a sequence of noisy observations.
//! Each cycle a prediction advances the estimate with a model of the system's motion, then a correction
//! blends in the new observation weighted by the relative uncertainty of the prediction and the observation.
//!
//! Two state space models are provided. A scalar model where the transition, control and observation are
//! plain numbers, and a two dimensional constant acceleration model observed in position.
//! A debounced hysteresis controller acts on the filtered (or raw) readings to close a control loop.
//!
//! Models are defined as traits. State representations are structs.
//! Estimators implement the per cycle operations for their model and report failures as [`error::EstimateError`].
//!
//! # Licensing
//!
//! Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction,
//! including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software,
//! and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
//!
//! The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
//!
//! THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//! FITNESS FOR A PARTICULAR PURPOSE AND NON INFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY,
//! WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

pub mod control;
pub mod error;
pub mod estimators;
pub mod linalg;
pub mod models;
pub mod trail;

#[cfg(feature = "std")]
pub mod cycle;
#[cfg(feature = "std")]
pub mod process;

//! Fading trails.
//!
//! Colours for drawing a history of points so that older points fade into the background.

use crate::error::{EstimateError, EstimateResult};

/// An RGB colour.
pub type Rgb = [u8; 3];

/// Colour each point of a trail, newest first.
///
/// `points` is ordered oldest to newest. Walking from the newest point, every point moves the colour
/// `1/fade_len` of the way from its predecessor's colour toward `background`, truncating each channel.
/// A trail of `fade_len` points therefore fades by roughly a factor of e.
pub fn fade_gradient(
    points: &[(f64, f64)],
    base: Rgb,
    background: Rgb,
    fade_len: usize,
) -> EstimateResult<Vec<((f64, f64), Rgb)>> {
    if fade_len == 0 {
        return Err(EstimateError::Configuration("fade length must be > 0"));
    }
    let factor = 1.0 / fade_len as f64;
    let mut colour = base;

    Ok(points
        .iter()
        .rev()
        .map(|&point| {
            for (c, &b) in colour.iter_mut().zip(background.iter()) {
                *c = (f64::from(*c) * (1.0 - factor) + f64::from(b) * factor) as u8;
            }
            (point, colour)
        })
        .collect())
}

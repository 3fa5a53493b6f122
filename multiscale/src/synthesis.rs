//! Band-limited spectral synthesis of a single refinement level.
//!
//! ## Recipe
//!
//! A level is realized by shaping complex white noise in Fourier space:
//!
//!   1. Draw one standard-normal amplitude per spectral slot.
//!   2. Scale each by `sqrt(P(f) · n)`, where `P` is the injected power
//!      spectrum and `f` the slot's frequency.
//!   3. Give every slot an independent uniform phase in `[0, 2π)`.
//!   4. Apply the band mask for the level (see [`band_weights`]).
//!   5. Inverse-transform and keep the real part, with 1/n normalization.
//!
//! ## Slot layout
//!
//! Frequencies follow the packed real-FFT layout
//! `[0, 1, 1, 2, 2, …, n/2] / (n·d)`: slot 0 is the DC term and each
//! subsequent frequency occupies two slots. Band boundaries are expressed
//! in slot indices, so "the upper half of the slots" is the upper half of
//! the frequency range `[0, f_nyq]` and "the lowest quarter of the slots"
//! the lowest quarter of it.
//!
//! ## Band limiting
//!
//! Slots above the midpoint carry structure that the next refinement level
//! re-represents at double resolution, so they are zeroed on every level
//! but the finest. Slots below the quarter point duplicate the band the
//! parent level already realized, so they are zeroed on every level but
//! the coarsest. A depth-0 hierarchy is both, and masks nothing.

use num_complex::Complex;
use rand::Rng;
use rand_distr::StandardNormal;
use rustfft::FftPlanner;
use std::f64::consts::TAU;

use crate::spectrum::PowerSpectrum;

type Cx = Complex<f64>;

/// Real-FFT frequency bins for a length-`n` signal with sample spacing `d`,
/// packed layout: `freq[j] = floor((j + 1) / 2) / (n·d)`.
pub fn rfft_freq(n: usize, d: f64) -> Vec<f64> {
    let denom = n as f64 * d;
    (0..n).map(|j| ((j + 1) / 2) as f64 / denom).collect()
}

/// Band-pass weights for `level` within a hierarchy `n_refine` deep.
///
/// Returns one weight per spectral slot: 1.0 where the level may draw
/// power, 0.0 where the band belongs to an adjacent level.
pub fn band_weights(n: usize, level: usize, n_refine: usize) -> Vec<f64> {
    let mut w = vec![1.0f64; n];
    if level < n_refine {
        // upper half re-appears at double resolution one level down
        for wj in &mut w[n / 2..] {
            *wj = 0.0;
        }
    }
    if level > 0 {
        // lowest quarter was already realized by the parent
        for wj in &mut w[..n / 4] {
            *wj = 0.0;
        }
    }
    w
}

/// One band-limited realization at `level`, before any parent conditioning.
///
/// `n` is the sample count; grid spacing is `0.5^level / n`, so deeper
/// levels sample the same unit interval's left half at double resolution.
/// Weights that come back non-finite or negative from the spectrum are
/// treated as zero.
pub fn base_field<S: PowerSpectrum>(
    spectrum: &S,
    n: usize,
    level: usize,
    n_refine: usize,
    planner: &mut FftPlanner<f64>,
    rng: &mut impl Rng,
) -> Vec<f64> {
    let delta = 0.5f64.powi(level as i32) / n as f64;
    let freqs = rfft_freq(n, delta);
    let mask  = band_weights(n, level, n_refine);

    let amps: Vec<f64> = (0..n)
        .map(|_| rng.sample::<f64, _>(StandardNormal))
        .collect();
    let phases: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..TAU)).collect();

    let mut modes: Vec<Cx> = (0..n)
        .map(|j| {
            let w = spectrum.weight(freqs[j]);
            let w = if w.is_finite() && w > 0.0 { w } else { 0.0 };
            Cx::from_polar(amps[j] * (w * n as f64).sqrt(), phases[j]) * mask[j]
        })
        .collect();

    let inv = planner.plan_fft_inverse(n);
    inv.process(&mut modes);

    let norm = 1.0 / n as f64;
    modes.iter().map(|c| c.re * norm).collect()
}

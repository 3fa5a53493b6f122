//! The refinement hierarchy generator.
//!
//! ## Structure
//!
//! A hierarchy holds `n_refine + 1` levels of the same sample count `size`.
//! Level 0 is the coarsest; each deeper level represents the left half of
//! its parent's extent at double resolution (grid spacing `0.5^L / size`).
//!
//! ## Conditioning
//!
//! Every level below the root is the sum of two terms: a fresh band-limited
//! field carrying the scales the parent cannot represent (see
//! [`crate::synthesis`]), and the parent's own field upsampled to double
//! resolution by a fixed 1/3–2/3 blend of neighbouring samples
//! ([`expand_parent`]). The blend coefficients encode a quadratic-spline
//! style interpolation over the parent's left half.
//!
//! Levels are built by an explicit fold from coarse to fine; each step
//! consumes the previous level's output, so the dependency between levels
//! is a plain loop rather than recursion.

use rand::Rng;
use rustfft::FftPlanner;

use crate::error::ConfigError;
use crate::spectrum::PowerSpectrum;
use crate::synthesis::base_field;

/// Hierarchical 1-D Gaussian random field generator.
///
/// Configuration (spectrum strategy, refinement depth, base size) is fixed
/// at construction; every call to [`realize`](Self::realize) draws a fresh,
/// independent sample of the whole hierarchy from the supplied RNG.
#[derive(Debug, Clone)]
pub struct MultiscaleGaussian<S> {
    spectrum: S,
    n_refine: usize,
    size: usize,
}

/// Upsample a parent-level field to double resolution over half its extent.
///
/// Reads the leading `n/2 + 2` parent samples and produces `n` outputs:
///
/// ```text
/// out[2k]   = (2/3)·parent[k+1] + (1/3)·parent[k]
/// out[2k+1] = (2/3)·parent[k+1] + (1/3)·parent[k+2]
/// ```
///
/// for `k in 0..n/2`. Requires an even length of at least 4.
pub fn expand_parent(parent: &[f64]) -> Vec<f64> {
    let n = parent.len();
    assert!(n >= 4 && n % 2 == 0, "parent length {n} must be even and >= 4");
    let half = n / 2;
    let head = &parent[..half + 2];

    let mut out = vec![0.0f64; n];
    for k in 0..half {
        out[2 * k]     = 2.0 * head[k + 1] / 3.0 + head[k] / 3.0;
        out[2 * k + 1] = 2.0 * head[k + 1] / 3.0 + head[k + 2] / 3.0;
    }
    out
}

impl<S: PowerSpectrum> MultiscaleGaussian<S> {
    /// Configure a hierarchy.
    ///
    /// `size` must be even and at least 4: the band masks split the
    /// spectrum at `size/2` and `size/4`, and [`expand_parent`] reads
    /// `size/2 + 2` parent samples.
    pub fn new(spectrum: S, n_refine: usize, size: usize) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if size % 2 != 0 {
            return Err(ConfigError::OddSize(size));
        }
        if size < 4 {
            return Err(ConfigError::SizeTooSmall(size));
        }
        Ok(Self { spectrum, n_refine, size })
    }

    /// Samples per level.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Refinement depth (levels below the root).
    pub fn n_refine(&self) -> usize {
        self.n_refine
    }

    /// Total level count, `n_refine + 1`.
    pub fn levels(&self) -> usize {
        self.n_refine + 1
    }

    /// Realize the full hierarchy: `n_refine + 1` fields, coarsest first.
    pub fn realize(&self, rng: &mut impl Rng) -> Vec<Vec<f64>> {
        self.realize_from(0, None, rng)
    }

    /// Realize levels `level..=n_refine`, conditioned on `parent` when one
    /// is given. The root call is `realize_from(0, None, rng)`.
    ///
    /// Panics if `level` exceeds the refinement depth or a supplied parent
    /// has the wrong length.
    pub fn realize_from(
        &self,
        level: usize,
        parent: Option<&[f64]>,
        rng: &mut impl Rng,
    ) -> Vec<Vec<f64>> {
        let mut planner = FftPlanner::new();
        self.realize_with(&mut planner, level, parent, rng)
    }

    /// Shared worker so the Monte-Carlo estimators can reuse one planner
    /// across trials.
    pub(crate) fn realize_with(
        &self,
        planner: &mut FftPlanner<f64>,
        level: usize,
        parent: Option<&[f64]>,
        rng: &mut impl Rng,
    ) -> Vec<Vec<f64>> {
        assert!(
            level <= self.n_refine,
            "level {level} exceeds refinement depth {}",
            self.n_refine
        );
        if let Some(p) = parent {
            assert_eq!(p.len(), self.size, "parent length must equal the field size");
        }

        let mut fields: Vec<Vec<f64>> = Vec::with_capacity(self.n_refine - level + 1);
        let mut coarse: Option<Vec<f64>> = parent.map(<[f64]>::to_vec);

        for lv in level..=self.n_refine {
            let mut field =
                base_field(&self.spectrum, self.size, lv, self.n_refine, planner, rng);
            if let Some(p) = &coarse {
                for (f, u) in field.iter_mut().zip(expand_parent(p)) {
                    *f += u;
                }
            }
            coarse = Some(field.clone());
            fields.push(field);
        }
        fields
    }

    /// Physical coordinates per level: level `i` holds `k / 2^i` for
    /// `k in 0..size`, consistent with each level's grid spacing.
    pub fn coordinates(&self) -> Vec<Vec<f64>> {
        (0..=self.n_refine)
            .map(|i| {
                let scale = 2.0f64.powi(i as i32);
                (0..self.size).map(|k| k as f64 / scale).collect()
            })
            .collect()
    }
}

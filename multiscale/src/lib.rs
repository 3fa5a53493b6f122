//! Multiscale Gaussian random field generation via band-limited Fourier
//! filtering.
//!
//! A hierarchy of 1-D Gaussian random field realizations is built at
//! increasing refinement levels: each level covers half the physical extent
//! of its parent at double resolution, draws fresh power from a band of the
//! spectrum the parent does not represent, and inherits the parent's
//! large-scale structure through a fixed 1/3–2/3 upsampling blend.
//! Monte-Carlo estimators accumulate outer products of realizations into
//! single-level and all-level (cross-)covariance matrices.
//!
//! # Modules
//!
//! - [`spectrum`]   — pluggable power-spectrum strategies
//! - [`synthesis`]  — band-limited spectral synthesis of one level
//! - [`hierarchy`]  — the refinement hierarchy generator
//! - [`covariance`] — Monte-Carlo (cross-)covariance estimators
//! - [`error`]      — configuration errors
//!
//! # Running tests
//!
//! ```bash
//! cargo test -- --nocapture
//! ```
//!
//! The covariance report binary lives in `examples/hierarchy_report.rs`:
//!
//! ```bash
//! cargo run --example hierarchy_report --release
//! ```

pub mod covariance;
pub mod error;
pub mod hierarchy;
pub mod spectrum;
pub mod synthesis;

pub use covariance::CovMatrix;
pub use error::ConfigError;
pub use hierarchy::MultiscaleGaussian;
pub use spectrum::{ConstantSpectrum, FnSpectrum, PowerLawSpectrum, PowerSpectrum};

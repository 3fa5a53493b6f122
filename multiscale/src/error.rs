//! Configuration errors.
//!
//! The generator has no runtime failure modes: once a hierarchy is
//! constructed, every operation is a deterministic function of the RNG
//! stream. The only thing that can go wrong is the configuration itself,
//! rejected here at construction time.

use thiserror::Error;

/// Invalid hierarchy configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `size` must be positive.
    #[error("field size must be positive")]
    ZeroSize,

    /// The half/quarter band splits and the two-for-one parent upsampling
    /// are only defined for even sample counts.
    #[error("field size must be even, got {0}")]
    OddSize(usize),

    /// Parent upsampling reads `size/2 + 2` parent samples, which requires
    /// `size >= 4`.
    #[error("field size must be at least 4, got {0}")]
    SizeTooSmall(usize),
}

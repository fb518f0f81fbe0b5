//! Error types for the watermarking codec.

use thiserror::Error;

/// Failures from [`crate::key::derive`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// `secret_key` did not hex-decode to exactly 32 bytes.
    #[error("secret key must be 32 bytes after hex decoding")]
    BadKey,
    /// `message` was zero length.
    #[error("watermark message must not be empty")]
    Empty,
}

/// Failures from kernel construction/validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// `numerators.len()` did not equal `side * side`.
    #[error("kernel numerators length {actual} does not match side*side {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    /// Side length is even; kernels must be odd-sized squares.
    #[error("kernel side {0} must be odd")]
    EvenSide(usize),
    /// Center coefficient is non-zero.
    #[error("kernel center coefficient must be 0")]
    NonZeroCenter,
    /// Coefficients do not sum to 1 (numerator != denominator).
    #[error("kernel coefficients must sum to 1, got {numerator}/{denominator}")]
    DoesNotSumToOne { numerator: i64, denominator: i64 },
    /// Denominator was zero or negative.
    #[error("kernel denominator must be positive, got {0}")]
    NonPositiveDenominator(i64),
}

/// Failures shared by [`crate::embed::embed`] and [`crate::extract::extract`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// No valid candidate center exists for this image/kernel/stride combination.
    #[error("image {height}x{width} has no valid candidate center for kernel radius {radius} and stride {stride}")]
    DimensionTooSmall {
        height: usize,
        width: usize,
        radius: usize,
        stride: usize,
    },
    /// The kernel failed validation.
    #[error("invalid kernel: {0}")]
    KernelInvalid(#[from] KernelError),
    /// `stride` is smaller than the kernel side, violating the non-interference invariant.
    #[error("stride {stride} must be >= kernel side {kernel_side}")]
    StrideTooSmall { stride: usize, kernel_side: usize },
    /// A pixel value exceeds `2^bit_depth - 1`.
    #[error("pixel value {value} exceeds maximum {max} for the declared bit depth")]
    BitDepthMismatch { value: u32, max: u32 },
    /// Declared bit depth is not 8 or 16.
    #[error("bit depth must be 8 or 16, got {0}")]
    InvalidBitDepth(u8),
    /// Extraction produced a pixel value that would underflow below zero.
    #[error("reconstructed pixel at candidate {candidate} would be negative")]
    ReconstructionUnderflow { candidate: usize },
}

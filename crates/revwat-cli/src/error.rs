//! Batch-driver and CLI error types.

use thiserror::Error;

/// Failures surfaced from configuration validation or batch driving.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("configuration invalid: {0}")]
    ConfigInvalid(String),
    #[error("ledger error: {0}")]
    Ledger(#[from] revwat_ledger::LedgerError),
    #[error("no images in batch succeeded")]
    BatchEmpty,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-image failure kinds recorded in a [`crate::batch::BatchReport`],
/// mirroring the policy table that decides which errors are fatal for the
/// whole batch versus recorded and skipped for one image.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("I/O error reading or writing {filename}: {message}")]
    Io { filename: String, message: String },
    #[error("{filename}: image smaller than the kernel's support")]
    DimensionTooSmall { filename: String },
    #[error("{filename}: pixel value exceeds the declared bit depth")]
    BitDepthMismatch { filename: String },
    #[error("{filename}: no ledger record matches this image's watermarked hash")]
    NoMatch { filename: String },
    #[error("{filename}: codec error: {message}")]
    Codec { filename: String, message: String },
}

impl ImageError {
    #[must_use]
    pub fn filename(&self) -> &str {
        match self {
            ImageError::Io { filename, .. }
            | ImageError::DimensionTooSmall { filename }
            | ImageError::BitDepthMismatch { filename }
            | ImageError::NoMatch { filename }
            | ImageError::Codec { filename, .. } => filename,
        }
    }
}

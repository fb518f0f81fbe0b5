//! Request/response configuration records for the three batch operations.
//!
//! Unknown fields are rejected (`deny_unknown_fields`): a typo in a config
//! file should fail loudly rather than silently take a default.

use revwat_core::Kernel;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use crate::error::DriverError;

fn default_stride() -> usize {
    3
}

fn default_t_hi() -> i64 {
    0
}

fn default_bit_depth() -> u8 {
    8
}

/// A kernel as it appears in a config file: a flat row-major list of
/// `(numerator)` integers sharing one `denominator`. Deserializing goes
/// through [`Kernel::new`] so a malformed kernel (even side, nonzero
/// center, wrong sum) is rejected at config-load time rather than at the
/// first `predict` call.
#[derive(Debug, Deserialize)]
struct RawKernel {
    side: usize,
    denominator: i64,
    numerators: Vec<i64>,
}

fn deserialize_kernel<'de, D>(deserializer: D) -> Result<Option<Kernel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawKernel>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(raw) => Kernel::new(raw.side, raw.denominator, raw.numerators).map(Some).map_err(D::Error::custom),
    }
}

/// Configuration for an embed batch.
///
/// The external interface table in use here omits `secret_key` from the
/// remove/extract requests, but both operations must regenerate the exact
/// mask-bit stream the embed used, which is only possible with the key —
/// so `secret_key` is required on [`RemoveRequest`] and [`ExtractRequest`]
/// too, not just `EmbedRequest`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbedRequest {
    pub data_path: PathBuf,
    pub save_path: PathBuf,
    pub message: String,
    #[serde(default)]
    pub secret_key: Option<String>,
    pub blockchain_path: PathBuf,
    #[serde(default, deserialize_with = "deserialize_kernel")]
    pub kernel: Option<Kernel>,
    #[serde(default = "default_stride")]
    pub stride: usize,
    #[serde(default = "default_t_hi")]
    pub t_hi: i64,
    #[serde(default = "default_bit_depth")]
    pub bit_depth: u8,
    pub data_type: String,
}

impl EmbedRequest {
    pub fn kernel_or_default(&self) -> Kernel {
        self.kernel.clone().unwrap_or_else(Kernel::default_four_neighbour)
    }

    pub fn validate(&self) -> Result<(), DriverError> {
        validate_shared(self.stride, &self.kernel_or_default(), self.bit_depth)
    }
}

/// Configuration for an exact-removal batch: looks up each image's
/// watermarked hash in the ledger and reverses the matched operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveRequest {
    pub data_path: PathBuf,
    pub save_path: PathBuf,
    pub secret_key: String,
    pub blockchain_path: PathBuf,
    pub data_type: String,
}

/// Configuration for a forensic-extraction batch: runs extraction with an
/// empty overflow map and reports the ledger record with the lowest BER,
/// without requiring an exact hash match.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractRequest {
    pub data_path: PathBuf,
    pub ext_wat_path: PathBuf,
    pub secret_key: String,
    pub blockchain_path: PathBuf,
    #[serde(default, deserialize_with = "deserialize_kernel")]
    pub kernel: Option<Kernel>,
    #[serde(default = "default_stride")]
    pub stride: usize,
    #[serde(default = "default_t_hi")]
    pub t_hi: i64,
    pub data_type: String,
}

impl ExtractRequest {
    pub fn kernel_or_default(&self) -> Kernel {
        self.kernel.clone().unwrap_or_else(Kernel::default_four_neighbour)
    }

    pub fn validate(&self) -> Result<(), DriverError> {
        if self.stride < self.kernel_or_default().side() {
            return Err(DriverError::ConfigInvalid(format!(
                "stride {} is smaller than kernel side {}",
                self.stride,
                self.kernel_or_default().side()
            )));
        }
        Ok(())
    }
}

fn validate_shared(stride: usize, kernel: &Kernel, bit_depth: u8) -> Result<(), DriverError> {
    if stride < kernel.side() {
        return Err(DriverError::ConfigInvalid(format!(
            "stride {} is smaller than kernel side {}",
            stride,
            kernel.side()
        )));
    }
    if bit_depth != 8 && bit_depth != 16 {
        return Err(DriverError::ConfigInvalid(format!("bit_depth must be 8 or 16, got {bit_depth}")));
    }
    Ok(())
}

/// One image's outcome within a batch, embedded into [`BatchResponse`].
#[derive(Debug, Clone, Serialize)]
pub struct FailedImage {
    pub filename: String,
    pub error: String,
}

/// Aggregate result of a batch operation.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub total_images: usize,
    pub processed_images: usize,
    pub failed_images: Vec<FailedImage>,
    pub per_image_records: Vec<serde_json::Value>,
    pub block_number: Option<u64>,
    /// Only set for an embed batch that was not given a `secret_key`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_secret_key: Option<String>,
}

//! Iterates a directory of images, runs the codec per image, and appends a
//! single ledger block per batch.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rand::RngCore;
use revwat_core::io::pgm::{PgmReader, PgmWriter};
use revwat_core::io::{PixelSource, PixelSink};
use revwat_core::key::MaskStream;
use revwat_core::{canonical_hash, derive, embed, extract, key::MASK_ALGORITHM, Image};
use revwat_ledger::{EmbedRecord, Info, Ledger, RemoveRecord, Transaction};

use crate::config::{BatchResponse, EmbedRequest, ExtractRequest, FailedImage, RemoveRequest};
use crate::error::{DriverError, ImageError};

/// Drives batch embed/remove/extract runs against a directory of images
/// and a single ledger file.
#[derive(Default)]
pub struct BatchDriver;

impl BatchDriver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub fn run_embed_batch(&self, request: &EmbedRequest) -> Result<BatchResponse, DriverError> {
        request.validate()?;
        let files = list_matching_files(&request.data_path, &request.data_type)?;
        if files.is_empty() {
            return Err(DriverError::ConfigInvalid(format!(
                "no files with extension '{}' found in {}",
                request.data_type,
                request.data_path.display()
            )));
        }
        std::fs::create_dir_all(&request.save_path)?;

        let secret_key = match &request.secret_key {
            Some(key) => key.clone(),
            None => generate_secret_key_hex(),
        };
        let kernel = request.kernel_or_default();

        let mut records = BTreeMap::new();
        let mut per_image_records = Vec::new();
        let mut failed_images = Vec::new();

        for path in &files {
            match embed_one(path, &request.save_path, &kernel, request.stride, request.t_hi, &request.message, &secret_key) {
                Ok((hash_wat, record)) => {
                    per_image_records.push(serde_json::to_value(&record).expect("EmbedRecord always serializes"));
                    records.insert(hash_wat, record);
                }
                Err(err) => failed_images.push(FailedImage { filename: err.filename().to_string(), error: err.to_string() }),
            }
        }

        if records.is_empty() {
            return Err(DriverError::BatchEmpty);
        }
        let mut ledger = Ledger::load(&request.blockchain_path)?;
        let block_number = ledger.append(&request.blockchain_path, Info::Embedder, Transaction::Embed(records))?;

        Ok(BatchResponse {
            total_images: files.len(),
            processed_images: per_image_records.len(),
            failed_images,
            per_image_records,
            block_number: Some(block_number),
            generated_secret_key: request.secret_key.is_none().then_some(secret_key),
        })
    }

    pub fn run_remove_batch(&self, request: &RemoveRequest) -> Result<BatchResponse, DriverError> {
        let files = list_matching_files(&request.data_path, &request.data_type)?;
        if files.is_empty() {
            return Err(DriverError::ConfigInvalid(format!(
                "no files with extension '{}' found in {}",
                request.data_type,
                request.data_path.display()
            )));
        }
        std::fs::create_dir_all(&request.save_path)?;
        let ledger = Ledger::load(&request.blockchain_path)?;

        let mut records = BTreeMap::new();
        let mut per_image_records = Vec::new();
        let mut failed_images = Vec::new();

        for path in &files {
            match remove_one(path, &request.save_path, &request.secret_key, &ledger) {
                Ok((hash_wat, record)) => {
                    per_image_records.push(serde_json::to_value(&record).expect("RemoveRecord always serializes"));
                    records.insert(hash_wat, record);
                }
                Err(err) => failed_images.push(FailedImage { filename: err.filename().to_string(), error: err.to_string() }),
            }
        }

        if records.is_empty() {
            return Err(DriverError::BatchEmpty);
        }
        let mut ledger = ledger;
        let block_number = ledger.append(&request.blockchain_path, Info::Remover, Transaction::Remove(records))?;

        Ok(BatchResponse {
            total_images: files.len(),
            processed_images: per_image_records.len(),
            failed_images,
            per_image_records,
            block_number: Some(block_number),
            generated_secret_key: None,
        })
    }

    /// Forensic extraction: no ledger mutation, only a best-match report
    /// per image written alongside the best-effort recovered pixels.
    pub fn run_extract_batch(&self, request: &ExtractRequest) -> Result<BatchResponse, DriverError> {
        request.validate()?;
        let files = list_matching_files(&request.data_path, &request.data_type)?;
        if files.is_empty() {
            return Err(DriverError::ConfigInvalid(format!(
                "no files with extension '{}' found in {}",
                request.data_type,
                request.data_path.display()
            )));
        }
        std::fs::create_dir_all(&request.ext_wat_path)?;
        let ledger = Ledger::load(&request.blockchain_path)?;
        let kernel = request.kernel_or_default();

        let mut per_image_records = Vec::new();
        let mut failed_images = Vec::new();

        for path in &files {
            match extract_one(path, &request.ext_wat_path, &kernel, request.stride, request.t_hi, &request.secret_key, &ledger) {
                Ok(record) => per_image_records.push(record),
                Err(err) => failed_images.push(FailedImage { filename: err.filename().to_string(), error: err.to_string() }),
            }
        }

        Ok(BatchResponse {
            total_images: files.len(),
            processed_images: per_image_records.len(),
            failed_images,
            per_image_records,
            block_number: None,
            generated_secret_key: None,
        })
    }
}

fn list_matching_files(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let wanted = extension.trim_start_matches('.').to_ascii_lowercase();
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path.extension().and_then(|ext| ext.to_str()).map(|ext| ext.to_ascii_lowercase()) == Some(wanted.clone())
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Regenerates the mask-bit stream from the secret key alone, for remove
/// and forensic-extract operations that have no watermark message to pair
/// it with.
fn mask_stream_from_hex(secret_key_hex: &str) -> Result<MaskStream, String> {
    let key_bytes = hex::decode(secret_key_hex).map_err(|_| "secret_key is not valid hex".to_string())?;
    if key_bytes.len() != 32 {
        return Err("secret_key must decode to 32 bytes".to_string());
    }
    Ok(MaskStream::from_secret_key(&key_bytes))
}

fn generate_secret_key_hex() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn filename_of(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| path.display().to_string())
}

fn read_image(path: &Path) -> Result<Image, ImageError> {
    let filename = filename_of(path);
    PgmReader::new(path).read().map_err(|e| ImageError::Io { filename, message: e.to_string() })
}

fn write_image(dir: &Path, filename: &str, image: &Image) -> Result<(), ImageError> {
    let out_path = dir.join(filename);
    PgmWriter::new(&out_path).write(image).map_err(|e| ImageError::Io { filename: filename.to_string(), message: e.to_string() })
}

#[allow(clippy::too_many_arguments)]
fn embed_one(
    path: &Path,
    save_path: &Path,
    kernel: &revwat_core::Kernel,
    stride: usize,
    t_hi: i64,
    message: &str,
    secret_key: &str,
) -> Result<(String, EmbedRecord), ImageError> {
    let filename = filename_of(path);
    let image = read_image(path)?;
    let hash_image_orig = canonical_hash(&image);

    let (key, mask) = derive(message.as_bytes(), secret_key)
        .map_err(|e| ImageError::Codec { filename: filename.clone(), message: e.to_string() })?;
    let outcome = embed(&image, kernel, stride, &key, mask, t_hi)
        .map_err(|e| codec_error_to_image_error(&filename, e))?;

    write_image(save_path, &filename, &outcome.image)?;
    let hash_image_wat = canonical_hash(&outcome.image);

    let record = EmbedRecord {
        bit_depth: image.bit_depth().bits(),
        filename,
        hash_image_orig,
        hash_image_wat: hash_image_wat.clone(),
        kernel: kernel.clone(),
        mask_algorithm: MASK_ALGORITHM.to_string(),
        overflow_map: outcome.overflow_map,
        stride,
        t_hi,
        watermark: (0..256).map(|i| key.bit(i)).collect(),
    };
    Ok((hash_image_wat, record))
}

fn remove_one(path: &Path, save_path: &Path, secret_key: &str, ledger: &Ledger) -> Result<(String, RemoveRecord), ImageError> {
    let filename = filename_of(path);
    let image = read_image(path)?;
    let hash_image_wat = canonical_hash(&image);

    let matched = ledger
        .find_by_watermarked_hash(&hash_image_wat)
        .ok_or_else(|| ImageError::NoMatch { filename: filename.clone() })?;

    let mask = mask_stream_from_hex(secret_key).map_err(|e| ImageError::Codec { filename: filename.clone(), message: e })?;
    let outcome = extract(&image, &matched.kernel, matched.stride, mask, matched.t_hi, &matched.overflow_map)
        .map_err(|e| codec_error_to_image_error(&filename, e))?;

    write_image(save_path, &filename, &outcome.image)?;
    let recovered_image_hash = canonical_hash(&outcome.image);

    Ok((hash_image_wat.clone(), RemoveRecord { filename, recovered_image_hash, watermarked_image_hash: hash_image_wat }))
}

fn extract_one(
    path: &Path,
    ext_wat_path: &Path,
    kernel: &revwat_core::Kernel,
    stride: usize,
    t_hi: i64,
    secret_key: &str,
    ledger: &Ledger,
) -> Result<serde_json::Value, ImageError> {
    let filename = filename_of(path);
    let image = read_image(path)?;

    let mask = mask_stream_from_hex(secret_key).map_err(|e| ImageError::Codec { filename: filename.clone(), message: e })?;
    let outcome = extract(&image, kernel, stride, mask, t_hi, &[]).map_err(|e| codec_error_to_image_error(&filename, e))?;

    write_image(ext_wat_path, &filename, &outcome.image)?;

    let best_match = ledger.find_best_match_by_bits(&outcome.extracted_bits);
    let record = match best_match {
        Some((record, ber)) => serde_json::json!({
            "filename": filename,
            "extracted_bit_count": outcome.extracted_bits.len(),
            "best_match_hash_image_wat": record.hash_image_wat,
            "bit_error_rate": ber,
        }),
        None => serde_json::json!({
            "filename": filename,
            "extracted_bit_count": outcome.extracted_bits.len(),
            "best_match_hash_image_wat": serde_json::Value::Null,
            "bit_error_rate": serde_json::Value::Null,
        }),
    };
    Ok(record)
}

fn codec_error_to_image_error(filename: &str, error: revwat_core::error::CodecError) -> ImageError {
    use revwat_core::error::CodecError;
    match error {
        CodecError::DimensionTooSmall { .. } => ImageError::DimensionTooSmall { filename: filename.to_string() },
        CodecError::BitDepthMismatch { .. } => ImageError::BitDepthMismatch { filename: filename.to_string() },
        other => ImageError::Codec { filename: filename.to_string(), message: other.to_string() },
    }
}


//! Recovering watermark bits and original pixels from a watermarked image.

use crate::candidate::enumerate_candidates;
use crate::embed::is_carrier;
use crate::error::CodecError;
use crate::image::Image;
use crate::kernel::Kernel;
use crate::key::MaskStream;
use crate::predictor::predict;

/// Counters mirroring [`crate::embed::EmbedStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractStats {
    pub candidates: usize,
    pub marked: usize,
    pub extracted_bits: usize,
    pub skipped_as_overflow: usize,
    pub skipped_for_low_error: usize,
}

/// The recovered image, the bits pulled off carrier candidates, and
/// extraction statistics.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub image: Image,
    pub extracted_bits: Vec<bool>,
    pub stats: ExtractStats,
}

/// Recovers pixels and watermark bits from `marked`.
///
/// `overflow_map` is the ordered list of candidate indices the embedder
/// clamped; pass an empty slice for forensic extraction (no ledger match
/// yet known). A mask bit is drawn for *every* candidate, in the same order
/// the embedder drew them, including overflowed ones — this keeps the mask
/// stream synchronized across the whole candidate sequence, matching the
/// invariant that exactly one mask bit is consumed per candidate.
pub fn extract(
    marked: &Image,
    kernel: &Kernel,
    stride: usize,
    mut mask: MaskStream,
    t_hi: i64,
    overflow_map: &[usize],
) -> Result<ExtractOutcome, CodecError> {
    let radius = kernel.radius();
    if stride < kernel.side() {
        return Err(CodecError::StrideTooSmall { stride, kernel_side: kernel.side() });
    }

    let candidates = enumerate_candidates(marked.height(), marked.width(), radius, stride);
    if candidates.is_empty() {
        return Err(CodecError::DimensionTooSmall {
            height: marked.height(),
            width: marked.width(),
            radius,
            stride,
        });
    }

    let mut output = marked.clone();
    let mut extracted_bits = Vec::new();
    let mut stats = ExtractStats { candidates: candidates.len(), ..ExtractStats::default() };

    for (idx, candidate) in candidates.iter().enumerate() {
        let marked_bit = mask.next().expect("mask stream is infinite");
        if !marked_bit {
            continue;
        }
        stats.marked += 1;

        if overflow_map.contains(&idx) {
            stats.skipped_as_overflow += 1;
            continue;
        }

        // Non-interference invariant: candidate neighbourhoods never
        // overlap another candidate's center (stride >= kernel side), so
        // reading from `output` mid-scan is equivalent to reading from the
        // original marked buffer.
        let x_c = i64::from(output.get(candidate.row, candidate.col));
        let predicted = predict(&output, kernel, candidate.row, candidate.col);
        let error_prime = x_c - predicted;

        if !is_carrier(error_prime, t_hi) {
            stats.skipped_for_low_error += 1;
            continue;
        }

        let bit = error_prime.rem_euclid(2);
        extracted_bits.push(bit == 1);

        let restored = x_c - (error_prime + bit).div_euclid(2);
        if restored < 0 {
            return Err(CodecError::ReconstructionUnderflow { candidate: idx });
        }
        output.set(candidate.row, candidate.col, restored as u32);
        stats.extracted_bits += 1;
    }

    Ok(ExtractOutcome { image: output, extracted_bits, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::embed;
    use crate::image::BitDepth;
    use crate::key::derive;

    fn key_hex(last_byte: u8) -> String {
        let mut bytes = [0u8; 32];
        bytes[31] = last_byte;
        hex::encode(bytes)
    }

    fn round_trip(pixels: Vec<u32>, width: usize, height: usize, last_byte: u8) {
        let image = Image::new(width, height, BitDepth::Eight, pixels.clone()).unwrap();
        let kernel = Kernel::default_four_neighbour();

        let (key, embed_mask) = derive(b"hello", &key_hex(last_byte)).unwrap();
        let outcome = embed(&image, &kernel, 3, &key, embed_mask, 0).unwrap();

        let (_, extract_mask) = derive(b"hello", &key_hex(last_byte)).unwrap();
        let recovered =
            extract(&outcome.image, &kernel, 3, extract_mask, 0, &outcome.overflow_map).unwrap();

        assert_eq!(recovered.image.pixels(), pixels.as_slice());
    }

    #[test]
    fn round_trip_holds_across_key_bytes() {
        #[rustfmt::skip]
        let pixels = vec![
            10, 10, 10,
            10, 100, 10,
            10, 10, 10,
        ];
        for last_byte in 0u8..=8 {
            round_trip(pixels.clone(), 3, 3, last_byte);
        }
    }

    #[test]
    fn round_trip_holds_at_saturation_boundary() {
        #[rustfmt::skip]
        let pixels = vec![
            10, 10, 10,
            10, 255, 10,
            10, 10, 10,
        ];
        for last_byte in 0u8..=8 {
            round_trip(pixels.clone(), 3, 3, last_byte);
        }
    }

    #[test]
    fn round_trip_holds_on_larger_image() {
        let width = 9;
        let height = 9;
        let mut pixels = vec![10u32; width * height];
        // Sprinkle in some higher-energy pixels so several candidates become carriers.
        for (i, p) in pixels.iter_mut().enumerate() {
            if i % 7 == 0 {
                *p = 200;
            }
        }
        for last_byte in 0u8..=4 {
            round_trip(pixels.clone(), width, height, last_byte);
        }
    }

    #[test]
    fn mask_bit_count_matches_candidate_count() {
        let width = 9;
        let height = 9;
        let key_bytes = [3u8; 32];
        let mask = MaskStream::from_secret_key(&key_bytes);
        let candidates = enumerate_candidates(height, width, 1, 3);
        let drawn: Vec<bool> = mask.take(candidates.len()).collect();
        assert_eq!(drawn.len(), candidates.len());
    }
}

//! Canonical image hashing.
//!
//! File-level hashing is not permitted: container metadata varies across
//! encoders, so the hash is computed over a pinned, in-memory encoding
//! instead — 4-byte big-endian width, 4-byte big-endian height, 1-byte bit
//! depth, then row-major pixels as big-endian integers of `ceil(B/8)` bytes.

use crate::image::Image;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 over the canonical pixel-array encoding.
#[must_use]
pub fn canonical_hash(image: &Image) -> String {
    let mut hasher = Sha256::new();
    hasher.update((image.width() as u32).to_be_bytes());
    hasher.update((image.height() as u32).to_be_bytes());
    hasher.update([image.bit_depth().bits()]);

    let bytes_per_pixel = image.bit_depth().bytes_per_pixel();
    for &pixel in image.pixels() {
        match bytes_per_pixel {
            1 => hasher.update([pixel as u8]),
            2 => hasher.update((pixel as u16).to_be_bytes()),
            _ => unreachable!("bit depth is always 8 or 16"),
        }
    }

    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::BitDepth;

    #[test]
    fn stable_across_rebuilds_of_identical_pixels() {
        let image = Image::new(2, 2, BitDepth::Eight, vec![1, 2, 3, 4]).unwrap();
        let again = Image::new(2, 2, BitDepth::Eight, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(canonical_hash(&image), canonical_hash(&again));
    }

    #[test]
    fn changes_with_a_single_pixel() {
        let a = Image::new(2, 2, BitDepth::Eight, vec![1, 2, 3, 4]).unwrap();
        let b = Image::new(2, 2, BitDepth::Eight, vec![1, 2, 3, 5]).unwrap();
        assert_ne!(canonical_hash(&a), canonical_hash(&b));
    }

    #[test]
    fn changes_with_bit_depth() {
        let a = Image::new(1, 1, BitDepth::Eight, vec![1]).unwrap();
        let b = Image::new(1, 1, BitDepth::Sixteen, vec![1]).unwrap();
        assert_ne!(canonical_hash(&a), canonical_hash(&b));
    }

    #[test]
    fn changes_with_dimensions() {
        let a = Image::new(2, 1, BitDepth::Eight, vec![1, 2]).unwrap();
        let b = Image::new(1, 2, BitDepth::Eight, vec![1, 2]).unwrap();
        assert_ne!(canonical_hash(&a), canonical_hash(&b));
    }
}

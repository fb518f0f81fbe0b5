//! Derives watermark bits and the mask bit stream from `(message, secret_key)`.

use crate::error::KeyError;
use sha2::{Digest, Sha256};

/// The mask-stream algorithm identifier recorded in every ledger `EmbedRecord`,
/// pinning Open Question 2: the pseudorandom bit generator choice.
pub const MASK_ALGORITHM: &str = "splitmix64-v1";

/// The 256-bit watermark plus the identifier of the mask algorithm that
/// produced the paired [`MaskStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKey {
    pub watermark: [bool; 256],
    pub mask_algorithm: &'static str,
}

impl DerivedKey {
    /// `w[k mod 256]`, the watermark bit assigned to the `k`-th marked candidate.
    #[must_use]
    pub fn bit(&self, k: usize) -> bool {
        self.watermark[k % 256]
    }
}

/// Derives `(watermark, mask_stream)` from a UTF-8 message and a 32-byte
/// hex-encoded secret key.
///
/// `watermark = SHA-256(message || secret_key)`, expanded MSB-first per byte.
/// `mask_stream` is seeded from `secret_key` alone (not `message`), so the
/// extractor can regenerate it from the key without the original message.
pub fn derive(message: &[u8], secret_key_hex: &str) -> Result<(DerivedKey, MaskStream), KeyError> {
    if message.is_empty() {
        return Err(KeyError::Empty);
    }
    let key_bytes = hex::decode(secret_key_hex).map_err(|_| KeyError::BadKey)?;
    if key_bytes.len() != 32 {
        return Err(KeyError::BadKey);
    }

    let mut hasher = Sha256::new();
    hasher.update(message);
    hasher.update(&key_bytes);
    let digest = hasher.finalize();
    let watermark = bytes_to_msb_bits(&digest);

    let mask_stream = MaskStream::from_secret_key(&key_bytes);

    Ok((DerivedKey { watermark, mask_algorithm: MASK_ALGORITHM }, mask_stream))
}

fn bytes_to_msb_bits(bytes: &[u8]) -> [bool; 256] {
    let mut bits = [false; 256];
    for (byte_idx, byte) in bytes.iter().enumerate() {
        for bit_idx in 0..8 {
            bits[byte_idx * 8 + bit_idx] = (byte >> (7 - bit_idx)) & 1 == 1;
        }
    }
    bits
}

/// An infinite, deterministic pseudorandom bit stream keyed by the secret
/// key, backed by SplitMix64 — a small, portable generator with no external
/// dependency, chosen so the stream is reproducible byte-for-byte given only
/// the key, independent of platform.
#[derive(Debug, Clone)]
pub struct MaskStream {
    state: u64,
    current_word: u64,
    bits_remaining: u8,
}

impl MaskStream {
    /// Seeds the generator from the first 8 bytes of `SHA-256(secret_key)`,
    /// read big-endian.
    #[must_use]
    pub fn from_secret_key(secret_key: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(secret_key);
        let digest = hasher.finalize();
        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&digest[..8]);
        Self::from_seed(u64::from_be_bytes(seed_bytes))
    }

    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self { state: seed, current_word: 0, bits_remaining: 0 }
    }

    fn next_word(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

impl Iterator for MaskStream {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.bits_remaining == 0 {
            self.current_word = self.next_word();
            self.bits_remaining = 64;
        }
        self.bits_remaining -= 1;
        // MSB-first: consume the highest remaining bit of the current word.
        Some((self.current_word >> self.bits_remaining) & 1 == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_key_hex() -> String {
        hex::encode([0u8; 32])
    }

    #[test]
    fn rejects_empty_message() {
        assert_eq!(derive(b"", &valid_key_hex()).unwrap_err(), KeyError::Empty);
    }

    #[test]
    fn rejects_bad_key_length() {
        assert_eq!(derive(b"hello", "00").unwrap_err(), KeyError::BadKey);
    }

    #[test]
    fn rejects_non_hex_key() {
        let bad = "zz".repeat(32);
        assert_eq!(derive(b"hello", &bad).unwrap_err(), KeyError::BadKey);
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let (k1, _) = derive(b"hello", &valid_key_hex()).unwrap();
        let (k2, _) = derive(b"hello", &valid_key_hex()).unwrap();
        assert_eq!(k1, k2);
    }

    #[test]
    fn mask_stream_prefix_is_reproducible() {
        let key = [7u8; 32];
        let a: Vec<bool> = MaskStream::from_secret_key(&key).take(200).collect();
        let b: Vec<bool> = MaskStream::from_secret_key(&key).take(200).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn mask_stream_differs_across_keys() {
        let a: Vec<bool> = MaskStream::from_secret_key(&[1u8; 32]).take(64).collect();
        let b: Vec<bool> = MaskStream::from_secret_key(&[2u8; 32]).take(64).collect();
        assert_ne!(a, b);
    }
}

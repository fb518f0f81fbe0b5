//! Reversible watermarking codec.
//!
//! Embeds a cryptographically derived watermark into a grayscale pixel
//! array via histogram shifting on prediction errors, such that the
//! original pixels can be recovered bit-exactly given the secret key and
//! the overflow map recorded alongside the embed operation.
//!
//! This crate owns the algorithmic core only — key derivation, prediction,
//! embedding, extraction, and canonical hashing. The audit ledger lives in
//! `revwat-ledger`; the CLI, batch driver, and structured logging live in
//! `revwat-cli`.

#![deny(unsafe_code)]

pub mod candidate;
pub mod embed;
pub mod error;
pub mod extract;
pub mod hash;
pub mod image;
pub mod io;
pub mod kernel;
pub mod key;
pub mod predictor;

pub use candidate::{enumerate_candidates, Candidate};
pub use embed::{embed, EmbedOutcome, EmbedStats};
pub use extract::{extract, ExtractOutcome, ExtractStats};
pub use hash::canonical_hash;
pub use image::{BitDepth, Image};
pub use kernel::Kernel;
pub use key::{derive, DerivedKey, MaskStream};
pub use predictor::predict;

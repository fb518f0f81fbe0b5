//! Hash-chained, append-only audit ledger for the watermarking codec.
//!
//! Every embed or remove batch is recorded as a block whose hash covers
//! its header and payload and whose header links to the previous block's
//! hash, giving the same tamper-evidence guarantee as a blockchain without
//! any of the consensus machinery — there is exactly one writer, enforced
//! by an advisory file lock.

#![deny(unsafe_code)]

pub mod block;
pub mod canonical_json;
pub mod chain;
pub mod error;
pub mod lock;

pub use block::{Block, BlockHeader, EmbedRecord, Info, RemoveRecord, Transaction};
pub use chain::{default_ledger_path, Ledger};
pub use error::LedgerError;

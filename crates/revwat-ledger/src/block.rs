//! Block and transaction payload types.
//!
//! Struct field order matters here: `serde`'s derived `Serialize` emits
//! struct fields in declaration order, and the canonical-JSON rule this
//! ledger hashes under requires lexicographically sorted keys, so every
//! struct below declares its fields alphabetically. `BTreeMap` keys sort
//! themselves, which is what gives the `transaction` dict its required
//! deterministic, hash-based ordering.

use revwat_core::Kernel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `previous_hash` value fixed for the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub block_number: u64,
    pub previous_hash: String,
    pub timestamp: String,
}

/// Which codec operation produced this block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Info {
    Genesis,
    Embedder,
    Remover,
}

/// One embed operation's audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedRecord {
    pub bit_depth: u8,
    pub filename: String,
    pub hash_image_orig: String,
    pub hash_image_wat: String,
    pub kernel: Kernel,
    pub mask_algorithm: String,
    pub overflow_map: Vec<usize>,
    pub stride: usize,
    pub t_hi: i64,
    pub watermark: Vec<bool>,
}

/// One remove operation's audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveRecord {
    pub filename: String,
    pub recovered_image_hash: String,
    pub watermarked_image_hash: String,
}

/// The batch payload of a block: either a map of embed records or a map of
/// remove records, keyed by watermarked-image hash so iteration (and thus
/// serialization) order is deterministic regardless of processing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transaction {
    Genesis,
    Embed(BTreeMap<String, EmbedRecord>),
    Remove(BTreeMap<String, RemoveRecord>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub hash: String,
    pub header: BlockHeader,
    pub info: Info,
    pub transaction: Transaction,
}

/// The subset of a [`Block`] that is actually hashed: everything except the
/// `hash` field itself. Field order (alphabetical) matches the canonical
/// JSON requirement.
#[derive(Debug, Serialize)]
pub(crate) struct HashInput<'a> {
    pub header: &'a BlockHeader,
    pub info: &'a Info,
    pub transaction: &'a Transaction,
}

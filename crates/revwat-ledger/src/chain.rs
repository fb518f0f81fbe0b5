//! The append-only, hash-chained audit ledger.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::block::{Block, BlockHeader, EmbedRecord, HashInput, Info, Transaction, GENESIS_PREVIOUS_HASH};
use crate::canonical_json::to_canonical_string;
use crate::error::LedgerError;
use crate::lock::LedgerLock;

/// On-disk ledger shape: a JSON object keyed by the block number rendered
/// as a decimal string. This mirrors the wire format exactly but is not
/// the order the chain is walked in-memory — string keys sort
/// lexicographically ("10" < "2"), so [`Ledger::load`] re-derives the true
/// sequence from each block's own `block_number` field rather than
/// trusting map iteration order.
type LedgerFile = BTreeMap<String, Block>;

/// An in-memory view of the hash chain, indexed for fast forensic lookup.
pub struct Ledger {
    blocks: Vec<Block>,
    by_watermarked_hash: HashMap<String, usize>,
}

impl Ledger {
    /// Loads the ledger at `path`, creating a fresh genesis block if the
    /// file does not exist yet. Verifies the full chain before returning.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        if !path.exists() {
            let genesis = genesis_block();
            let mut ledger = Self { blocks: vec![genesis], by_watermarked_hash: HashMap::new() };
            ledger.persist(path)?;
            return Ok(ledger);
        }

        let raw = std::fs::read_to_string(path)?;
        let file: LedgerFile = serde_json::from_str(&raw)?;
        let mut blocks: Vec<Block> = file.into_values().collect();
        blocks.sort_by_key(|b| b.header.block_number);

        let mut by_watermarked_hash = HashMap::new();
        for (index, block) in blocks.iter().enumerate() {
            verify_block(block, blocks.get(index.wrapping_sub(1)).filter(|_| index > 0))
                .ok_or(LedgerError::ChainCorrupted { index: block.header.block_number })?;
            if let Transaction::Embed(records) = &block.transaction {
                for hash in records.keys() {
                    by_watermarked_hash.insert(hash.clone(), index);
                }
            }
        }

        Ok(Self { blocks, by_watermarked_hash })
    }

    /// Appends a new block recording `info`/`transaction`, persists the
    /// ledger atomically, and returns the new block's number.
    pub fn append(&mut self, path: &Path, info: Info, transaction: Transaction) -> Result<u64, LedgerError> {
        let _guard = LedgerLock::acquire(path)?;

        let previous = self.blocks.last().expect("ledger always has at least a genesis block");
        let header = BlockHeader {
            block_number: previous.header.block_number + 1,
            previous_hash: previous.hash.clone(),
            timestamp: Utc::now().to_rfc3339(),
        };
        let hash = compute_hash(&header, &info, &transaction)?;
        let block_number = header.block_number;
        let index = self.blocks.len();
        if let Transaction::Embed(records) = &transaction {
            for record_hash in records.keys() {
                self.by_watermarked_hash.insert(record_hash.clone(), index);
            }
        }
        self.blocks.push(Block { hash, header, info, transaction });
        self.persist(path)?;
        Ok(block_number)
    }

    /// Looks up the embed record for an exact watermarked-image hash.
    #[must_use]
    pub fn find_by_watermarked_hash(&self, hash: &str) -> Option<&EmbedRecord> {
        let index = *self.by_watermarked_hash.get(hash)?;
        match &self.blocks[index].transaction {
            Transaction::Embed(records) => records.get(hash),
            _ => None,
        }
    }

    /// Finds the embed record whose recorded watermark bit sequence has
    /// the lowest bit error rate against `bits`, for forensic matching of
    /// images that have been modified since embedding. Returns the record
    /// and its BER (0.0 = identical watermark bits).
    #[must_use]
    pub fn find_best_match_by_bits(&self, bits: &[bool]) -> Option<(&EmbedRecord, f64)> {
        self.blocks
            .iter()
            .filter_map(|block| match &block.transaction {
                Transaction::Embed(records) => Some(records.values()),
                _ => None,
            })
            .flatten()
            .filter(|record| !record.watermark.is_empty())
            .map(|record| (record, bit_error_rate(&record.watermark, bits)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// All blocks in chain order, for inspection and tests.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    fn persist(&self, path: &Path) -> Result<(), LedgerError> {
        let file: LedgerFile = self.blocks.iter().map(|b| (b.header.block_number.to_string(), b.clone())).collect();
        let rendered = to_canonical_string(&file)?;

        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        let mut temp = NamedTempFile::new_in(dir)?;
        use std::io::Write;
        temp.write_all(rendered.as_bytes())?;
        temp.flush()?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn genesis_block() -> Block {
    let header = BlockHeader {
        block_number: 0,
        previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    let info = Info::Genesis;
    let transaction = Transaction::Genesis;
    let hash = compute_hash(&header, &info, &transaction).expect("genesis block always hashes");
    Block { hash, header, info, transaction }
}

fn compute_hash(header: &BlockHeader, info: &Info, transaction: &Transaction) -> Result<String, LedgerError> {
    let input = HashInput { header, info, transaction };
    let rendered = to_canonical_string(&input)?;
    let mut hasher = Sha256::new();
    hasher.update(rendered.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Recomputes `block`'s hash and, when `previous` is given, checks that
/// `block.header.previous_hash` matches it. Returns `None` on any mismatch.
fn verify_block(block: &Block, previous: Option<&Block>) -> Option<()> {
    let recomputed = compute_hash(&block.header, &block.info, &block.transaction).ok()?;
    if recomputed != block.hash {
        return None;
    }
    if let Some(previous) = previous {
        if block.header.previous_hash != previous.hash {
            return None;
        }
    } else if block.header.previous_hash != GENESIS_PREVIOUS_HASH {
        return None;
    }
    Some(())
}

fn bit_error_rate(recorded: &[bool], observed: &[bool]) -> f64 {
    let len = recorded.len().min(observed.len());
    if len == 0 {
        return 1.0;
    }
    let mismatches = recorded.iter().zip(observed.iter()).take(len).filter(|(a, b)| a != b).count();
    mismatches as f64 / len as f64
}

/// Default ledger location relative to a working directory.
#[must_use]
pub fn default_ledger_path(root: &Path) -> PathBuf {
    root.join("revwat_ledger.json")
}

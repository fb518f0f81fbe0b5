//! Ledger-specific error types.

use thiserror::Error;

/// Failures from loading, verifying, or appending to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Chain verification failed at the given block number: either its
    /// `previous_hash` does not match its predecessor's `hash`, or its own
    /// `hash` does not recompute to the stored value.
    #[error("ledger chain corrupted at block {index}")]
    ChainCorrupted { index: u64 },
    /// The advisory append lock is already held by another process.
    #[error("ledger is locked by another process")]
    ConcurrentLedger,
    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

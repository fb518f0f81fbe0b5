//! Advisory single-writer locking for ledger appends.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::LedgerError;

/// Holds an exclusive advisory lock on a `.lock` file sitting next to the
/// ledger path for the lifetime of the guard. The ledger file itself is
/// never locked directly so a reader can still open and parse it while a
/// writer holds this lock mid-append (the writer only publishes the new
/// ledger contents at the very end, via atomic rename).
pub struct LedgerLock {
    file: File,
    #[allow(dead_code)]
    path: PathBuf,
}

impl LedgerLock {
    /// Acquires the lock for `ledger_path`, failing immediately (rather
    /// than blocking) if another process already holds it.
    pub fn acquire(ledger_path: &Path) -> Result<Self, LedgerError> {
        let lock_path = lock_path_for(ledger_path);
        let file = OpenOptions::new().create(true).write(true).open(&lock_path)?;
        file.try_lock_exclusive().map_err(|_| LedgerError::ConcurrentLedger)?;
        Ok(Self { file, path: lock_path })
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn lock_path_for(ledger_path: &Path) -> PathBuf {
    let mut os_name = ledger_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| std::ffi::OsString::from("ledger.json"));
    os_name.push(".lock");
    ledger_path.with_file_name(os_name)
}

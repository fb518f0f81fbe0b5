#![no_main]
use std::collections::BTreeMap;

use libfuzzer_sys::fuzz_target;
use revwat_core::Kernel;
use revwat_ledger::{EmbedRecord, Info, Ledger, Transaction};
use tempfile::tempdir;

// Turns a handful of fuzzer bytes into an embed record so each appended
// block has distinct, adversarial-ish field content.
fn record_from_bytes(tag: u8) -> EmbedRecord {
    EmbedRecord {
        bit_depth: tag,
        filename: format!("fuzz-{tag}.pgm"),
        hash_image_orig: format!("orig-{tag}"),
        hash_image_wat: format!("wat-{tag}"),
        kernel: Kernel::default_four_neighbour(),
        mask_algorithm: "splitmix64-v1".to_string(),
        overflow_map: vec![tag as usize],
        stride: 3 + (tag % 5) as usize,
        t_hi: i64::from(tag as i8),
        watermark: vec![tag % 2 == 0, tag % 3 == 0],
    }
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let Ok(mut ledger) = Ledger::load(&path) else { return };

    for &byte in data {
        let mut records = BTreeMap::new();
        records.insert(format!("hash-{byte}"), record_from_bytes(byte));
        let info = if byte % 2 == 0 { Info::Embedder } else { Info::Remover };
        let _ = ledger.append(&path, info, Transaction::Embed(records));
    }

    // Reloading from disk must never panic, regardless of what sequence of
    // appends produced the file.
    let _ = Ledger::load(&path);
});

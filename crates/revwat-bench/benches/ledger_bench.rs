//! Ledger append/load throughput benchmarks.

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use revwat_core::Kernel;
use revwat_ledger::{EmbedRecord, Info, Ledger, Transaction};
use tempfile::tempdir;

fn sample_record(hash: &str) -> EmbedRecord {
    EmbedRecord {
        bit_depth: 8,
        filename: "bench.pgm".to_string(),
        hash_image_orig: "orig".to_string(),
        hash_image_wat: hash.to_string(),
        kernel: Kernel::default_four_neighbour(),
        mask_algorithm: "splitmix64-v1".to_string(),
        overflow_map: vec![],
        stride: 3,
        t_hi: 0,
        watermark: vec![true, false, true, false],
    }
}

fn bench_append(c: &mut Criterion) {
    c.bench_function("ledger_append_single_image_batch", |b| {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let mut ledger = Ledger::load(&path).unwrap();
        let mut counter = 0u64;

        b.iter(|| {
            counter += 1;
            let mut records = BTreeMap::new();
            records.insert(format!("hash{counter}"), sample_record(&format!("hash{counter}")));
            let block_number = ledger.append(&path, Info::Embedder, Transaction::Embed(records)).unwrap();
            black_box(block_number);
        });
    });
}

fn bench_load(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let mut ledger = Ledger::load(&path).unwrap();
    for i in 0..200 {
        let mut records = BTreeMap::new();
        records.insert(format!("hash{i}"), sample_record(&format!("hash{i}")));
        ledger.append(&path, Info::Embedder, Transaction::Embed(records)).unwrap();
    }

    c.bench_function("ledger_load_200_blocks", |b| {
        b.iter(|| {
            let loaded = Ledger::load(&path).unwrap();
            black_box(loaded);
        });
    });
}

criterion_group!(benches, bench_append, bench_load);
criterion_main!(benches);

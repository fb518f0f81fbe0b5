//! Embedding throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use revwat_core::{derive, embed, BitDepth, Image, Kernel};

fn key_hex() -> String {
    hex::encode([7u8; 32])
}

fn checkerboard(side: usize) -> Image {
    let pixels: Vec<u32> = (0..side * side).map(|i| if i % 2 == 0 { 40 } else { 210 }).collect();
    Image::new(side, side, BitDepth::Eight, pixels).unwrap()
}

fn bench_embed_by_image_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("embed_by_image_size");
    let kernel = Kernel::default_four_neighbour();

    for &side in &[32usize, 128, 512] {
        let image = checkerboard(side);
        group.bench_with_input(BenchmarkId::new("checkerboard", side), &side, |b, _| {
            b.iter(|| {
                let (key, mask) = derive(b"bench-message", &key_hex()).unwrap();
                let outcome = embed(&image, &kernel, 3, &key, mask, 0).unwrap();
                black_box(outcome);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_embed_by_image_size);
criterion_main!(benches);

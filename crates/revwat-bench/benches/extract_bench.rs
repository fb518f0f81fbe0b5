//! Extraction (recovery) throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use revwat_core::{derive, embed, extract, BitDepth, Image, Kernel};

fn key_hex() -> String {
    hex::encode([7u8; 32])
}

fn checkerboard(side: usize) -> Image {
    let pixels: Vec<u32> = (0..side * side).map(|i| if i % 2 == 0 { 40 } else { 210 }).collect();
    Image::new(side, side, BitDepth::Eight, pixels).unwrap()
}

fn bench_extract_by_image_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_by_image_size");
    let kernel = Kernel::default_four_neighbour();

    for &side in &[32usize, 128, 512] {
        let image = checkerboard(side);
        let (embed_key, embed_mask) = derive(b"bench-message", &key_hex()).unwrap();
        let outcome = embed(&image, &kernel, 3, &embed_key, embed_mask, 0).unwrap();

        group.bench_with_input(BenchmarkId::new("checkerboard", side), &side, |b, _| {
            b.iter(|| {
                let (_, mask) = derive(b"bench-message", &key_hex()).unwrap();
                let recovered = extract(&outcome.image, &kernel, 3, mask, 0, &outcome.overflow_map).unwrap();
                black_box(recovered);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extract_by_image_size);
criterion_main!(benches);

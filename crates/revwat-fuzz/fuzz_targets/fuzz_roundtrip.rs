#![no_main]
use libfuzzer_sys::fuzz_target;

use revwat_core::{derive, embed, extract, BitDepth, Image, Kernel};

fuzz_target!(|data: &[u8]| {
    // Need at least a key, a stride byte, a t_hi byte, and one pixel.
    if data.len() < 35 {
        return;
    }

    let key_bytes = &data[0..32];
    let key_hex = hex::encode(key_bytes);
    let stride = 3 + (data[32] % 4) as usize;
    let t_hi = i64::from(data[33] as i8);

    let pixel_bytes = &data[34..];
    if pixel_bytes.is_empty() {
        return;
    }
    let side = (pixel_bytes.len() as f64).sqrt() as usize;
    if side < 3 {
        return;
    }
    let pixels: Vec<u32> = pixel_bytes[..side * side].iter().map(|&b| u32::from(b)).collect();

    let Ok(image) = Image::new(side, side, BitDepth::Eight, pixels.clone()) else {
        return;
    };
    let kernel = Kernel::default_four_neighbour();

    let Ok((embed_key, embed_mask)) = derive(b"fuzz", &key_hex) else { return };
    let Ok(outcome) = embed(&image, &kernel, stride, &embed_key, embed_mask, t_hi) else { return };

    let Ok((_, extract_mask)) = derive(b"fuzz", &key_hex) else { return };
    let Ok(recovered) = extract(&outcome.image, &kernel, stride, extract_mask, t_hi, &outcome.overflow_map) else { return };

    assert_eq!(recovered.image.pixels(), pixels.as_slice(), "round-trip must recover the original pixels exactly");
});

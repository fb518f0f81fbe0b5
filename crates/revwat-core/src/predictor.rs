//! Fixed convolutional prediction with exact half-up integer rounding.
//!
//! Pinning Open Question 4 from the specification: the source relies on a
//! floating-point mean rounded to an integer, which leaves the 0.5
//! tie-breaking direction platform- and implementation-dependent. This
//! predictor never touches a float: the kernel's shared denominator lets the
//! weighted sum be accumulated as a single `i64` numerator and rounded with
//! exact integer arithmetic.

use crate::image::Image;
use crate::kernel::Kernel;

/// `round(Σ kernel[a,b] * image[row-r+a, col-r+b])`, half-up.
///
/// Callers must ensure `(row, col)` is a valid candidate center (i.e. the
/// full kernel support is in bounds); this function does not bounds-check,
/// matching "out-of-bounds centers are rejected at the caller; no padding."
#[must_use]
pub fn predict(image: &Image, kernel: &Kernel, row: usize, col: usize) -> i64 {
    let radius = kernel.radius();
    let mut numerator: i64 = 0;
    for a in 0..kernel.side() {
        for b in 0..kernel.side() {
            let coef = kernel.numerator_at(a, b);
            if coef == 0 {
                continue;
            }
            let neighbour_row = row + a - radius;
            let neighbour_col = col + b - radius;
            let value = i64::from(image.get(neighbour_row, neighbour_col));
            numerator += coef * value;
        }
    }
    half_up(numerator, kernel.denominator())
}

/// Rounds `n / d` half-up (ties go toward positive infinity), for `d > 0`.
fn half_up(n: i64, d: i64) -> i64 {
    debug_assert!(d > 0);
    (2 * n + d).div_euclid(2 * d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{BitDepth, Image};

    fn image3x3(center: u32) -> Image {
        #[rustfmt::skip]
        let pixels = vec![
            10, 10, 10,
            10, center, 10,
            10, 10, 10,
        ];
        Image::new(3, 3, BitDepth::Eight, pixels).unwrap()
    }

    #[test]
    fn predicts_uniform_neighbourhood() {
        let image = image3x3(100);
        let kernel = Kernel::default_four_neighbour();
        assert_eq!(predict(&image, &kernel, 1, 1), 10);
    }

    #[test]
    fn half_up_ties_round_toward_positive_infinity() {
        assert_eq!(half_up(1, 2), 1); // 0.5 -> 1
        assert_eq!(half_up(-1, 2), 0); // -0.5 -> 0
        assert_eq!(half_up(3, 2), 2); // 1.5 -> 2
        assert_eq!(half_up(-3, 2), -1); // -1.5 -> -1
    }
}

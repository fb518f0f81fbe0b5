//! Candidate-center enumeration shared by the embedder and the extractor so
//! the two can never disagree about scan order.

/// A pixel position eligible to carry a watermark bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub row: usize,
    pub col: usize,
}

/// Enumerates `{(i, j) : i, j >= r, i+r < H, j+r < W, (i-r) mod s == 0, (j-r) mod s == 0}`
/// in row-major order over valid centers, per the candidate definition in the
/// data model.
#[must_use]
pub fn enumerate_candidates(height: usize, width: usize, radius: usize, stride: usize) -> Vec<Candidate> {
    let mut out = Vec::new();
    if height <= 2 * radius || width <= 2 * radius {
        return out;
    }
    let mut i = radius;
    while i + radius < height {
        let mut j = radius;
        while j + radius < width {
            out.push(Candidate { row: i, col: j });
            j += stride;
        }
        i += stride;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_candidate_for_3x3_with_stride_3() {
        let candidates = enumerate_candidates(3, 3, 1, 3);
        assert_eq!(candidates, vec![Candidate { row: 1, col: 1 }]);
    }

    #[test]
    fn empty_when_image_smaller_than_kernel() {
        assert!(enumerate_candidates(2, 2, 1, 3).is_empty());
    }

    #[test]
    fn row_major_order_for_larger_image() {
        let candidates = enumerate_candidates(7, 7, 1, 3);
        assert_eq!(
            candidates,
            vec![
                Candidate { row: 1, col: 1 },
                Candidate { row: 1, col: 4 },
                Candidate { row: 4, col: 1 },
                Candidate { row: 4, col: 4 },
            ]
        );
    }
}

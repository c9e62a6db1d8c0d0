//! Threshold-based candidate extraction.

use crate::kernel::ScoreMap;

/// Score-map cell that met the detection threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// X coordinate (column) of the template anchor.
    pub x: usize,
    /// Y coordinate (row) of the template anchor.
    pub y: usize,
    /// ZNCC score at the anchor.
    pub score: f32,
}

/// Returns every cell with `score >= threshold`, in row-major order.
///
/// The scan order is fixed (y ascending, then x ascending); suppression breaks
/// ties by input order, so this order is part of the output contract.
pub fn extract_candidates(map: &ScoreMap, threshold: f32) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for y in 0..map.height() {
        let Some(row) = map.row(y) else {
            break;
        };
        for (x, &score) in row.iter().enumerate() {
            if score >= threshold {
                candidates.push(Candidate { x, y, score });
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::extract_candidates;
    use crate::kernel::ScoreMap;

    fn map() -> ScoreMap {
        ScoreMap::from_vec(vec![0.9, -0.2, 0.5, 0.0, 0.7, 0.95], 3, 2)
    }

    #[test]
    fn candidates_are_row_major() {
        let found = extract_candidates(&map(), 0.5);
        let coords: Vec<_> = found.iter().map(|c| (c.x, c.y)).collect();
        assert_eq!(coords, vec![(0, 0), (2, 0), (1, 1), (2, 1)]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let found = extract_candidates(&map(), 0.95);
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].x, found[0].y), (2, 1));
    }

    #[test]
    fn zero_keeps_non_negative_and_above_one_keeps_nothing() {
        assert_eq!(extract_candidates(&map(), 0.0).len(), 5);
        assert!(extract_candidates(&map(), 1.01).is_empty());
    }
}

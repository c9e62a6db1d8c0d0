//! Greedy overlap suppression for boxes of a single template.
//!
//! Boxes carry no score, so ranking is geometric: the box with the largest
//! `y2` (the bottom-most one) is kept first. The overlap of a remaining box
//! with the kept one is the intersection area divided by the remaining box's
//! own inclusive area. This is not intersection-over-union and changing it
//! changes the reported counts.

use crate::candidate::bbox::BBox;

/// Overlap threshold used by the frame pipeline.
pub const DEFAULT_OVERLAP_THRESH: f64 = 0.3;

/// Intersection of `picked` and `other` over the inclusive area of `other`.
///
/// The intersection uses the same `+1` inclusive convention per side, and
/// is zero when the boxes are disjoint.
pub fn overlap_ratio(picked: &BBox, other: &BBox) -> f64 {
    let w = (picked.x2.min(other.x2) as i64 - picked.x1.max(other.x1) as i64 + 1).max(0);
    let h = (picked.y2.min(other.y2) as i64 - picked.y1.max(other.y1) as i64 + 1).max(0);
    (w * h) as f64 / other.inclusive_area() as f64
}

/// Collapses overlapping boxes into a representative subset.
///
/// Indices are stably sorted by `y2`; the last one is kept, and it is removed
/// together with every remaining box whose [`overlap_ratio`] against it is
/// strictly greater than `overlap_thresh`. Kept boxes are returned in the
/// order they were picked.
pub fn suppress_overlapping(boxes: &[BBox], overlap_thresh: f64) -> Vec<BBox> {
    if boxes.is_empty() {
        return Vec::new();
    }

    let mut idxs: Vec<usize> = (0..boxes.len()).collect();
    idxs.sort_by_key(|&i| boxes[i].y2);

    let mut picked = Vec::new();
    while let Some(last) = idxs.pop() {
        let keep = boxes[last];
        picked.push(keep);
        idxs.retain(|&i| overlap_ratio(&keep, &boxes[i]) <= overlap_thresh);
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::{overlap_ratio, suppress_overlapping, DEFAULT_OVERLAP_THRESH};
    use crate::candidate::bbox::BBox;

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(suppress_overlapping(&[], DEFAULT_OVERLAP_THRESH).is_empty());
    }

    #[test]
    fn ratio_uses_compared_box_area() {
        let small = BBox::new(0, 0, 9, 9);
        let large = BBox::new(0, 0, 19, 19);
        assert!((overlap_ratio(&large, &small) - 1.0).abs() < 1e-12);
        assert!((overlap_ratio(&small, &large) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn touching_edges_count_as_overlap() {
        let a = BBox::new(0, 0, 10, 10);
        let b = BBox::new(10, 0, 20, 10);
        assert!((overlap_ratio(&a, &b) - 11.0 / 121.0).abs() < 1e-12);
        let c = BBox::new(11, 0, 21, 10);
        assert_eq!(overlap_ratio(&a, &c), 0.0);
    }

    #[test]
    fn bottom_most_box_is_picked_first() {
        let boxes = [
            BBox::new(0, 0, 10, 10),
            BBox::new(100, 50, 110, 60),
            BBox::new(50, 20, 60, 30),
        ];
        let kept = suppress_overlapping(&boxes, DEFAULT_OVERLAP_THRESH);
        assert_eq!(kept, vec![boxes[1], boxes[2], boxes[0]]);
    }

    #[test]
    fn equal_y2_ties_pick_later_input_first() {
        let boxes = [BBox::new(0, 0, 10, 10), BBox::new(50, 0, 60, 10)];
        let kept = suppress_overlapping(&boxes, DEFAULT_OVERLAP_THRESH);
        assert_eq!(kept, vec![boxes[1], boxes[0]]);
    }

    #[test]
    fn asymmetric_ratio_keeps_large_box_under_small_picked_box() {
        // Picked small box covers a quarter of the large box: large survives.
        let boxes = [BBox::new(0, 0, 19, 19), BBox::new(0, 10, 9, 19)];
        let kept = suppress_overlapping(&boxes, DEFAULT_OVERLAP_THRESH);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0], boxes[1]);
    }
}

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tplcount::{overlap_ratio, suppress_overlapping, BBox, DEFAULT_OVERLAP_THRESH};

#[test]
fn output_is_a_subset_of_input() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let count = rng.random_range(0..60);
        let boxes: Vec<BBox> = (0..count)
            .map(|_| {
                let x = rng.random_range(0..100);
                let y = rng.random_range(0..100);
                BBox::from_anchor(x, y, rng.random_range(1..20), rng.random_range(1..20))
            })
            .collect();

        let kept = suppress_overlapping(&boxes, DEFAULT_OVERLAP_THRESH);
        assert!(kept.len() <= boxes.len());
        assert!(boxes.is_empty() || !kept.is_empty());
        for b in &kept {
            assert!(boxes.contains(b));
        }
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                // Later picks survived comparison against every earlier pick.
                assert!(overlap_ratio(a, b) <= DEFAULT_OVERLAP_THRESH);
            }
        }
    }
}

#[test]
fn overlap_equal_to_threshold_is_not_suppressed() {
    // Inclusive area of `compared` is 10 * 10 = 100, intersection 10 * 3 = 30.
    let compared = BBox::new(0, 0, 9, 9);
    let picked = BBox::new(0, 7, 9, 20);
    assert_eq!(overlap_ratio(&picked, &compared), 0.3);

    let kept = suppress_overlapping(&[compared, picked], 0.3);
    assert_eq!(kept, vec![picked, compared]);
}

#[test]
fn overlap_just_above_threshold_is_suppressed() {
    // Inclusive area of `compared` is 40 * 5000, intersection 38 * 1579.
    let compared = BBox::new(0, 0, 39, 4999);
    let picked = BBox::new(2, 3421, 39, 6000);
    let ratio = overlap_ratio(&picked, &compared);
    assert!((ratio - 0.30001).abs() < 1e-12);

    let kept = suppress_overlapping(&[compared, picked], 0.3);
    assert_eq!(kept, vec![picked]);
}

#[test]
fn identical_boxes_collapse_to_one() {
    let b = BBox::from_anchor(5, 5, 20, 20);
    assert_eq!(suppress_overlapping(&[b, b], DEFAULT_OVERLAP_THRESH), vec![b]);
    assert_eq!(suppress_overlapping(&[b, b, b, b], DEFAULT_OVERLAP_THRESH), vec![b]);
}

#[test]
fn larger_y2_survives_close_pair() {
    let first = BBox::new(10, 10, 30, 30);
    let second = BBox::new(12, 12, 32, 32);

    // 19 * 19 intersection over the compared box's 21 * 21 inclusive area.
    let ratio = overlap_ratio(&second, &first);
    assert!((ratio - 361.0 / 441.0).abs() < 1e-12);

    let kept = suppress_overlapping(&[first, second], DEFAULT_OVERLAP_THRESH);
    assert_eq!(kept, vec![second]);
    let kept = suppress_overlapping(&[second, first], DEFAULT_OVERLAP_THRESH);
    assert_eq!(kept, vec![second]);
}

#[test]
fn metric_differs_from_intersection_over_union() {
    // IoU here is 100 / 400 = 0.25, but the compared box is fully covered.
    let picked = BBox::new(0, 0, 19, 19);
    let compared = BBox::new(5, 5, 14, 14);
    assert_eq!(overlap_ratio(&picked, &compared), 1.0);
    assert_eq!(
        suppress_overlapping(&[compared, picked], DEFAULT_OVERLAP_THRESH),
        vec![picked]
    );
}

#[test]
fn chain_of_boxes_keeps_non_adjacent_members() {
    // Each box overlaps its neighbours by more than the threshold, but the
    // ones two steps apart do not touch.
    let boxes: Vec<BBox> = (0..5).map(|i| BBox::from_anchor(0, i * 6, 10, 10)).collect();
    let kept = suppress_overlapping(&boxes, DEFAULT_OVERLAP_THRESH);
    assert_eq!(kept, vec![boxes[4], boxes[2], boxes[0]]);
}

//! Candidate selection and pruning utilities.
//!
//! Thresholding turns a score map into anchors, anchors become boxes, and
//! overlapping boxes of the same template are collapsed by greedy suppression.

pub(crate) mod bbox;
pub(crate) mod nms;
pub(crate) mod threshold;

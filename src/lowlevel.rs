//! Building blocks of the frame pipeline.
//!
//! These are the individual stages [`crate::FrameDetector`] chains together,
//! exposed for inspection and for custom pipelines.

pub use crate::candidate::bbox::BBox;
pub use crate::candidate::nms::{overlap_ratio, suppress_overlapping, DEFAULT_OVERLAP_THRESH};
pub use crate::candidate::threshold::{extract_candidates, Candidate};
pub use crate::image::IntegralImage;
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::ZnccRayon;
pub use crate::kernel::scalar::ZnccScalar;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::ZnccSimd;
pub use crate::kernel::{Kernel, ScanParams, ScoreMap, DEFAULT_NORM_EPSILON};
pub use crate::template::TemplatePlan;

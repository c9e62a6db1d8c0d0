//! tplcount counts repeated occurrences of small grayscale templates in video
//! frames.
//!
//! Each frame is matched against a fixed template list with zero-mean
//! normalized cross-correlation, thresholded, and collapsed with a greedy
//! overlap suppression. The per-frame result is a total count plus the
//! surviving boxes tagged by template. Frames are scored independently; no
//! identity is carried between frames.
//!
//! Optional features: `rayon` (row-parallel score maps), `simd` (vectorized
//! score maps), `image-io` (image files as frames and template audit copies),
//! `annotate` (frames saved with detections drawn in), and `tracing` (spans
//! and events).

mod candidate;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod pipeline;
pub mod session;
pub mod source;
pub mod template;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;
pub use crate::image::{ImageView, OwnedImage};
pub use kernel::ScoreMap;
pub use pipeline::{Backend, Detection, DetectionConfig, FrameDetector, PipelineResult};
pub use session::{
    run_session, ChannelControls, Command, ControlEvent, ControlSurface, EndReason, PlaybackState,
    ResultSink, SessionConfig, SessionSummary,
};
pub use source::{FrameSource, MemorySource};
pub use template::{capture_indexed, capture_templates, CapturedTemplate, Roi, Template};
pub use util::{TplCountError, TplCountResult};

pub use candidate::bbox::BBox;
pub use candidate::nms::{overlap_ratio, suppress_overlapping, DEFAULT_OVERLAP_THRESH};

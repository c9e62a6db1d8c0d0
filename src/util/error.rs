//! Error types for tplcount.

use thiserror::Error;

/// Result alias for tplcount operations.
pub type TplCountResult<T> = std::result::Result<T, TplCountError>;

/// Errors that can occur while building inputs or running the detection loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TplCountError {
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Stride is smaller than the row width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer cannot hold the described image.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A region does not fit inside the image it is taken from.
    #[error(
        "region ({x}, {y}, {width}x{height}) exceeds image bounds {img_width}x{img_height}"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Template does not fit inside the frame it is matched against.
    #[error("template {tpl_width}x{tpl_height} is larger than frame {img_width}x{img_height}")]
    TemplateLargerThanFrame {
        tpl_width: usize,
        tpl_height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// The frame source could not be opened.
    #[error("failed to open frame source: {reason}")]
    Initialization { reason: String },
    /// A frame could not be read or decoded.
    #[error("failed to read frame {index}: {reason}")]
    FrameRead { index: usize, reason: String },
    /// Seek target is past the last frame.
    #[error("seek to frame {index} out of range (frame count {count})")]
    SeekOutOfRange { index: usize, count: usize },
    /// A control command line could not be parsed.
    #[error("invalid command {line:?}: {reason}")]
    InvalidCommand { line: String, reason: &'static str },
    /// A result sink failed to record a frame.
    #[error("result sink: {reason}")]
    Sink { reason: String },
    /// Image encoding or file system failure.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}

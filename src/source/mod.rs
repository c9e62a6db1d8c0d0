//! Seekable grayscale frame sources.
//!
//! A source owns a read cursor. `read_next` returns the frame at the cursor
//! and advances it; `seek` moves it. `position` always reports the index of
//! the frame the next `read_next` will return, which is what the playback
//! loop resynchronises against after every read.

use crate::image::OwnedImage;
use crate::util::{TplCountError, TplCountResult};

#[cfg(feature = "image-io")]
mod sequence;

#[cfg(feature = "image-io")]
pub use sequence::ImageSequenceSource;

/// Ordered, seekable sequence of grayscale frames.
pub trait FrameSource {
    /// Reads the frame at the cursor and advances it; `None` at end of stream.
    fn read_next(&mut self) -> TplCountResult<Option<OwnedImage>>;

    /// Moves the cursor to `index`; `index == frame_count()` is end of stream.
    fn seek(&mut self, index: usize) -> TplCountResult<()>;

    /// Total number of frames.
    fn frame_count(&self) -> usize;

    /// Index of the frame the next `read_next` returns.
    fn position(&self) -> usize;
}

/// Frames held in memory, mostly for tests and synthetic input.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    frames: Vec<OwnedImage>,
    cursor: usize,
}

impl MemorySource {
    /// Wraps a list of frames; an empty list cannot be opened.
    pub fn new(frames: Vec<OwnedImage>) -> TplCountResult<Self> {
        if frames.is_empty() {
            return Err(TplCountError::Initialization {
                reason: "no frames".to_string(),
            });
        }
        Ok(Self { frames, cursor: 0 })
    }
}

impl FrameSource for MemorySource {
    fn read_next(&mut self) -> TplCountResult<Option<OwnedImage>> {
        let frame = self.frames.get(self.cursor).cloned();
        if frame.is_some() {
            self.cursor += 1;
        }
        Ok(frame)
    }

    fn seek(&mut self, index: usize) -> TplCountResult<()> {
        check_seek(index, self.frames.len())?;
        self.cursor = index;
        Ok(())
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn position(&self) -> usize {
        self.cursor
    }
}

pub(crate) fn check_seek(index: usize, count: usize) -> TplCountResult<()> {
    if index > count {
        return Err(TplCountError::SeekOutOfRange { index, count });
    }
    Ok(())
}

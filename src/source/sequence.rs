//! Frames stored as numbered still images in one directory.

use crate::image::io::load_gray_image;
use crate::image::OwnedImage;
use crate::source::{check_seek, FrameSource};
use crate::util::{TplCountError, TplCountResult};
use std::fs;
use std::path::{Path, PathBuf};

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Directory of image files played back in lexicographic file-name order.
///
/// Files are decoded lazily, one per `read_next`, and converted to grayscale.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    cursor: usize,
}

impl ImageSequenceSource {
    /// Lists the frame files of `dir`.
    ///
    /// Fails with `Initialization` if the directory cannot be read or holds
    /// no png/jpeg files.
    pub fn open<P: AsRef<Path>>(dir: P) -> TplCountResult<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|err| TplCountError::Initialization {
            reason: format!("{}: {err}", dir.display()),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| TplCountError::Initialization {
                reason: format!("{}: {err}", dir.display()),
            })?;
            let path = entry.path();
            if path.is_file() && is_frame_file(&path) {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(TplCountError::Initialization {
                reason: format!("{}: no frame images", dir.display()),
            });
        }
        paths.sort();
        Ok(Self { paths, cursor: 0 })
    }

    /// Returns the frame file paths in playback order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

impl FrameSource for ImageSequenceSource {
    fn read_next(&mut self) -> TplCountResult<Option<OwnedImage>> {
        let Some(path) = self.paths.get(self.cursor) else {
            return Ok(None);
        };
        let frame = load_gray_image(path).map_err(|err| TplCountError::FrameRead {
            index: self.cursor,
            reason: err.to_string(),
        })?;
        self.cursor += 1;
        Ok(Some(frame))
    }

    fn seek(&mut self, index: usize) -> TplCountResult<()> {
        check_seek(index, self.paths.len())?;
        self.cursor = index;
        Ok(())
    }

    fn frame_count(&self) -> usize {
        self.paths.len()
    }

    fn position(&self) -> usize {
        self.cursor
    }
}

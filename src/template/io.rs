//! Audit copies of captured templates.
//!
//! Persisted files are never read back by the detection loop.

use crate::image::io::save_gray_image;
use crate::template::{CapturedTemplate, Template};
use crate::util::{TplCountError, TplCountResult};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Returns `template_{index + 1}_{YYYYmmdd_HHMMSS_micros}.png`.
pub fn template_file_name(index: usize, captured_at: DateTime<Local>) -> String {
    format!(
        "template_{}_{}.png",
        index + 1,
        captured_at.format("%Y%m%d_%H%M%S_%6f")
    )
}

/// Writes `template` into `dir` (created if missing) and returns the path.
///
/// `index` is the index of the capture region, so the file number matches the
/// region's position in the configuration.
pub fn persist_template<P: AsRef<Path>>(
    dir: P,
    index: usize,
    template: &Template,
) -> TplCountResult<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|err| TplCountError::ImageIo {
        reason: format!("{}: {err}", dir.display()),
    })?;
    let path = dir.join(template_file_name(index, Local::now()));
    save_gray_image(&path, template.view())?;
    Ok(path)
}

/// Persists a captured template under its region index.
pub fn persist_captured<P: AsRef<Path>>(
    dir: P,
    captured: &CapturedTemplate,
) -> TplCountResult<PathBuf> {
    persist_template(dir, captured.roi_index, &captured.template)
}

//! One-shot template capture from a reference frame.

use crate::image::ImageView;
use crate::template::Template;
use crate::trace::trace_event;
use crate::util::TplCountResult;

/// Axis-aligned capture region in frame pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Roi {
    /// Left column.
    pub x: usize,
    /// Top row.
    pub y: usize,
    /// Region width in pixels.
    pub width: usize,
    /// Region height in pixels.
    pub height: usize,
}

impl Roi {
    /// Creates a region from its top-left corner and extent.
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true when the region has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A template together with the index of the region it was cut from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedTemplate {
    /// Index into the region list passed to [`capture_indexed`].
    pub roi_index: usize,
    /// The copied pixels.
    pub template: Template,
}

/// Copies every non-empty region of `frame`, keeping each region's index.
///
/// Empty regions are skipped, so indices may have gaps. A non-empty region
/// that leaves the frame is an error.
pub fn capture_indexed(
    frame: ImageView<'_, u8>,
    rois: &[Roi],
) -> TplCountResult<Vec<CapturedTemplate>> {
    let mut captured = Vec::with_capacity(rois.len());
    for (roi_index, roi) in rois.iter().enumerate() {
        if roi.is_empty() {
            continue;
        }
        let view = frame.roi(roi.x, roi.y, roi.width, roi.height)?;
        captured.push(CapturedTemplate {
            roi_index,
            template: Template::from_view(view)?,
        });
    }
    trace_event!(
        "templates_captured",
        requested = rois.len(),
        captured = captured.len()
    );
    Ok(captured)
}

/// Copies every non-empty region of `frame` into an owned template.
///
/// The returned list may be shorter than `rois`; see [`capture_indexed`].
pub fn capture_templates(frame: ImageView<'_, u8>, rois: &[Roi]) -> TplCountResult<Vec<Template>> {
    Ok(capture_indexed(frame, rois)?
        .into_iter()
        .map(|captured| captured.template)
        .collect())
}

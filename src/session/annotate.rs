//! Frames written to disk with their detections drawn in.
//!
//! Available with the `annotate` feature. Boxes are drawn green, two pixels
//! thick, with both corners inclusive. The `Count: N` caption needs a font
//! file; without one only the boxes are drawn.

use crate::candidate::bbox::BBox;
use crate::image::ImageView;
use crate::pipeline::PipelineResult;
use crate::session::ResultSink;
use crate::util::{TplCountError, TplCountResult};
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::fs;
use std::path::{Path, PathBuf};

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const BOX_THICKNESS: usize = 2;
const CAPTION_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const CAPTION_ORIGIN: (i32, i32) = (10, 8);
const CAPTION_SCALE: f32 = 28.0;

/// Renders `frame` in RGB with every detection of `result` outlined.
pub fn annotate_frame(
    frame: ImageView<'_, u8>,
    result: &PipelineResult,
    font: Option<&FontVec>,
) -> RgbImage {
    let mut canvas = RgbImage::from_fn(frame.width() as u32, frame.height() as u32, |x, y| {
        let v = frame.get(x as usize, y as usize).copied().unwrap_or(0);
        Rgb([v, v, v])
    });
    for detection in &result.detections {
        draw_box(&mut canvas, &detection.bbox);
    }
    if let Some(font) = font {
        draw_text_mut(
            &mut canvas,
            CAPTION_COLOR,
            CAPTION_ORIGIN.0,
            CAPTION_ORIGIN.1,
            PxScale::from(CAPTION_SCALE),
            font,
            &format!("Count: {}", result.total_count),
        );
    }
    canvas
}

fn draw_box(canvas: &mut RgbImage, bbox: &BBox) {
    // Corners are inclusive, so the outline spans `width + 1` pixels.
    let outer_w = bbox.width() + 1;
    let outer_h = bbox.height() + 1;
    for inset in 0..BOX_THICKNESS {
        let w = outer_w.saturating_sub(2 * inset);
        let h = outer_h.saturating_sub(2 * inset);
        if w == 0 || h == 0 {
            break;
        }
        let rect = Rect::at((bbox.x1 + inset) as i32, (bbox.y1 + inset) as i32)
            .of_size(w as u32, h as u32);
        draw_hollow_rect_mut(canvas, rect, BOX_COLOR);
    }
}

/// Sink saving one annotated PNG per processed frame as `frame_{index:06}.png`.
pub struct AnnotatedFrameSink {
    dir: PathBuf,
    font: Option<FontVec>,
}

impl AnnotatedFrameSink {
    /// Writes into `dir`, creating it if missing.
    pub fn create<P: AsRef<Path>>(dir: P) -> TplCountResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|err| TplCountError::Sink {
            reason: format!("{}: {err}", dir.display()),
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            font: None,
        })
    }

    /// Loads a TrueType/OpenType font used for the count caption.
    pub fn with_font_file<P: AsRef<Path>>(mut self, path: P) -> TplCountResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| TplCountError::Sink {
            reason: format!("{}: {err}", path.display()),
        })?;
        let font = FontVec::try_from_vec(bytes).map_err(|err| TplCountError::Sink {
            reason: format!("{}: {err}", path.display()),
        })?;
        self.font = Some(font);
        Ok(self)
    }

    /// Path the frame with index `frame_index` is written to.
    pub fn frame_path(&self, frame_index: usize) -> PathBuf {
        self.dir.join(format!("frame_{frame_index:06}.png"))
    }
}

impl ResultSink for AnnotatedFrameSink {
    fn on_frame(
        &mut self,
        frame_index: usize,
        frame: ImageView<'_, u8>,
        result: &PipelineResult,
    ) -> TplCountResult<()> {
        let canvas = annotate_frame(frame, result, self.font.as_ref());
        let path = self.frame_path(frame_index);
        canvas.save(&path).map_err(|err| TplCountError::Sink {
            reason: format!("{}: {err}", path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{annotate_frame, AnnotatedFrameSink};
    use crate::candidate::bbox::BBox;
    use crate::image::OwnedImage;
    use crate::pipeline::{Detection, PipelineResult};
    use crate::session::ResultSink;
    use image::Rgb;

    fn result_with(bbox: BBox) -> PipelineResult {
        PipelineResult {
            total_count: 1,
            detections: vec![Detection {
                bbox,
                template_index: 0,
            }],
        }
    }

    #[test]
    fn boxes_are_outlined_two_pixels_thick() {
        let frame = OwnedImage::filled(20, 16, 90).unwrap();
        let canvas = annotate_frame(frame.view(), &result_with(BBox::new(4, 3, 12, 10)), None);

        let green = Rgb([0, 255, 0]);
        let gray = Rgb([90, 90, 90]);
        assert_eq!(*canvas.get_pixel(4, 3), green);
        assert_eq!(*canvas.get_pixel(12, 10), green);
        assert_eq!(*canvas.get_pixel(5, 6), green);
        assert_eq!(*canvas.get_pixel(11, 6), green);
        assert_eq!(*canvas.get_pixel(6, 6), gray);
        assert_eq!(*canvas.get_pixel(3, 3), gray);
        assert_eq!(*canvas.get_pixel(13, 10), gray);
    }

    #[test]
    fn box_touching_the_frame_edge_is_clipped() {
        let frame = OwnedImage::filled(10, 10, 0).unwrap();
        let result = result_with(BBox::from_anchor(4, 4, 6, 6));
        let canvas = annotate_frame(frame.view(), &result, None);
        assert_eq!((canvas.width(), canvas.height()), (10, 10));
        assert_eq!(*canvas.get_pixel(4, 4), Rgb([0, 255, 0]));
    }

    #[test]
    fn sink_writes_one_png_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = AnnotatedFrameSink::create(dir.path().join("annotated")).unwrap();
        let frame = OwnedImage::filled(24, 18, 30).unwrap();
        sink.on_frame(7, frame.view(), &result_with(BBox::new(2, 2, 8, 8)))
            .unwrap();

        let path = sink.frame_path(7);
        assert!(path.ends_with("frame_000007.png"));
        let written = image::open(&path).unwrap().to_rgb8();
        assert_eq!((written.width(), written.height()), (24, 18));
        assert_eq!(*written.get_pixel(2, 2), Rgb([0, 255, 0]));
    }

    #[test]
    fn missing_font_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = AnnotatedFrameSink::create(dir.path()).unwrap();
        assert!(sink.with_font_file(dir.path().join("none.ttf")).is_err());
    }
}

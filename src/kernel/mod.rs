//! Correlation kernels producing dense ZNCC score maps.
//!
//! Every kernel computes, for each placement `(x, y)` of the template inside
//! the frame, the zero-mean normalized cross-correlation
//!
//! ```text
//! S = sum((T - mean T) * (P - mean P)) / (|T - mean T| * |P - mean P|)
//! ```
//!
//! Because `sum(T - mean T) == 0`, the numerator reduces to
//! `sum((T - mean T) * P)`, and the patch norm comes from integral images.
//! Placements where either norm is below `norm_epsilon` score exactly zero.

use crate::image::{ImageView, IntegralImage};
use crate::template::TemplatePlan;
use crate::util::{TplCountError, TplCountResult};

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Norm below which a template or patch counts as constant.
pub const DEFAULT_NORM_EPSILON: f64 = 1e-6;

/// Scan configuration shared by all kernels.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Minimum L2 norm of the zero-mean template and patch.
    pub norm_epsilon: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            norm_epsilon: DEFAULT_NORM_EPSILON,
        }
    }
}

/// Dense row-major map of correlation scores, one per template placement.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMap {
    width: usize,
    height: usize,
    scores: Vec<f32>,
}

impl ScoreMap {
    pub(crate) fn from_vec(scores: Vec<f32>, width: usize, height: usize) -> Self {
        debug_assert_eq!(scores.len(), width * height);
        Self {
            width,
            height,
            scores,
        }
    }

    pub(crate) fn zeros(width: usize, height: usize) -> Self {
        Self::from_vec(vec![0.0; width * height], width, height)
    }

    /// Number of horizontal placements, `W - w + 1`.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of vertical placements, `H - h + 1`.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the score for the placement anchored at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.scores.get(y * self.width + x).copied()
    }

    /// Returns the scores of row `y`.
    pub fn row(&self, y: usize) -> Option<&[f32]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.scores.get(start..start + self.width)
    }

    /// Returns all scores in row-major order.
    pub fn as_slice(&self) -> &[f32] {
        &self.scores
    }
}

/// Kernel trait for dense correlation.
pub trait Kernel {
    /// Computes the score at a single placement (top-left coordinates).
    ///
    /// `integral` must be built from `frame`, and the placement must be valid.
    fn score_at(
        frame: ImageView<'_, u8>,
        integral: &IntegralImage,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
        params: ScanParams,
    ) -> f32;

    /// Computes the full score map over every valid placement.
    fn score_map(
        frame: ImageView<'_, u8>,
        plan: &TemplatePlan,
        params: ScanParams,
    ) -> TplCountResult<ScoreMap>;
}

/// Returns the score map dimensions, or an error when the template is larger.
pub(crate) fn placement_range(
    frame: ImageView<'_, u8>,
    plan: &TemplatePlan,
) -> TplCountResult<(usize, usize)> {
    let img_width = frame.width();
    let img_height = frame.height();
    let tpl_width = plan.width();
    let tpl_height = plan.height();
    if img_width < tpl_width || img_height < tpl_height {
        return Err(TplCountError::TemplateLargerThanFrame {
            tpl_width,
            tpl_height,
            img_width,
            img_height,
        });
    }
    Ok((img_width - tpl_width + 1, img_height - tpl_height + 1))
}

/// Combines the numerator with both norms under the degenerate-norm policy.
///
/// The result is clamped to `[-1, 1]` to absorb rounding.
#[inline]
pub(crate) fn zncc_score(dot: f64, tpl_norm: f64, patch_centered_sq: f64, eps: f64) -> f32 {
    let patch_norm = patch_centered_sq.max(0.0).sqrt();
    if tpl_norm < eps || patch_norm < eps {
        return 0.0;
    }
    let score = dot / (tpl_norm * patch_norm);
    if score.is_finite() {
        score.clamp(-1.0, 1.0) as f32
    } else {
        0.0
    }
}

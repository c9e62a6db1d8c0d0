//! Scalar reference kernel.

use crate::image::{ImageView, IntegralImage};
use crate::kernel::{placement_range, zncc_score, Kernel, ScanParams, ScoreMap};
use crate::template::TemplatePlan;
use crate::trace::trace_span;
use crate::util::TplCountResult;

/// Scalar ZNCC kernel; the reference every other backend is checked against.
pub struct ZnccScalar;

impl ZnccScalar {
    /// Zero-mean template dotted with the raw patch, accumulated row by row.
    #[inline]
    pub(crate) fn dot_at(frame: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f64 {
        let tpl_width = plan.width();
        let t_prime = plan.zero_mean();
        let mut dot = 0.0f64;
        for ty in 0..plan.height() {
            let Some(img_row) = frame.row(y + ty) else {
                break;
            };
            let tpl_row = &t_prime[ty * tpl_width..(ty + 1) * tpl_width];
            for (t, &value) in tpl_row.iter().zip(&img_row[x..x + tpl_width]) {
                dot += t * f64::from(value);
            }
        }
        dot
    }
}

impl Kernel for ZnccScalar {
    fn score_at(
        frame: ImageView<'_, u8>,
        integral: &IntegralImage,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
        params: ScanParams,
    ) -> f32 {
        let n = (plan.width() * plan.height()) as u64;
        let window = integral.window(x, y, plan.width(), plan.height());
        let dot = Self::dot_at(frame, plan, x, y);
        zncc_score(
            dot,
            plan.norm(),
            window.centered_sum_sq(n),
            params.norm_epsilon,
        )
    }

    fn score_map(
        frame: ImageView<'_, u8>,
        plan: &TemplatePlan,
        params: ScanParams,
    ) -> TplCountResult<ScoreMap> {
        let (map_width, map_height) = placement_range(frame, plan)?;
        let _span = trace_span!("score_map_scalar", width = map_width, height = map_height).entered();

        if plan.is_degenerate(params.norm_epsilon) {
            return Ok(ScoreMap::zeros(map_width, map_height));
        }

        let integral = IntegralImage::build(frame);
        let mut scores = Vec::with_capacity(map_width * map_height);
        for y in 0..map_height {
            for x in 0..map_width {
                scores.push(Self::score_at(frame, &integral, plan, x, y, params));
            }
        }
        Ok(ScoreMap::from_vec(scores, map_width, map_height))
    }
}

//! Rayon-parallel kernel (feature-gated).
//!
//! Rows of the score map are distributed across threads. Each cell is computed
//! with the scalar kernel's arithmetic, so the output is bit-identical to
//! `ZnccScalar` regardless of scheduling.

use crate::image::{ImageView, IntegralImage};
use crate::kernel::scalar::ZnccScalar;
use crate::kernel::{placement_range, Kernel, ScanParams, ScoreMap};
use crate::template::TemplatePlan;
use crate::trace::trace_span;
use crate::util::TplCountResult;
use rayon::prelude::*;

/// Row-parallel ZNCC kernel.
pub struct ZnccRayon;

impl Kernel for ZnccRayon {
    fn score_at(
        frame: ImageView<'_, u8>,
        integral: &IntegralImage,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
        params: ScanParams,
    ) -> f32 {
        ZnccScalar::score_at(frame, integral, plan, x, y, params)
    }

    fn score_map(
        frame: ImageView<'_, u8>,
        plan: &TemplatePlan,
        params: ScanParams,
    ) -> TplCountResult<ScoreMap> {
        let (map_width, map_height) = placement_range(frame, plan)?;
        let _span = trace_span!("score_map_rayon", width = map_width, height = map_height).entered();

        if plan.is_degenerate(params.norm_epsilon) {
            return Ok(ScoreMap::zeros(map_width, map_height));
        }

        let integral = IntegralImage::build(frame);
        let mut scores = vec![0.0f32; map_width * map_height];
        scores
            .par_chunks_mut(map_width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    *cell = ZnccScalar::score_at(frame, &integral, plan, x, y, params);
                }
            });
        Ok(ScoreMap::from_vec(scores, map_width, map_height))
    }
}

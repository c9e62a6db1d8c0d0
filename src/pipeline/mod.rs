//! Per-frame detection pipeline.
//!
//! For every template independently: dense ZNCC score map, threshold
//! extraction, box building, and greedy overlap suppression. Counts are summed
//! over templates and surviving boxes are tagged with their template index.
//! Boxes of different templates are never suppressed against each other.

use crate::candidate::bbox::BBox;
use crate::candidate::nms::{suppress_overlapping, DEFAULT_OVERLAP_THRESH};
use crate::candidate::threshold::extract_candidates;
use crate::image::ImageView;
#[cfg(feature = "rayon")]
use crate::kernel::rayon::ZnccRayon;
use crate::kernel::scalar::ZnccScalar;
#[cfg(feature = "simd")]
use crate::kernel::simd::ZnccSimd;
use crate::kernel::{Kernel, ScanParams, ScoreMap, DEFAULT_NORM_EPSILON};
use crate::template::{Template, TemplatePlan};
use crate::trace::{trace_event, trace_span};
use crate::util::{TplCountError, TplCountResult};

/// Score map backend selection.
///
/// Backends whose cargo feature is disabled fall back to `Scalar`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    /// Reference scalar kernel.
    #[default]
    Scalar,
    /// Row-parallel kernel (`rayon` feature); bit-identical to `Scalar`.
    Rayon,
    /// Vectorized kernel (`simd` feature).
    Simd,
}

/// Configuration for the frame pipeline.
#[derive(Clone, Debug)]
pub struct DetectionConfig {
    /// Suppression threshold on the compared-box overlap ratio.
    pub overlap_thresh: f64,
    /// Norm below which a template or patch scores zero.
    pub norm_epsilon: f64,
    /// Score map backend.
    pub backend: Backend,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            overlap_thresh: DEFAULT_OVERLAP_THRESH,
            norm_epsilon: DEFAULT_NORM_EPSILON,
            backend: Backend::Scalar,
        }
    }
}

impl DetectionConfig {
    fn validate(&self) -> TplCountResult<()> {
        if !self.overlap_thresh.is_finite() || self.overlap_thresh < 0.0 {
            return Err(TplCountError::InvalidConfig(
                "overlap_thresh must be finite and non-negative",
            ));
        }
        if !self.norm_epsilon.is_finite() || self.norm_epsilon <= 0.0 {
            return Err(TplCountError::InvalidConfig(
                "norm_epsilon must be finite and positive",
            ));
        }
        Ok(())
    }
}

/// A surviving box and the template that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detection {
    /// Box in frame coordinates.
    pub bbox: BBox,
    /// Index into the template list.
    pub template_index: usize,
}

/// Aggregated detections of one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineResult {
    /// Sum of the detection counts of all templates.
    pub total_count: usize,
    /// Surviving boxes, grouped by template in template order.
    pub detections: Vec<Detection>,
}

impl PipelineResult {
    /// Returns the number of detections reported for one template.
    pub fn count_for(&self, template_index: usize) -> usize {
        self.detections
            .iter()
            .filter(|d| d.template_index == template_index)
            .count()
    }
}

/// Matches a fixed template list against frames.
pub struct FrameDetector {
    plans: Vec<TemplatePlan>,
    cfg: DetectionConfig,
}

impl FrameDetector {
    /// Precomputes template plans with the default configuration.
    pub fn new(templates: &[Template]) -> Self {
        Self {
            plans: templates
                .iter()
                .map(|tpl| TemplatePlan::from_view(tpl.view()))
                .collect(),
            cfg: DetectionConfig::default(),
        }
    }

    /// Replaces the configuration after validating it.
    pub fn with_config(mut self, cfg: DetectionConfig) -> TplCountResult<Self> {
        cfg.validate()?;
        self.cfg = cfg;
        Ok(self)
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DetectionConfig {
        &self.cfg
    }

    /// Returns the number of templates.
    pub fn num_templates(&self) -> usize {
        self.plans.len()
    }

    /// Runs the pipeline on one frame at detection threshold `threshold`.
    pub fn detect(&self, frame: ImageView<'_, u8>, threshold: f32) -> TplCountResult<PipelineResult> {
        self.run(frame, threshold, |_| {})
    }

    /// Like [`FrameDetector::detect`], also returning each template's score map.
    pub fn detect_with_maps(
        &self,
        frame: ImageView<'_, u8>,
        threshold: f32,
    ) -> TplCountResult<(PipelineResult, Vec<ScoreMap>)> {
        let mut maps = Vec::with_capacity(self.plans.len());
        let result = self.run(frame, threshold, |map| maps.push(map.clone()))?;
        Ok((result, maps))
    }

    /// Score map of one template against `frame`.
    pub fn score_map(&self, frame: ImageView<'_, u8>, template_index: usize) -> TplCountResult<ScoreMap> {
        let plan = self
            .plans
            .get(template_index)
            .ok_or(TplCountError::InvalidConfig("template index out of range"))?;
        self.compute_map(frame, plan)
    }

    fn run<F>(&self, frame: ImageView<'_, u8>, threshold: f32, mut on_map: F) -> TplCountResult<PipelineResult>
    where
        F: FnMut(&ScoreMap),
    {
        if threshold.is_nan() {
            return Err(TplCountError::InvalidConfig("threshold must not be NaN"));
        }
        let _span = trace_span!("detect_frame", templates = self.plans.len(), threshold = threshold).entered();

        let mut result = PipelineResult::default();
        for (template_index, plan) in self.plans.iter().enumerate() {
            let map = self.compute_map(frame, plan)?;
            on_map(&map);

            let boxes: Vec<BBox> = extract_candidates(&map, threshold)
                .into_iter()
                .map(|c| BBox::from_anchor(c.x, c.y, plan.width(), plan.height()))
                .collect();
            let kept = suppress_overlapping(&boxes, self.cfg.overlap_thresh);
            trace_event!(
                "template_detections",
                template = template_index,
                candidates = boxes.len(),
                kept = kept.len()
            );

            result.total_count += kept.len();
            result.detections.extend(kept.into_iter().map(|bbox| Detection {
                bbox,
                template_index,
            }));
        }

        trace_event!("frame_detections", total = result.total_count);
        Ok(result)
    }

    fn compute_map(&self, frame: ImageView<'_, u8>, plan: &TemplatePlan) -> TplCountResult<ScoreMap> {
        let params = ScanParams {
            norm_epsilon: self.cfg.norm_epsilon,
        };
        match self.cfg.backend {
            #[cfg(feature = "rayon")]
            Backend::Rayon => ZnccRayon::score_map(frame, plan, params),
            #[cfg(feature = "simd")]
            Backend::Simd => ZnccSimd::score_map(frame, plan, params),
            _ => ZnccScalar::score_map(frame, plan, params),
        }
    }
}

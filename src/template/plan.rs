//! Template plan precomputation for ZNCC.

use crate::image::ImageView;

/// Precomputed zero-mean buffer and L2 norm of a template.
///
/// Plans are built once when the template list is fixed and reused for every
/// frame. A near-constant template is still a valid plan; it simply scores
/// zero everywhere.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    mean: f64,
    norm: f64,
    zero_mean: Vec<f64>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_, u8>) -> Self {
        let width = tpl.width();
        let height = tpl.height();
        let count = (width * height) as u64;

        let mut sum = 0u64;
        let mut sum_sq = 0u64;
        for row in tpl.rows() {
            for &value in row {
                let v = u64::from(value);
                sum += v;
                sum_sq += v * v;
            }
        }

        let mean = sum as f64 / count as f64;
        let n = u128::from(count);
        let centered =
            (n * u128::from(sum_sq) - u128::from(sum) * u128::from(sum)) as f64 / count as f64;
        let norm = centered.sqrt();

        let mut zero_mean = Vec::with_capacity(width * height);
        for row in tpl.rows() {
            zero_mean.extend(row.iter().map(|&value| f64::from(value) - mean));
        }

        Self {
            width,
            height,
            mean,
            norm,
            zero_mean,
        }
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the mean intensity of the template.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Returns the L2 norm of the zero-mean template.
    pub fn norm(&self) -> f64 {
        self.norm
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn zero_mean(&self) -> &[f64] {
        &self.zero_mean
    }

    /// Returns true when the norm is below `epsilon` and every score is zero.
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.norm < epsilon
    }
}

//! Summed-area tables for constant-time window statistics.
//!
//! Both tables have one extra leading row and column of zeros, so the sum of
//! the window `[x, x + w) x [y, y + h)` is
//! `s[y+h][x+w] - s[y][x+w] - s[y+h][x] + s[y][x]` without bounds special cases.
//! Values are accumulated as integers, which keeps window variances exact.

use crate::image::ImageView;

/// Integral image of pixel values and squared pixel values.
pub struct IntegralImage {
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
    width: usize,
    height: usize,
}

/// Sum and sum of squares of one window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSums {
    /// Sum of pixel values.
    pub sum: u64,
    /// Sum of squared pixel values.
    pub sum_sq: u64,
}

impl IntegralImage {
    /// Builds both tables in a single pass over the image.
    pub fn build(image: ImageView<'_, u8>) -> Self {
        let width = image.width();
        let height = image.height();
        let cols = width + 1;
        let mut sum = vec![0u64; cols * (height + 1)];
        let mut sum_sq = vec![0u64; cols * (height + 1)];

        for (y, row) in image.rows().enumerate() {
            let mut run = 0u64;
            let mut run_sq = 0u64;
            let above = y * cols;
            let here = (y + 1) * cols;
            for (x, &value) in row.iter().enumerate() {
                let v = u64::from(value);
                run += v;
                run_sq += v * v;
                sum[here + x + 1] = sum[above + x + 1] + run;
                sum_sq[here + x + 1] = sum_sq[above + x + 1] + run_sq;
            }
        }

        Self {
            sum,
            sum_sq,
            width,
            height,
        }
    }

    /// Returns the width of the source image.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the source image.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the sums over the `w x h` window anchored at `(x, y)`.
    ///
    /// The window must lie inside the source image.
    pub fn window(&self, x: usize, y: usize, w: usize, h: usize) -> WindowSums {
        debug_assert!(x + w <= self.width && y + h <= self.height);
        let cols = self.width + 1;
        let a = y * cols + x;
        let b = y * cols + x + w;
        let c = (y + h) * cols + x;
        let d = (y + h) * cols + x + w;
        WindowSums {
            sum: self.sum[d] + self.sum[a] - self.sum[b] - self.sum[c],
            sum_sq: self.sum_sq[d] + self.sum_sq[a] - self.sum_sq[b] - self.sum_sq[c],
        }
    }
}

impl WindowSums {
    /// Sum of squared deviations from the window mean, `n * var`.
    ///
    /// Computed as `(n * sum_sq - sum^2) / n` in integer arithmetic before the
    /// final division, so a constant window yields exactly zero.
    pub fn centered_sum_sq(&self, n: u64) -> f64 {
        let n = u128::from(n);
        let scaled = n * u128::from(self.sum_sq) - u128::from(self.sum) * u128::from(self.sum);
        scaled as f64 / n as f64
    }
}

//! Axis-aligned detection boxes.

/// Template placement as a box: top-left anchor plus template extent.
///
/// `x2 = x1 + w` and `y2 = y1 + h`, so the corners are not an inclusive pixel
/// range. Boxes are never clamped to the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BBox {
    /// Left edge.
    pub x1: usize,
    /// Top edge.
    pub y1: usize,
    /// Left edge plus template width.
    pub x2: usize,
    /// Top edge plus template height.
    pub y2: usize,
}

impl BBox {
    /// Creates a box from its corner coordinates.
    pub fn new(x1: usize, y1: usize, x2: usize, y2: usize) -> Self {
        debug_assert!(x1 <= x2 && y1 <= y2);
        Self { x1, y1, x2, y2 }
    }

    /// Builds the box of a `width x height` template anchored at `(x, y)`.
    pub fn from_anchor(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Horizontal extent, `x2 - x1`.
    pub fn width(&self) -> usize {
        self.x2 - self.x1
    }

    /// Vertical extent, `y2 - y1`.
    pub fn height(&self) -> usize {
        self.y2 - self.y1
    }

    /// Template-extent area, `width * height`.
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Area counting both corner rows and columns, `(w + 1) * (h + 1)`.
    ///
    /// This is the denominator of the suppression overlap ratio and uses the
    /// same inclusive convention as the intersection there.
    pub fn inclusive_area(&self) -> usize {
        (self.width() + 1) * (self.height() + 1)
    }
}

//! Owned contiguous grayscale buffers used for frames and templates.

use crate::image::ImageView;
use crate::util::{TplCountError, TplCountResult};

/// Owned contiguous grayscale image buffer (`stride == width`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps a row-major buffer of exactly `width * height` pixels.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> TplCountResult<Self> {
        if width == 0 || height == 0 {
            return Err(TplCountError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(TplCountError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(TplCountError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(TplCountError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates an image where every pixel has the same value.
    pub fn filled(width: usize, height: usize, value: u8) -> TplCountResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(TplCountError::InvalidDimensions { width, height })?;
        Self::new(vec![value; len], width, height)
    }

    /// Copies a (possibly strided) view into a contiguous buffer.
    pub fn from_view(view: ImageView<'_, u8>) -> TplCountResult<Self> {
        let mut data = Vec::with_capacity(view.width() * view.height());
        for y in 0..view.height() {
            let row = view.row(y).ok_or(TplCountError::BufferTooSmall {
                needed: y * view.stride() + view.width(),
                got: view.as_slice().len(),
            })?;
            data.extend_from_slice(row);
        }
        Self::new(data, view.width(), view.height())
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the row-major pixel buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image and returns its pixel buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::OwnedImage;
    use crate::image::ImageView;
    use crate::util::TplCountError;

    #[test]
    fn from_view_drops_stride_padding() {
        let data = [1u8, 2, 9, 3, 4, 9];
        let view = ImageView::new(&data, 2, 2, 3).unwrap();
        let owned = OwnedImage::from_view(view).unwrap();
        assert_eq!(owned.data(), &[1, 2, 3, 4]);
        assert_eq!(owned.view().stride(), 2);
    }

    #[test]
    fn new_rejects_oversized_buffer() {
        let err = OwnedImage::new(vec![0; 5], 2, 2).unwrap_err();
        assert_eq!(
            err,
            TplCountError::InvalidDimensions {
                width: 2,
                height: 2
            }
        );
    }
}

//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{ImageView, OwnedImage};
use crate::util::{TplCountError, TplCountResult};
use std::path::Path;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> TplCountResult<ImageView<'_, u8>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Converts a decoded image of any color type to an owned grayscale image.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> TplCountResult<OwnedImage> {
    let gray = img.to_luma8();
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    OwnedImage::new(gray.into_raw(), width, height)
}

/// Loads an image from disk and converts it to grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> TplCountResult<OwnedImage> {
    let img = image::open(path).map_err(|err| TplCountError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}

/// Writes a grayscale image; the format follows the file extension.
pub fn save_gray_image<P: AsRef<Path>>(path: P, img: ImageView<'_, u8>) -> TplCountResult<()> {
    let owned = OwnedImage::from_view(img)?;
    let buffer = image::GrayImage::from_raw(
        owned.width() as u32,
        owned.height() as u32,
        owned.into_vec(),
    )
    .ok_or(TplCountError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    buffer.save(path).map_err(|err| TplCountError::ImageIo {
        reason: err.to_string(),
    })
}

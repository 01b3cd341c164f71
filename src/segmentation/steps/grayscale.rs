use image::{DynamicImage, GrayImage};

/// Convert to 8-bit luminance; gray inputs pass through unchanged.
pub fn apply(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => other.to_luma8(),
    }
}

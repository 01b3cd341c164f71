use super::{denoise, grayscale, threshold};
use crate::config::SegmentOptions;
use crate::segmentation::types::BinaryMask;
use image::DynamicImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::erode;

/// Grayscale, optional blur, threshold, then optional whole-mask erosion.
///
/// A zero-width or zero-height image yields an empty mask.
pub fn binarize(image: &DynamicImage, options: &SegmentOptions) -> BinaryMask {
    if image.width() == 0 || image.height() == 0 {
        return BinaryMask::empty();
    }

    let gray = grayscale::apply(image);
    let smoothed = denoise::apply(gray, options.blur_kernel_size, options.blur_kind);
    let mask = threshold::apply(&smoothed, options);

    if options.mask_erosion == 0 {
        return mask;
    }

    // Thins strokes so digits fused by thresholding fall apart into separate components
    let eroded = erode(mask.as_image(), Norm::LInf, options.mask_erosion);
    BinaryMask::from_nonzero(&eroded)
}

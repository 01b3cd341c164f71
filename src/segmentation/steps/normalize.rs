use crate::config::{OutputPolarity, SegmentOptions};
use crate::error::SegmentError;
use crate::segmentation::types::{BoundingBox, NormalizedGlyph, Region};
use image::imageops::{self, FilterType};
use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};

/// Grow `bbox` by `padding` on every side, then clamp to `[0, width) x [0, height)`.
///
/// Glyphs near the border end up with less padding on that side. Negative
/// padding shrinks the box and may collapse it, which is reported as
/// `DegenerateRegion`.
pub fn clamp_padded_box(
    bbox: &BoundingBox,
    padding: i32,
    width: u32,
    height: u32,
) -> Result<BoundingBox, SegmentError> {
    let p = padding as i64;
    let left = (bbox.x as i64 - p).max(0);
    let top = (bbox.y as i64 - p).max(0);
    let right = (bbox.x as i64 + bbox.width as i64 + p).min(width as i64);
    let bottom = (bbox.y as i64 + bbox.height as i64 + p).min(height as i64);

    if right <= left || bottom <= top {
        return Err(SegmentError::DegenerateRegion {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        });
    }

    Ok(BoundingBox::new(
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

/// Crop one region out of `source`, clean it up and scale it to
/// `canonical_size` squared.
///
/// Morphology treats any non-zero pixel as ink, so `source` is expected to
/// be an ink-high image such as a `BinaryMask`. Resampling is bilinear and
/// fully deterministic.
pub fn normalize(
    region: &Region,
    source: &GrayImage,
    options: &SegmentOptions,
) -> Result<NormalizedGlyph, SegmentError> {
    let crop_box = clamp_padded_box(
        &region.bbox,
        options.padding,
        source.width(),
        source.height(),
    )?;

    let mut crop =
        imageops::crop_imm(source, crop_box.x, crop_box.y, crop_box.width, crop_box.height)
            .to_image();

    if options.morphology.dilates() {
        crop = dilate(&crop, Norm::LInf, options.morphology_radius);
    }
    if options.morphology.erodes() {
        crop = erode(&crop, Norm::LInf, options.morphology_radius);
    }
    if options.output_polarity == OutputPolarity::InkLow {
        imageops::invert(&mut crop);
    }

    let size = options.canonical_size;
    let pixels = imageops::resize(&crop, size, size, FilterType::Triangle);

    Ok(NormalizedGlyph {
        pixels,
        source_box: region.bbox,
        crop_box,
    })
}

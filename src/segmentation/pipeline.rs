use crate::config::SegmentOptions;
use crate::error::SegmentError;
use image::{DynamicImage, GrayImage};
use rayon::prelude::*;
use std::time::Instant;

use super::steps::{
    self, binarize::binarize, normalize::normalize, order::order_and_flag,
    regions::extract_regions,
};
use super::types::{
    AdjacencyFlag, Diagnostic, NormalizedGlyph, Region, SegmentationResult, StepTiming,
};

/// Validated options bound to a reusable, stateless segmenter
#[derive(Debug, Clone)]
pub struct Segmenter {
    options: SegmentOptions,
}

impl Segmenter {
    pub fn new(options: SegmentOptions) -> Result<Self, SegmentError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &SegmentOptions {
        &self.options
    }

    /// Segment an image: binarize, extract regions, order them, then normalize each.
    pub fn segment(&self, image: &DynamicImage) -> SegmentationResult {
        let start = Instant::now();
        let options = &self.options;
        let mut timings = Vec::new();

        if image.width() == 0 || image.height() == 0 {
            tracing::debug!("Empty input image, nothing to segment");
            return SegmentationResult::default();
        }

        let mask = run_step("binarize", &mut timings, || binarize(image, options));

        let regions = run_step("extract_regions", &mut timings, || {
            let mut regions = extract_regions(&mask);
            if options.min_region_area > 0 {
                let before = regions.len();
                regions.retain(|r| r.bbox.area() >= options.min_region_area as u64);
                tracing::debug!(
                    "Dropped {} regions below {} px",
                    before - regions.len(),
                    options.min_region_area
                );
            }
            regions
        });

        let ordered = run_step("order_and_flag", &mut timings, || {
            order_and_flag(regions, options.distance_threshold)
        });

        let outcomes = run_step("normalize", &mut timings, || {
            normalize_all(&ordered, mask.as_image(), options)
        });

        let mut result = SegmentationResult::default();
        for (index, ((region, flag), outcome)) in ordered.iter().zip(outcomes).enumerate() {
            match outcome {
                Ok(glyph) => {
                    // A skipped leader leaves the first survivor without a predecessor
                    let flag = *flag && !result.glyphs.is_empty();
                    result.glyphs.push(glyph);
                    result.adjacency.push(flag);
                }
                Err(err) => {
                    tracing::warn!("Skipping region {} at {:?}: {}", index, region.bbox, err);
                    result.diagnostics.push(Diagnostic {
                        region_index: index,
                        bbox: region.bbox,
                        code: err.code().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        if options.annotate {
            let boxes: Vec<_> = result.glyphs.iter().map(|g| g.crop_box).collect();
            result.annotated = Some(run_step("annotate", &mut timings, || {
                steps::annotate::apply(image, &boxes)
            }));
        }

        result.timings = timings;
        result.total_time_us = start.elapsed().as_micros() as u64;

        tracing::info!(
            "Segmented {} glyphs ({} skipped) in {}us",
            result.len(),
            result.diagnostics.len(),
            result.total_time_us
        );
        result
    }
}

/// Validate `options`, then segment `image`.
///
/// Only invalid options fail; anything about the image content is absorbed
/// into an empty result or per-region diagnostics.
pub fn segment(
    image: &DynamicImage,
    options: &SegmentOptions,
) -> Result<SegmentationResult, SegmentError> {
    Ok(Segmenter::new(options.clone())?.segment(image))
}

/// Normalize every region, fanning out to rayon above `parallel_threshold`.
/// Output order always matches `ordered`.
fn normalize_all(
    ordered: &[(Region, AdjacencyFlag)],
    source: &GrayImage,
    options: &SegmentOptions,
) -> Vec<Result<NormalizedGlyph, SegmentError>> {
    if ordered.len() <= options.parallel_threshold {
        ordered
            .iter()
            .map(|(region, _)| normalize(region, source, options))
            .collect()
    } else {
        ordered
            .par_iter()
            .map(|(region, _)| normalize(region, source, options))
            .collect()
    }
}

fn run_step<T, F>(name: &str, timings: &mut Vec<StepTiming>, step_fn: F) -> T
where
    F: FnOnce() -> T,
{
    let step_start = Instant::now();
    let result = step_fn();
    let time_us = step_start.elapsed().as_micros() as u64;
    tracing::debug!("{} took {}us", name, time_us);
    timings.push(StepTiming {
        name: name.to_string(),
        time_us,
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdMode;
    use image::{GrayImage, Luma};

    fn digits_image(xs: &[u32]) -> DynamicImage {
        let mut img = GrayImage::from_pixel(200, 50, Luma([255]));
        for &x0 in xs {
            for y in 10..20 {
                for x in x0..x0 + 10 {
                    img.put_pixel(x, y, Luma([0]));
                }
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_invalid_options_fail_before_processing() {
        let options = SegmentOptions {
            threshold_mode: ThresholdMode::Fixed,
            threshold_value: None,
            ..Default::default()
        };
        let result = segment(&digits_image(&[10]), &options);
        assert!(matches!(result, Err(SegmentError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_records_a_timing_per_stage() {
        let options = SegmentOptions {
            annotate: true,
            ..Default::default()
        };
        let result = segment(&digits_image(&[10, 40]), &options).unwrap();
        let names: Vec<_> = result.timings.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["binarize", "extract_regions", "order_and_flag", "normalize", "annotate"]
        );
        assert!(result.annotated.is_some());
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let image = digits_image(&[5, 25, 45, 65, 85, 105, 125, 145, 165]);
        let sequential = SegmentOptions {
            parallel_threshold: usize::MAX,
            ..Default::default()
        };
        let parallel = SegmentOptions {
            parallel_threshold: 0,
            ..Default::default()
        };
        let a = segment(&image, &sequential).unwrap();
        let b = segment(&image, &parallel).unwrap();
        assert_eq!(a.len(), 9);
        assert_eq!(a.glyphs, b.glyphs);
        assert_eq!(a.adjacency, b.adjacency);
    }

    #[test]
    fn test_min_region_area_drops_specks() {
        let mut img = digits_image(&[10, 40]).to_luma8();
        img.put_pixel(100, 40, Luma([0]));
        let image = DynamicImage::ImageLuma8(img);

        let all = segment(&image, &SegmentOptions::default()).unwrap();
        assert_eq!(all.len(), 3);

        let options = SegmentOptions {
            min_region_area: 4,
            ..Default::default()
        };
        let filtered = segment(&image, &options).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_segmenter_is_reusable() {
        let segmenter = Segmenter::new(SegmentOptions::default()).unwrap();
        let first = segmenter.segment(&digits_image(&[10]));
        let second = segmenter.segment(&digits_image(&[10, 40, 70]));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 3);
        assert_eq!(segmenter.options().canonical_size, 28);
    }
}

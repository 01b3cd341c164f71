//! Digit segmentation: mask, regions, ordering and glyph normalization
//!
//! Data flows strictly forward; every stage returns a fresh value.

pub mod pipeline;
pub mod steps;
pub mod types;

pub use pipeline::{segment, Segmenter};
pub use steps::binarize::binarize;
pub use steps::normalize::{clamp_padded_box, normalize};
pub use steps::order::order_and_flag;
pub use steps::regions::extract_regions;
pub use types::{
    raster_from_raw, AdjacencyFlag, BinaryMask, BoundingBox, Diagnostic, NormalizedGlyph,
    Region, SegmentationResult, SegmentationSummary, StepTiming,
};

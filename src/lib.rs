//! Handwritten digit segmentation.
//!
//! Turns a photo of a single line of handwritten digits into left-to-right
//! ordered, canonical-size glyph bitmaps plus adjacency metadata, ready for
//! any `DigitClassifier`.

pub mod classifier;
pub mod config;
pub mod error;
pub mod segmentation;

pub use classifier::{classify_result, DigitClassifier, Prediction};
pub use config::{
    BlurKind, Ink, Morphology, OutputPolarity, Preset, SegmentOptions, ThresholdMode,
    DEFAULT_CANONICAL_SIZE,
};
pub use error::SegmentError;
pub use segmentation::{
    binarize, extract_regions, normalize, order_and_flag, raster_from_raw, segment,
    AdjacencyFlag, BinaryMask, BoundingBox, NormalizedGlyph, Region, SegmentationResult,
    Segmenter,
};

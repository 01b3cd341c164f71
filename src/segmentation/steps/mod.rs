//! Individual segmentation stages

pub mod annotate;
pub mod binarize;
pub mod denoise;
pub mod grayscale;
pub mod normalize;
pub mod order;
pub mod regions;
pub mod threshold;

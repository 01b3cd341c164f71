//! Segmentation options and named presets.

use crate::error::SegmentError;
use serde::{Deserialize, Serialize};

/// Side length MNIST-style classifiers expect.
pub const DEFAULT_CANONICAL_SIZE: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Caller-supplied cutoff in `threshold_value`
    Fixed,
    /// Otsu cutoff picked from the image histogram
    #[default]
    Automatic,
    /// Sauvola local threshold, for unevenly lit photos
    Adaptive,
}

/// Which tone the ink has in the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ink {
    /// Dark ink on light paper
    #[default]
    Dark,
    /// Light ink on a dark background
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurKind {
    #[default]
    Gaussian,
    Median,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Morphology {
    #[default]
    None,
    Dilate,
    Erode,
    /// Dilate, then erode
    Both,
}

impl Morphology {
    pub fn dilates(&self) -> bool {
        matches!(self, Self::Dilate | Self::Both)
    }

    pub fn erodes(&self) -> bool {
        matches!(self, Self::Erode | Self::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPolarity {
    /// Ink is bright on a black background (MNIST convention)
    #[default]
    InkHigh,
    /// Ink is dark on a white background
    InkLow,
}

/// Named option profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// `SegmentOptions::default()`
    #[default]
    Default,
    /// Only pure black counts as ink, tight crops
    Plain,
    /// Otsu threshold, 20px padding, dilated strokes
    Padded,
    /// Heavy blur and wide padding for large photographs
    Clustered,
    /// Mask erosion to split touching digits, 10px padding
    Separated,
}

impl Preset {
    /// Parse from a CLI or config string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "plain" => Some(Self::Plain),
            "padded" => Some(Self::Padded),
            "clustered" => Some(Self::Clustered),
            "separated" => Some(Self::Separated),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Plain => "plain",
            Self::Padded => "padded",
            Self::Clustered => "clustered",
            Self::Separated => "separated",
        }
    }

    pub fn options(&self) -> SegmentOptions {
        let base = SegmentOptions::default();
        match self {
            Self::Default => base,
            Self::Plain => SegmentOptions {
                threshold_mode: ThresholdMode::Fixed,
                threshold_value: Some(0),
                ..base
            },
            Self::Padded => SegmentOptions {
                padding: 20,
                morphology: Morphology::Dilate,
                ..base
            },
            Self::Clustered => SegmentOptions {
                blur_kernel_size: Some(25),
                padding: 100,
                distance_threshold: 1000.0,
                ..base
            },
            Self::Separated => SegmentOptions {
                mask_erosion: 1,
                padding: 10,
                distance_threshold: 80.0,
                ..base
            },
        }
    }
}

/// Every knob of one `segment` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentOptions {
    pub threshold_mode: ThresholdMode,
    /// Used iff `threshold_mode` is `Fixed`
    pub threshold_value: Option<u8>,
    /// Sauvola window side, odd
    pub adaptive_window: u32,
    /// Sauvola sensitivity
    pub adaptive_k: f32,
    pub ink: Ink,
    /// Odd kernel side; `None` or 1 disables smoothing
    pub blur_kernel_size: Option<u32>,
    pub blur_kind: BlurKind,
    /// Erosion radius applied to the whole mask before region extraction (0 = off)
    pub mask_erosion: u8,
    /// Regions whose box area is below this are dropped (0 = keep all)
    pub min_region_area: u32,
    pub padding: i32,
    pub distance_threshold: f32,
    pub morphology: Morphology,
    pub morphology_radius: u8,
    pub output_polarity: OutputPolarity,
    pub canonical_size: u32,
    /// Draw crop boxes onto a copy of the source
    pub annotate: bool,
    /// Region count above which normalization runs on the rayon pool
    pub parallel_threshold: usize,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            threshold_mode: ThresholdMode::Automatic,
            threshold_value: None,
            adaptive_window: 15,
            adaptive_k: 0.2,
            ink: Ink::Dark,
            blur_kernel_size: None,
            blur_kind: BlurKind::Gaussian,
            mask_erosion: 0,
            min_region_area: 0,
            padding: 0,
            distance_threshold: 50.0,
            morphology: Morphology::None,
            morphology_radius: 1,
            output_polarity: OutputPolarity::InkHigh,
            canonical_size: DEFAULT_CANONICAL_SIZE,
            annotate: false,
            parallel_threshold: 4,
        }
    }
}

impl From<Preset> for SegmentOptions {
    fn from(preset: Preset) -> Self {
        preset.options()
    }
}

impl SegmentOptions {
    /// Reject option combinations before any image work starts.
    pub fn validate(&self) -> Result<(), SegmentError> {
        let invalid = |msg: String| Err(SegmentError::InvalidConfiguration(msg));

        if self.threshold_mode == ThresholdMode::Fixed && self.threshold_value.is_none() {
            return invalid("fixed threshold mode requires threshold_value".to_string());
        }
        if self.threshold_mode == ThresholdMode::Adaptive {
            if self.adaptive_window < 3 || self.adaptive_window % 2 == 0 {
                return invalid(format!(
                    "adaptive_window must be odd and >= 3, got {}",
                    self.adaptive_window
                ));
            }
            if !self.adaptive_k.is_finite() {
                return invalid("adaptive_k must be finite".to_string());
            }
        }
        if let Some(k) = self.blur_kernel_size {
            if k == 0 || k % 2 == 0 {
                return invalid(format!("blur_kernel_size must be odd, got {}", k));
            }
        }
        if self.padding < 0 {
            return invalid(format!("padding must be >= 0, got {}", self.padding));
        }
        if !self.distance_threshold.is_finite() || self.distance_threshold < 0.0 {
            return invalid(format!(
                "distance_threshold must be a non-negative number, got {}",
                self.distance_threshold
            ));
        }
        if self.canonical_size == 0 {
            return invalid("canonical_size must be positive".to_string());
        }
        if self.morphology != Morphology::None && self.morphology_radius == 0 {
            return invalid("morphology_radius must be positive when morphology is on".to_string());
        }
        Ok(())
    }
}

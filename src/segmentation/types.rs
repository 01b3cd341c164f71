use crate::error::SegmentError;
use image::{DynamicImage, GrayImage, Luma, RgbImage};
use imageproc::point::Point;
use serde::Serialize;

/// Wrap a raw interleaved 8-bit buffer as an image.
///
/// `channels` must be 1 (gray) or 3 (RGB), and the buffer must hold exactly
/// `width * height * channels` bytes.
pub fn raster_from_raw(
    width: u32,
    height: u32,
    channels: u8,
    bytes: Vec<u8>,
) -> Result<DynamicImage, SegmentError> {
    let expected = width as usize * height as usize * channels as usize;
    if bytes.len() != expected {
        return Err(SegmentError::InvalidBuffer(format!(
            "{}x{}x{} needs {} bytes, got {}",
            width,
            height,
            channels,
            expected,
            bytes.len()
        )));
    }

    let image = match channels {
        1 => GrayImage::from_raw(width, height, bytes).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, bytes).map(DynamicImage::ImageRgb8),
        other => {
            return Err(SegmentError::InvalidBuffer(format!(
                "unsupported channel count {}",
                other
            )))
        }
    };
    image.ok_or_else(|| {
        SegmentError::InvalidBuffer("buffer does not match dimensions".to_string())
    })
}

/// Whether a region sits within `distance_threshold` of its predecessor.
pub type AdjacencyFlag = bool;

/// Axis-aligned box in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge, widened so huge boxes cannot overflow
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    pub fn center_distance(&self, other: &BoundingBox) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.right() <= width as u64
            && self.bottom() <= height as u64
    }
}

/// Two-valued image: 255 is ink, 0 is background.
///
/// Dimensions always equal those of the grayscale image it was thresholded from.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask(GrayImage);

impl BinaryMask {
    pub const INK: u8 = 255;
    pub const BACKGROUND: u8 = 0;

    pub fn empty() -> Self {
        Self(GrayImage::new(0, 0))
    }

    pub fn from_fn<F>(width: u32, height: u32, is_ink: F) -> Self
    where
        F: Fn(u32, u32) -> bool,
    {
        Self(GrayImage::from_fn(width, height, |x, y| {
            if is_ink(x, y) {
                Luma([Self::INK])
            } else {
                Luma([Self::BACKGROUND])
            }
        }))
    }

    /// Wrap a grayscale image, mapping any non-zero pixel to ink.
    pub fn from_nonzero(image: &GrayImage) -> Self {
        Self::from_fn(image.width(), image.height(), |x, y| {
            image.get_pixel(x, y).0[0] != 0
        })
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y).0[0] == Self::INK
    }

    pub fn ink_count(&self) -> usize {
        self.0.pixels().filter(|p| p.0[0] == Self::INK).count()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_image(self) -> GrayImage {
        self.0
    }
}

/// One outer-bounded connected ink component.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub bbox: BoundingBox,
    /// Outer boundary, in tracing order
    pub contour: Vec<Point<u32>>,
}

impl Region {
    /// Box spanning the contour points; `None` for an empty contour.
    pub fn from_contour(contour: Vec<Point<u32>>) -> Option<Self> {
        let first = contour.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &contour {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        // Pixel-inclusive extent
        let bbox = BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1);
        if bbox.width == 0 || bbox.height == 0 {
            return None;
        }
        Some(Self { bbox, contour })
    }
}

/// Canonical square bitmap cut from a single region.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGlyph {
    pub pixels: GrayImage,
    /// Region box before padding
    pub source_box: BoundingBox,
    /// Padded box after clamping to the source image
    pub crop_box: BoundingBox,
}

impl NormalizedGlyph {
    pub fn size(&self) -> u32 {
        self.pixels.width()
    }

    /// Row-major bytes, `size * size` long
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Flattened pixels scaled to [0, 1], the input layout of an MNIST-trained model.
    pub fn to_features(&self) -> Vec<f32> {
        self.pixels
            .as_raw()
            .iter()
            .map(|&v| v as f32 / 255.0)
            .collect()
    }
}

/// A region that was skipped instead of normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Position in left-to-right order, before skipping
    pub region_index: usize,
    pub bbox: BoundingBox,
    pub code: String,
    pub message: String,
}

/// Timing information for a single segmentation stage
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_us: u64,
}

/// Ordered glyphs of one image and their metadata.
#[derive(Debug, Clone, Default)]
pub struct SegmentationResult {
    pub glyphs: Vec<NormalizedGlyph>,
    /// Parallel to `glyphs`
    pub adjacency: Vec<AdjacencyFlag>,
    pub diagnostics: Vec<Diagnostic>,
    /// Source copy with crop boxes drawn, when requested
    pub annotated: Option<RgbImage>,
    pub timings: Vec<StepTiming>,
    pub total_time_us: u64,
}

impl SegmentationResult {
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NormalizedGlyph, AdjacencyFlag)> {
        self.glyphs.iter().zip(self.adjacency.iter().copied())
    }

    pub fn boxes(&self) -> Vec<BoundingBox> {
        self.glyphs.iter().map(|g| g.source_box).collect()
    }

    pub fn summary(&self) -> SegmentationSummary {
        SegmentationSummary {
            glyphs: self
                .iter()
                .enumerate()
                .map(|(index, (glyph, adjacent))| GlyphSummary {
                    index,
                    bbox: glyph.source_box,
                    crop_box: glyph.crop_box,
                    adjacent,
                })
                .collect(),
            diagnostics: self.diagnostics.clone(),
            total_time_us: self.total_time_us,
            steps: self.timings.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GlyphSummary {
    pub index: usize,
    pub bbox: BoundingBox,
    pub crop_box: BoundingBox,
    pub adjacent: AdjacencyFlag,
}

/// Serializable view of a `SegmentationResult` without pixel data.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentationSummary {
    pub glyphs: Vec<GlyphSummary>,
    pub diagnostics: Vec<Diagnostic>,
    pub total_time_us: u64,
    pub steps: Vec<StepTiming>,
}

use crate::config::{Ink, SegmentOptions, ThresholdMode};
use crate::segmentation::types::BinaryMask;
use image::{imageops, GrayImage};
use imageproc::contrast::otsu_level;

/// Dynamic range of the standard deviation for 8-bit images
const R: f32 = 128.0;

/// Split a grayscale image into ink and background.
///
/// `Fixed` and `Automatic` compare every pixel against one global cutoff;
/// `Adaptive` computes a Sauvola cutoff per pixel.
pub fn apply(gray: &GrayImage, options: &SegmentOptions) -> BinaryMask {
    if gray.width() == 0 || gray.height() == 0 {
        return BinaryMask::empty();
    }

    match options.threshold_mode {
        ThresholdMode::Fixed => {
            // Checked by SegmentOptions::validate; a bare call falls back to Otsu
            let cutoff = options.threshold_value.unwrap_or_else(|| otsu_level(gray));
            global_threshold(gray, cutoff, options.ink)
        }
        ThresholdMode::Automatic => {
            let cutoff = otsu_level(gray);
            tracing::debug!("Otsu cutoff: {}", cutoff);
            global_threshold(gray, cutoff, options.ink)
        }
        ThresholdMode::Adaptive => match options.ink {
            Ink::Dark => sauvola_threshold(gray, options.adaptive_window, options.adaptive_k),
            Ink::Light => {
                // Sauvola cutoffs sit below the local mean, so only dark ink works directly
                let mut inverted = gray.clone();
                imageops::invert(&mut inverted);
                sauvola_threshold(&inverted, options.adaptive_window, options.adaptive_k)
            }
        },
    }
}

fn is_ink(value: f32, cutoff: f32, ink: Ink) -> bool {
    match ink {
        Ink::Dark => value <= cutoff,
        Ink::Light => value > cutoff,
    }
}

fn global_threshold(gray: &GrayImage, cutoff: u8, ink: Ink) -> BinaryMask {
    BinaryMask::from_fn(gray.width(), gray.height(), |x, y| {
        is_ink(gray.get_pixel(x, y).0[0] as f32, cutoff as f32, ink)
    })
}

/// Sauvola adaptive thresholding
///
/// For each pixel, threshold = mean * (1 + k * (std_dev / R - 1)); pixels at
/// or below it are ink.
fn sauvola_threshold(img: &GrayImage, window_size: u32, k: f32) -> BinaryMask {
    let (width, height) = img.dimensions();
    let half_window = window_size as i32 / 2;

    let (integral, integral_sq) = compute_integral_images(img);

    BinaryMask::from_fn(width, height, |x, y| {
        let x1 = (x as i32 - half_window).max(0) as u32;
        let y1 = (y as i32 - half_window).max(0) as u32;
        let x2 = (x as i32 + half_window).min(width as i32 - 1) as u32;
        let y2 = (y as i32 + half_window).min(height as i32 - 1) as u32;

        let (mean, std_dev) = window_stats(&integral, &integral_sq, x1, y1, x2, y2);
        let threshold = mean * (1.0 + k * (std_dev / R - 1.0));

        is_ink(img.get_pixel(x, y).0[0] as f32, threshold, Ink::Dark)
    })
}

/// Integral image and integral of squared values, one row/column larger than the source
fn compute_integral_images(img: &GrayImage) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let (width, height) = img.dimensions();
    let mut integral = vec![vec![0.0f64; width as usize + 1]; height as usize + 1];
    let mut integral_sq = vec![vec![0.0f64; width as usize + 1]; height as usize + 1];

    for y in 0..height as usize {
        for x in 0..width as usize {
            let val = img.get_pixel(x as u32, y as u32).0[0] as f64;
            integral[y + 1][x + 1] =
                val + integral[y][x + 1] + integral[y + 1][x] - integral[y][x];
            integral_sq[y + 1][x + 1] =
                val * val + integral_sq[y][x + 1] + integral_sq[y + 1][x] - integral_sq[y][x];
        }
    }

    (integral, integral_sq)
}

/// Mean and standard deviation over the inclusive window (x1, y1)..=(x2, y2)
fn window_stats(
    integral: &[Vec<f64>],
    integral_sq: &[Vec<f64>],
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
) -> (f32, f32) {
    let (x1, y1, x2, y2) = (x1 as usize, y1 as usize, x2 as usize + 1, y2 as usize + 1);
    let area = ((x2 - x1) * (y2 - y1)) as f64;

    let sum = integral[y2][x2] - integral[y1][x2] - integral[y2][x1] + integral[y1][x1];
    let sum_sq =
        integral_sq[y2][x2] - integral_sq[y1][x2] - integral_sq[y2][x1] + integral_sq[y1][x1];

    let mean = sum / area;
    let variance = (sum_sq / area) - (mean * mean);
    let std_dev = variance.max(0.0).sqrt();

    (mean as f32, std_dev as f32)
}

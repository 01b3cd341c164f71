use crate::config::BlurKind;
use image::GrayImage;
use imageproc::filter::{gaussian_blur_f32, median_filter};

/// Gaussian sigma for an odd kernel side, using the usual `0.3*((k-1)/2-1)+0.8` rule
pub fn sigma_for_kernel(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Smooth sensor noise before thresholding.
/// A missing or 1-pixel kernel returns the input untouched.
pub fn apply(gray: GrayImage, kernel_size: Option<u32>, kind: BlurKind) -> GrayImage {
    let kernel_size = match kernel_size {
        Some(k) if k > 1 => k,
        _ => return gray,
    };
    if gray.width() == 0 || gray.height() == 0 {
        return gray;
    }

    match kind {
        BlurKind::Gaussian => gaussian_blur_f32(&gray, sigma_for_kernel(kernel_size)),
        BlurKind::Median => {
            // Median preserves stroke edges better than Gaussian blur
            let radius = kernel_size / 2;
            median_filter(&gray, radius, radius)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn calculate_variance(img: &GrayImage) -> f64 {
        let pixels: Vec<f64> = img.pixels().map(|p| p.0[0] as f64).collect();
        let mean = pixels.iter().sum::<f64>() / pixels.len() as f64;
        pixels.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / pixels.len() as f64
    }

    fn noisy() -> GrayImage {
        let mut img = GrayImage::from_pixel(10, 10, Luma([128]));
        img.put_pixel(5, 5, Luma([0]));
        img.put_pixel(6, 5, Luma([255]));
        img
    }

    #[test]
    fn test_median_reduces_salt_pepper_noise() {
        let img = noisy();
        let result = apply(img.clone(), Some(3), BlurKind::Median);
        assert!(calculate_variance(&result) <= calculate_variance(&img));
        assert_eq!(result.get_pixel(5, 5).0[0], 128);
    }

    #[test]
    fn test_gaussian_reduces_variance() {
        let img = noisy();
        let result = apply(img.clone(), Some(5), BlurKind::Gaussian);
        assert_eq!(result.dimensions(), img.dimensions());
        assert!(calculate_variance(&result) < calculate_variance(&img));
    }

    #[test]
    fn test_no_kernel_is_identity() {
        let img = noisy();
        assert_eq!(apply(img.clone(), None, BlurKind::Gaussian), img);
        assert_eq!(apply(img.clone(), Some(1), BlurKind::Median), img);
    }

    #[test]
    fn test_sigma_for_kernel() {
        assert!((sigma_for_kernel(3) - 0.8).abs() < 1e-6);
        assert!((sigma_for_kernel(25) - 4.1).abs() < 1e-4);
    }
}

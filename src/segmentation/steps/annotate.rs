use crate::segmentation::types::BoundingBox;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// RGB copy of `image` with a 2px green outline around every box.
pub fn apply(image: &DynamicImage, boxes: &[BoundingBox]) -> RgbImage {
    let mut canvas = image.to_rgb8();
    for bbox in boxes {
        if bbox.width == 0 || bbox.height == 0 {
            continue;
        }
        let rect = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height);
        draw_hollow_rect_mut(&mut canvas, rect, BOX_COLOR);

        if bbox.width > 2 && bbox.height > 2 {
            let inner = Rect::at(bbox.x as i32 + 1, bbox.y as i32 + 1)
                .of_size(bbox.width - 2, bbox.height - 2);
            draw_hollow_rect_mut(&mut canvas, inner, BOX_COLOR);
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_draws_two_pixel_outline() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(40, 40, Luma([255])));
        let canvas = apply(&img, &[BoundingBox::new(5, 5, 10, 10)]);

        assert_eq!(canvas.dimensions(), (40, 40));
        assert_eq!(*canvas.get_pixel(5, 5), BOX_COLOR);
        assert_eq!(*canvas.get_pixel(6, 9), BOX_COLOR);
        assert_eq!(*canvas.get_pixel(14, 14), BOX_COLOR);
        assert_eq!(*canvas.get_pixel(10, 10), Rgb([255, 255, 255]));
        assert_eq!(*canvas.get_pixel(30, 30), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_no_boxes_is_plain_copy() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([9])));
        let canvas = apply(&img, &[]);
        assert!(canvas.pixels().all(|p| *p == Rgb([9, 9, 9])));
    }
}

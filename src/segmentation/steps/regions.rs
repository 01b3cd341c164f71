use crate::segmentation::types::{BinaryMask, Region};
use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

/// Outermost connected ink components of a mask, in tracing order.
///
/// Hole borders and components nested inside holes are ignored, so a
/// digit like `0` or `8` comes back as one region.
pub fn extract_regions(mask: &BinaryMask) -> Vec<Region> {
    if mask.is_empty() {
        return Vec::new();
    }

    // Components touching the image edge are only traced as outer borders
    // when surrounded by background, so trace on a copy with a 1px margin.
    let mut framed = GrayImage::new(mask.width() + 2, mask.height() + 2);
    imageops::replace(&mut framed, mask.as_image(), 1, 1);

    let contours = find_contours::<u32>(&framed);
    let total = contours.len();

    let regions: Vec<Region> = contours
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| {
            let points = c
                .points
                .into_iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();
            Region::from_contour(points)
        })
        .collect();

    debug_assert!(regions
        .iter()
        .all(|r| r.bbox.fits_within(mask.width(), mask.height())));

    tracing::debug!(
        "Found {} outer regions among {} contours",
        regions.len(),
        total
    );
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::types::BoundingBox;

    fn mask_with_rects(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> BinaryMask {
        BinaryMask::from_fn(width, height, |x, y| {
            rects
                .iter()
                .any(|&(rx, ry, rw, rh)| x >= rx && x < rx + rw && y >= ry && y < ry + rh)
        })
    }

    #[test]
    fn test_all_background_has_no_regions() {
        let mask = BinaryMask::from_fn(40, 20, |_, _| false);
        assert!(extract_regions(&mask).is_empty());
        assert!(extract_regions(&BinaryMask::empty()).is_empty());
    }

    #[test]
    fn test_two_squares_give_two_boxes() {
        let mask = mask_with_rects(100, 50, &[(10, 10, 10, 10), (40, 10, 10, 10)]);
        let mut boxes: Vec<_> = extract_regions(&mask).iter().map(|r| r.bbox).collect();
        boxes.sort_by_key(|b| b.x);
        assert_eq!(
            boxes,
            vec![BoundingBox::new(10, 10, 10, 10), BoundingBox::new(40, 10, 10, 10)]
        );
    }

    #[test]
    fn test_ring_is_a_single_region() {
        // Hollow square with a dot inside the hole
        let mask = BinaryMask::from_fn(30, 30, |x, y| {
            let on_frame = (5..25).contains(&x)
                && (5..25).contains(&y)
                && !((8..22).contains(&x) && (8..22).contains(&y));
            let dot = (14..16).contains(&x) && (14..16).contains(&y);
            on_frame || dot
        });
        let regions = extract_regions(&mask);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bbox.width, 20);
        assert_eq!(regions[0].bbox.height, 20);
    }

    #[test]
    fn test_component_touching_border_stays_in_bounds() {
        let mask = mask_with_rects(20, 20, &[(0, 0, 5, 20), (15, 3, 5, 4)]);
        let regions = extract_regions(&mask);
        assert_eq!(regions.len(), 2);
        for region in &regions {
            assert!(region.bbox.fits_within(20, 20));
            assert!(!region.contour.is_empty());
        }
    }

    #[test]
    fn test_left_edge_glyph_does_not_hide_later_glyphs() {
        let mask = mask_with_rects(40, 20, &[(0, 2, 4, 10), (12, 0, 5, 5), (25, 8, 6, 6)]);
        let mut boxes: Vec<_> = extract_regions(&mask).iter().map(|r| r.bbox).collect();
        boxes.sort_by_key(|b| b.x);
        assert_eq!(
            boxes,
            vec![
                BoundingBox::new(0, 2, 4, 10),
                BoundingBox::new(12, 0, 5, 5),
                BoundingBox::new(25, 8, 6, 6),
            ]
        );
    }

    #[test]
    fn test_edge_touching_masks_keep_their_region() {
        let cases = [
            (mask_with_rects(20, 20, &[(0, 8, 20, 3)]), BoundingBox::new(0, 8, 20, 3)),
            (mask_with_rects(20, 20, &[(0, 0, 5, 5)]), BoundingBox::new(0, 0, 5, 5)),
            (mask_with_rects(20, 20, &[(0, 0, 1, 1)]), BoundingBox::new(0, 0, 1, 1)),
            (mask_with_rects(20, 20, &[(0, 0, 20, 20)]), BoundingBox::new(0, 0, 20, 20)),
        ];
        for (mask, expected) in cases {
            let regions = extract_regions(&mask);
            assert_eq!(regions.len(), 1);
            assert_eq!(regions[0].bbox, expected);
        }
    }

    #[test]
    fn test_diagonal_neighbours_are_connected() {
        let mask = BinaryMask::from_fn(10, 10, |x, y| x == y);
        let regions = extract_regions(&mask);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bbox.width, 10);
    }
}

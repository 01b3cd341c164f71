use crate::segmentation::types::{AdjacencyFlag, Region};

/// Sort regions left to right (ties by top edge) and flag each one whose
/// box center lies within `distance_threshold` of its predecessor's.
///
/// The first region has no predecessor, so its flag is always `false`.
/// Flags are metadata only; nothing is merged or split here.
pub fn order_and_flag(
    mut regions: Vec<Region>,
    distance_threshold: f32,
) -> Vec<(Region, AdjacencyFlag)> {
    regions.sort_by_key(|r| (r.bbox.x, r.bbox.y));

    let mut ordered: Vec<(Region, AdjacencyFlag)> = Vec::with_capacity(regions.len());
    for region in regions {
        let near = ordered
            .last()
            .map(|(prev, _)| region.bbox.center_distance(&prev.bbox) <= distance_threshold)
            .unwrap_or(false);
        ordered.push((region, near));
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::types::BoundingBox;

    fn region(x: u32, y: u32, w: u32, h: u32) -> Region {
        Region {
            bbox: BoundingBox::new(x, y, w, h),
            contour: Vec::new(),
        }
    }

    #[test]
    fn test_sorts_by_left_edge_then_top() {
        let regions = vec![region(40, 10, 5, 5), region(10, 30, 5, 5), region(10, 2, 5, 5)];
        let ordered = order_and_flag(regions, 0.0);
        let edges: Vec<_> = ordered.iter().map(|(r, _)| (r.bbox.x, r.bbox.y)).collect();
        assert_eq!(edges, vec![(10, 2), (10, 30), (40, 10)]);
    }

    #[test]
    fn test_flags_follow_threshold() {
        let regions = vec![region(40, 10, 10, 10), region(10, 10, 10, 10)];

        let near: Vec<_> = order_and_flag(regions.clone(), 50.0)
            .into_iter()
            .map(|(_, f)| f)
            .collect();
        assert_eq!(near, vec![false, true]);

        let far: Vec<_> = order_and_flag(regions, 20.0)
            .into_iter()
            .map(|(_, f)| f)
            .collect();
        assert_eq!(far, vec![false, false]);
    }

    #[test]
    fn test_distance_equal_to_threshold_is_near() {
        let regions = vec![region(0, 0, 10, 10), region(30, 0, 10, 10)];
        let flags: Vec<_> = order_and_flag(regions, 30.0)
            .into_iter()
            .map(|(_, f)| f)
            .collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn test_first_flag_is_false_even_with_huge_threshold() {
        let ordered = order_and_flag(vec![region(0, 0, 1, 1)], f32::MAX);
        assert!(!ordered[0].1);
        assert!(order_and_flag(Vec::new(), 10.0).is_empty());
    }
}

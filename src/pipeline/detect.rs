//! Connected-region extraction and detection policies over a binary mask.
//!
//! Two policies share the region pass: largest-blob (lane lines) and
//! band-overlap (stop line in its expected horizontal band).

use crate::calibration::StopLineCalibration;
use crate::models::{Mask, Rect};

/// Union-Find over provisional region labels.
struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    fn find(&mut self, x: u32) -> u32 {
        if self.parent[x as usize] != x {
            self.parent[x as usize] = self.find(self.parent[x as usize]);
        }
        self.parent[x as usize]
    }

    fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x != root_y {
            self.parent[root_x as usize] = root_y;
        }
    }
}

/// What one detection policy concluded about one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Detection {
    /// Whether the policy accepted the frame's largest region
    pub found: bool,
    /// Bounding box of the largest region, if the mask had any
    pub bounding_box: Option<Rect>,
    /// Horizontal midpoint of the largest region's box, present whenever
    /// the box is, accepted or not
    pub center_x: Option<u32>,
}

/// Find connected foreground regions (8-connectivity) and return their
/// bounding boxes in first-seen scan order.
pub fn find_regions(mask: &Mask) -> Vec<Rect> {
    let width = mask.width();
    let height = mask.height();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut labels = vec![0u32; width * height];
    let mut next_label = 1u32;
    let mut uf = UnionFind::new(width * height + 1);

    // First pass: provisional labels, unions across the four already-visited
    // neighbors (left, upper-left, up, upper-right).
    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) {
                continue;
            }

            let mut neighbor_labels = [0u32; 4];
            let mut count = 0;
            if x > 0 && mask.get(x - 1, y) {
                neighbor_labels[count] = labels[y * width + x - 1];
                count += 1;
            }
            if x > 0 && y > 0 && mask.get(x - 1, y - 1) {
                neighbor_labels[count] = labels[(y - 1) * width + x - 1];
                count += 1;
            }
            if y > 0 && mask.get(x, y - 1) {
                neighbor_labels[count] = labels[(y - 1) * width + x];
                count += 1;
            }
            if x + 1 < width && y > 0 && mask.get(x + 1, y - 1) {
                neighbor_labels[count] = labels[(y - 1) * width + x + 1];
                count += 1;
            }

            let idx = y * width + x;
            if count == 0 {
                labels[idx] = next_label;
                next_label += 1;
            } else {
                let neighbors = &neighbor_labels[..count];
                let min_label = *neighbors.iter().min().expect("count > 0");
                labels[idx] = min_label;
                for &label in neighbors {
                    if label != min_label {
                        uf.union(min_label, label);
                    }
                }
            }
        }
    }

    // Second pass: resolve roots and grow extents, keeping regions in the
    // order their first pixel was scanned so results are deterministic.
    let mut region_of_root = vec![usize::MAX; next_label as usize];
    let mut extents: Vec<(usize, usize, usize, usize)> = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let label = labels[y * width + x];
            if label == 0 {
                continue;
            }
            let root = uf.find(label) as usize;
            if region_of_root[root] == usize::MAX {
                region_of_root[root] = extents.len();
                extents.push((x, y, x, y));
            }
            let entry = &mut extents[region_of_root[root]];
            entry.0 = entry.0.min(x);
            entry.1 = entry.1.min(y);
            entry.2 = entry.2.max(x);
            entry.3 = entry.3.max(y);
        }
    }

    extents
        .into_iter()
        .map(|(min_x, min_y, max_x, max_y)| Rect::from_extents(min_x, min_y, max_x, max_y))
        .collect()
}

/// The region with the largest bounding-box area, first-seen wins on ties.
pub fn largest_region(regions: &[Rect]) -> Option<Rect> {
    regions
        .iter()
        .copied()
        .reduce(|best, rect| if rect.area() > best.area() { rect } else { best })
}

/// Largest-blob policy: the frame counts as a detection when its largest
/// region's box area reaches `min_area`.
pub fn classify_largest(mask: &Mask, min_area: u32) -> Detection {
    let regions = find_regions(mask);
    match largest_region(&regions) {
        Some(rect) => Detection {
            found: rect.area() >= min_area as u64,
            bounding_box: Some(rect),
            center_x: Some(rect.center_x()),
        },
        None => Detection::default(),
    }
}

/// Band-overlap policy: like [`classify_largest`], but the region must also
/// cover at least one row of the expected stop-line band.
pub fn classify_stop_band(mask: &Mask, min_area: u32, band: &StopLineCalibration) -> Detection {
    let mut detection = classify_largest(mask, min_area);
    if let Some(rect) = detection.bounding_box {
        detection.found = detection.found && rect.intersects_rows(band.top(), band.bottom());
    }
    detection
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from_rows(rows: &[&[u8]]) -> Mask {
        let mut mask = Mask::new(rows[0].len(), rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                mask.set(x, y, v != 0);
            }
        }
        mask
    }

    #[test]
    fn test_find_regions_separates_blobs() {
        let mask = mask_from_rows(&[
            &[1, 1, 0, 0, 0],
            &[1, 1, 0, 0, 1],
            &[0, 0, 0, 0, 1],
        ]);
        let regions = find_regions(&mask);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0], Rect { x: 0, y: 0, width: 2, height: 2 });
        assert_eq!(regions[1], Rect { x: 4, y: 1, width: 1, height: 2 });
    }

    #[test]
    fn test_diagonal_pixels_are_one_region() {
        // 8-connectivity merges a pure diagonal line.
        let mask = mask_from_rows(&[
            &[1, 0, 0],
            &[0, 1, 0],
            &[0, 0, 1],
        ]);
        let regions = find_regions(&mask);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0], Rect { x: 0, y: 0, width: 3, height: 3 });
    }

    #[test]
    fn test_u_shape_merges_via_unions() {
        // The two arms get different provisional labels until the bottom row
        // joins them.
        let mask = mask_from_rows(&[
            &[1, 0, 1],
            &[1, 0, 1],
            &[1, 1, 1],
        ]);
        let regions = find_regions(&mask);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0], Rect { x: 0, y: 0, width: 3, height: 3 });
    }

    #[test]
    fn test_empty_mask_yields_no_detection() {
        let mask = Mask::new(8, 8);
        assert!(find_regions(&mask).is_empty());
        let detection = classify_largest(&mask, 1);
        assert_eq!(detection, Detection::default());
    }

    #[test]
    fn test_largest_is_by_box_area_not_pixels() {
        // A sparse diagonal spans a 4x4 box (area 16, 4 pixels); the solid
        // block is 2x2 (area 4, 4 pixels). Box area decides.
        let mask = mask_from_rows(&[
            &[1, 0, 0, 0, 0, 0, 0],
            &[0, 1, 0, 0, 0, 1, 1],
            &[0, 0, 1, 0, 0, 1, 1],
            &[0, 0, 0, 1, 0, 0, 0],
        ]);
        let detection = classify_largest(&mask, 1);
        assert_eq!(
            detection.bounding_box,
            Some(Rect { x: 0, y: 0, width: 4, height: 4 })
        );
    }

    #[test]
    fn test_largest_region_ignores_discovery_order() {
        let small = Rect { x: 0, y: 0, width: 2, height: 2 };
        let big = Rect { x: 5, y: 5, width: 3, height: 4 };
        let dot = Rect { x: 9, y: 0, width: 1, height: 1 };
        assert_eq!(largest_region(&[small, big, dot]), Some(big));
        assert_eq!(largest_region(&[dot, big, small]), Some(big));
        assert_eq!(largest_region(&[big, small, dot]), Some(big));
        assert_eq!(largest_region(&[]), None);
    }

    #[test]
    fn test_min_area_gates_found() {
        let mask = mask_from_rows(&[
            &[0, 1, 1, 0],
            &[0, 1, 1, 0],
        ]);
        let hit = classify_largest(&mask, 4);
        assert!(hit.found);
        assert_eq!(hit.center_x, Some(2));

        // A region below the gate still reports where it is; only the
        // verdict changes.
        let miss = classify_largest(&mask, 5);
        assert!(!miss.found);
        assert_eq!(miss.bounding_box, hit.bounding_box);
        assert_eq!(miss.center_x, Some(2));
    }

    #[test]
    fn test_stop_band_overlap() {
        let mut mask = Mask::new(10, 20);
        for x in 0..6 {
            mask.set(x, 10, true);
            mask.set(x, 11, true);
        }
        let band_hit = StopLineCalibration { y: 11, radius: 1 };
        let band_miss = StopLineCalibration { y: 16, radius: 2 };

        let hit = classify_stop_band(&mask, 12, &band_hit);
        assert!(hit.found);
        assert_eq!(hit.center_x, Some(3));

        let miss = classify_stop_band(&mask, 12, &band_miss);
        assert!(!miss.found);
        assert!(miss.bounding_box.is_some());
        assert_eq!(miss.center_x, Some(3));
    }

    #[test]
    fn test_stop_band_boundary_row_counts() {
        let mut mask = Mask::new(4, 10);
        mask.set(0, 5, true);
        mask.set(1, 5, true);
        // Band rows 3..=5: the blob's only row is the band's last row.
        let band = StopLineCalibration { y: 4, radius: 1 };
        assert!(classify_stop_band(&mask, 1, &band).found);
        // Band rows 6..=8: adjacent but not overlapping.
        let above = StopLineCalibration { y: 7, radius: 1 };
        assert!(!classify_stop_band(&mask, 1, &above).found);
    }
}

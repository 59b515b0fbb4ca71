//! Ruling-line and joint detection on a binary raster.
//!
//! Everything here works in raster space. Morphological opening with a long,
//! thin kernel keeps only runs of one orientation; contour tracing then turns
//! each surviving run into a [`PixelSegment`]. Summing the two orientation masks
//! outlines whole tables, and multiplying them isolates the joints where
//! vertical and horizontal rules cross.

use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::geometry::approximate_polygon_dp;
use imageproc::point::Point as ContourPoint;
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::geometry::{Orientation, PixelPoint, PixelRect, PixelSegment};
use crate::raster::{BinaryRaster, LineKernel};

/// Joints found inside each accepted table region, in region order.
pub type RegionJoints = IndexMap<PixelRect, Vec<PixelPoint>>;

/// Detect ruling lines of one orientation.
///
/// Returns the joint-search mask (the opened raster, dilated `iterations` more
/// times) and one segment per line found.
///
/// The kernel spans `height / line_scale` pixels for vertical lines and
/// `width / line_scale` for horizontal ones, so shorter runs (text strokes,
/// the other orientation's rules) are erased.
pub fn detect_lines(
    raster: &BinaryRaster,
    orientation: Orientation,
    line_scale: u32,
    iterations: u32,
) -> Result<(BinaryRaster, Vec<PixelSegment>)> {
    if line_scale == 0 {
        return Err(Error::InvalidConfig("line_scale must be positive".to_string()));
    }
    let extent = match orientation {
        Orientation::Vertical => raster.height(),
        Orientation::Horizontal => raster.width(),
    };
    let kernel = LineKernel::new(orientation, extent / line_scale);

    let opened = raster.erode(kernel).dilate(kernel, 1);
    let mask = opened.dilate(kernel, iterations);

    let segments: Vec<PixelSegment> = external_contours(&opened)
        .iter()
        .filter_map(|c| bounding_rect(&c.points))
        .map(|rect| PixelSegment::from_rect(&rect, orientation))
        .collect();

    log::debug!(
        "Found {} {:?} segments (kernel length {})",
        segments.len(),
        orientation,
        kernel.length
    );
    Ok((mask, segments))
}

/// Outline candidate table regions from the two line masks.
///
/// The masks are summed, the outer contours of the result ranked by polygon
/// area (largest first) and at most `max_regions` of them kept. Each outline is
/// simplified with tolerance `epsilon` before its bounding rectangle is taken.
pub fn find_table_regions(
    vertical_mask: &BinaryRaster,
    horizontal_mask: &BinaryRaster,
    max_regions: usize,
    epsilon: f64,
) -> Result<Vec<PixelRect>> {
    let mask = vertical_mask.union(horizontal_mask)?;

    let mut outlines: Vec<(f64, Vec<ContourPoint<i32>>)> = external_contours(&mask)
        .into_iter()
        .map(|c| (contour_area(&c.points), c.points))
        .collect();
    outlines.sort_by(|a, b| b.0.total_cmp(&a.0));

    let regions: Vec<PixelRect> = outlines
        .into_iter()
        .take(max_regions)
        .filter_map(|(_, points)| {
            if points.len() >= 3 {
                bounding_rect(&approximate_polygon_dp(&points, epsilon, true))
            } else {
                bounding_rect(&points)
            }
        })
        .collect();

    log::debug!("Found {} candidate table regions", regions.len());
    Ok(regions)
}

/// Locate the joints inside each region.
///
/// Intersection pixels are traced with the full contour hierarchy so nested
/// markers count too. A region with `sparse_limit` joints or fewer is too
/// sparse to be a ruled grid and is dropped.
pub fn find_joints(
    regions: &[PixelRect],
    vertical_mask: &BinaryRaster,
    horizontal_mask: &BinaryRaster,
    sparse_limit: usize,
) -> Result<RegionJoints> {
    let joints = vertical_mask.intersect(horizontal_mask)?;
    let mut tables = RegionJoints::new();

    for region in regions {
        let roi = joints.crop(region);
        if roi.width() == 0 || roi.height() == 0 {
            continue;
        }
        let contours: Vec<Contour<i32>> = find_contours(roi.as_image());
        if contours.len() <= sparse_limit {
            log::debug!(
                "Discarding region {:?}: {} joints is not a ruled table",
                region,
                contours.len()
            );
            continue;
        }

        let coords = contours
            .iter()
            .filter_map(|c| bounding_rect(&c.points))
            .map(|r| {
                PixelPoint::new(
                    region.x + (2 * r.x + r.width).div_euclid(2),
                    region.y + (2 * r.y + r.height).div_euclid(2),
                )
            })
            .collect();
        tables.insert(*region, coords);
    }

    Ok(tables)
}

/// Merge coordinates that lie within `tol` of each other.
///
/// `coords` must be sorted (either direction). Each value within `tol` of the
/// last bucket folds into it as a running mean, `(last + value) / 2`, so later
/// merges see the already averaged value; otherwise it opens a new bucket.
///
/// # Examples
///
/// ```
/// use lattice_oxide::lattice::lines::merge_close_lines;
///
/// assert_eq!(merge_close_lines(&[10.0, 11.0, 40.0], 2.0), vec![10.5, 40.0]);
/// ```
pub fn merge_close_lines(coords: &[f32], tol: f32) -> Vec<f32> {
    let mut merged: Vec<f32> = Vec::with_capacity(coords.len());
    for &value in coords {
        match merged.last_mut() {
            Some(last) if (*last - value).abs() <= tol => *last = (*last + value) / 2.0,
            _ => merged.push(value),
        }
    }
    merged
}

fn external_contours(raster: &BinaryRaster) -> Vec<Contour<i32>> {
    if raster.width() == 0 || raster.height() == 0 {
        return Vec::new();
    }
    find_contours::<i32>(raster.as_image())
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .collect()
}

fn bounding_rect(points: &[ContourPoint<i32>]) -> Option<PixelRect> {
    let pixels: Vec<PixelPoint> = points.iter().map(|p| PixelPoint::new(p.x, p.y)).collect();
    PixelRect::bounding(&pixels)
}

/// Polygon area by the shoelace formula.
fn contour_area(points: &[ContourPoint<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p, q)| p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64)
        .sum();
    (twice as f64 / 2.0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rules 3px thick: horizontal at `ys` spanning `x0..=x1`, vertical at `xs`
    /// spanning `y0..=y1`.
    fn grid_raster(w: u32, h: u32, xs: &[i32], ys: &[i32], span: (i32, i32, i32, i32)) -> BinaryRaster {
        let (x0, y0, x1, y1) = span;
        let mut raster = BinaryRaster::new(w, h);
        for &y in ys {
            raster.fill_rect(PixelRect::new(x0 - 1, y - 1, x1 - x0 + 3, 3));
        }
        for &x in xs {
            raster.fill_rect(PixelRect::new(x - 1, y0 - 1, 3, y1 - y0 + 3));
        }
        raster
    }

    #[test]
    fn test_merge_close_lines_running_mean() {
        // 0 and 1.5 merge to 0.75; 3.0 is 2.25 away from that and stays apart.
        assert_eq!(merge_close_lines(&[0.0, 1.5, 3.0], 2.0), vec![0.75, 3.0]);
    }

    #[test]
    fn test_merge_close_lines_one_unit_apart() {
        assert_eq!(merge_close_lines(&[100.0, 101.0], 2.0), vec![100.5]);
    }

    #[test]
    fn test_merge_close_lines_descending() {
        assert_eq!(merge_close_lines(&[266.0, 265.0, 215.0, 115.0, 113.0], 2.0), vec![
            265.5, 215.0, 114.0
        ]);
    }

    #[test]
    fn test_merge_close_lines_empty() {
        assert!(merge_close_lines(&[], 2.0).is_empty());
    }

    #[test]
    fn test_contour_area_square() {
        let square = vec![
            ContourPoint::new(0, 0),
            ContourPoint::new(4, 0),
            ContourPoint::new(4, 4),
            ContourPoint::new(0, 4),
        ];
        assert_eq!(contour_area(&square), 16.0);
        assert_eq!(contour_area(&square[..2]), 0.0);
    }

    #[test]
    fn test_detect_lines_rejects_zero_scale() {
        let raster = BinaryRaster::new(10, 10);
        assert!(detect_lines(&raster, Orientation::Vertical, 0, 0).is_err());
    }

    #[test]
    fn test_detect_vertical_lines() {
        let raster = grid_raster(405, 315, &[50, 150, 250], &[50, 100, 150, 200], (50, 50, 250, 200));
        let (mask, mut segments) = detect_lines(&raster, Orientation::Vertical, 15, 0).unwrap();
        segments.sort_by_key(|s| s.x1);

        assert_eq!(segments.len(), 3);
        let xs: Vec<i32> = segments.iter().map(|s| s.x1).collect();
        assert_eq!(xs, vec![50, 150, 250]);
        for s in &segments {
            assert_eq!((s.y1, s.y2), (202, 49));
        }
        // horizontal rules are gone from the vertical mask
        assert!(!mask.is_set(100, 100));
        assert!(mask.is_set(150, 120));
    }

    #[test]
    fn test_detect_horizontal_lines() {
        let raster = grid_raster(405, 315, &[50, 150, 250], &[50, 100, 150, 200], (50, 50, 250, 200));
        let (_, mut segments) = detect_lines(&raster, Orientation::Horizontal, 15, 0).unwrap();
        segments.sort_by_key(|s| s.y1);

        let ys: Vec<i32> = segments.iter().map(|s| s.y1).collect();
        assert_eq!(ys, vec![50, 100, 150, 200]);
        for s in &segments {
            assert_eq!((s.x1, s.x2), (49, 252));
        }
    }

    #[test]
    fn test_find_regions_and_joints() {
        let raster = grid_raster(405, 315, &[50, 150, 250], &[50, 100, 150, 200], (50, 50, 250, 200));
        let (vmask, _) = detect_lines(&raster, Orientation::Vertical, 15, 0).unwrap();
        let (hmask, _) = detect_lines(&raster, Orientation::Horizontal, 15, 0).unwrap();

        let regions = find_table_regions(&vmask, &hmask, 10, 3.0).unwrap();
        assert_eq!(regions, vec![PixelRect::new(49, 49, 203, 153)]);

        let tables = find_joints(&regions, &vmask, &hmask, 4).unwrap();
        let joints = &tables[&regions[0]];
        assert_eq!(joints.len(), 12);
        assert!(joints.contains(&PixelPoint::new(50, 50)));
        assert!(joints.contains(&PixelPoint::new(150, 100)));
        assert!(joints.contains(&PixelPoint::new(250, 200)));
    }

    #[test]
    fn test_find_joints_discards_sparse_region() {
        // One horizontal rule crossed by three vertical rules: three joints.
        let mut vertical = BinaryRaster::new(100, 60);
        let mut horizontal = BinaryRaster::new(100, 60);
        horizontal.fill_rect(PixelRect::new(10, 29, 80, 3));
        for x in [20, 50, 80] {
            vertical.fill_rect(PixelRect::new(x - 1, 10, 3, 40));
        }
        let regions = find_table_regions(&vertical, &horizontal, 10, 3.0).unwrap();
        assert_eq!(regions.len(), 1);

        let tables = find_joints(&regions, &vertical, &horizontal, 4).unwrap();
        assert!(tables.is_empty());
    }

    #[test]
    fn test_find_table_regions_largest_first() {
        let mut vertical = BinaryRaster::new(200, 200);
        let horizontal = BinaryRaster::new(200, 200);
        vertical.fill_rect(PixelRect::new(10, 10, 5, 20)); // small
        vertical.fill_rect(PixelRect::new(100, 10, 5, 150)); // large
        let regions = find_table_regions(&vertical, &horizontal, 10, 3.0).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].x, 100);

        let capped = find_table_regions(&vertical, &horizontal, 1, 3.0).unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].x, 100);
    }
}

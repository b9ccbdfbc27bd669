use std::f64::consts::PI;

use crate::consts::{FRONT_WIDTH_FRACTION, HISTOGRAM_BINS};
use crate::geometry::{region_stats, Rect, Region};
use crate::plane::GrayPlane;

/// Geometric and intensity parameters of one comet boundary.
#[derive(Clone, Debug)]
pub struct ShapeParams {
    pub bounds: Rect,
    pub area: usize,
    pub area_convex_hull: usize,
    pub mean: f64,
    pub histogram: [u64; HISTOGRAM_BINS],
    pub perimeter: f64,
    /// `4 pi area / perimeter^2`; 0 for a zero perimeter.
    pub circularity: f64,
    /// `area / area_convex_hull`; 0 for an empty hull.
    pub convexity: f64,
    /// Mean per-column imbalance of pixels above vs. below the front row.
    pub symmetry: f64,
    /// Height over width.
    pub hratio: f64,
    /// Distance between front row and vertical midpoint, relative to height.
    pub centerline_diff: f64,
    /// Row of the front centroid (image coordinates).
    pub front_y: i32,
    /// `y + height / 2` in integer arithmetic.
    pub midpoint_y: i32,
}

/// Compute shape parameters of `boundary` measured on `plane`.
pub fn measure_shape(boundary: &Region, plane: &GrayPlane) -> ShapeParams {
    let stats = region_stats(boundary, plane);
    let bounds = stats.bounds;

    let perimeter = boundary.perimeter();
    let circularity = if perimeter > 0.0 {
        4.0 * PI * stats.area as f64 / (perimeter * perimeter)
    } else {
        0.0
    };

    let area_convex_hull = boundary.convex_hull().area();
    let convexity = if area_convex_hull > 0 {
        stats.area as f64 / area_convex_hull as f64
    } else {
        0.0
    };

    let front_y = front_centroid(boundary);
    let midpoint_y = bounds.y + bounds.height / 2;
    let (hratio, centerline_diff) = if bounds.width > 0 && bounds.height > 0 {
        (
            bounds.height as f64 / bounds.width as f64,
            (front_y - midpoint_y).abs() as f64 / bounds.height as f64,
        )
    } else {
        (0.0, 0.0)
    };

    ShapeParams {
        bounds,
        area: stats.area,
        area_convex_hull,
        mean: stats.mean,
        histogram: stats.histogram,
        perimeter,
        circularity,
        convexity,
        symmetry: symmetry(boundary, front_y),
        hratio,
        centerline_diff,
        front_y,
        midpoint_y,
    }
}

/// Truncated mean row of the region pixels in the leading tenth of its
/// bounding box (columns with offset `< 0.1 * width`).
///
/// An empty region reports its bounding-box top.
pub fn front_centroid(region: &Region) -> i32 {
    let bounds = region.bounds();
    let limit = bounds.width as f64 * FRONT_WIDTH_FRACTION;
    let mask = region.mask();

    let mut sum = 0i64;
    let mut count = 0i64;
    let mut col = 0usize;
    while (col as f64) < limit && col < mask.ncols() {
        for (row, &set) in mask.column(col).iter().enumerate() {
            if set {
                sum += bounds.y as i64 + row as i64;
                count += 1;
            }
        }
        col += 1;
    }

    if count == 0 {
        return bounds.y;
    }
    (sum as f64 / count as f64) as i32
}

/// Vertical asymmetry about `front_y`: for each column the imbalance
/// `|below - above| / count`, averaged over the bounding width. Rows at or
/// below `front_y` count as below.
pub fn symmetry(region: &Region, front_y: i32) -> f64 {
    let bounds = region.bounds();
    if bounds.width <= 0 {
        return 0.0;
    }

    let mask = region.mask();
    let mut total = 0.0;
    for column in mask.columns() {
        let (mut above, mut below) = (0i64, 0i64);
        for (row, &set) in column.iter().enumerate() {
            if !set {
                continue;
            }
            if bounds.y + (row as i32) < front_y {
                above += 1;
            } else {
                below += 1;
            }
        }
        let count = above + below;
        if count > 0 {
            total += (below - above).abs() as f64 / count as f64;
        }
    }
    total / bounds.width as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_front_centroid_uses_leading_columns_only() {
        // 10 columns wide: only column 0 is in front.
        let mut mask = Array2::from_elem((10, 10), false);
        mask[[2, 0]] = true;
        mask[[4, 0]] = true;
        for c in 1..10 {
            mask[[9, c]] = true;
        }
        let region = Region::from_mask(0, 0, mask);
        assert_eq!(front_centroid(&region), 3);
    }

    #[test]
    fn test_front_fraction_rounds_up() {
        // 0.1 * 15 = 1.5, so columns 0 and 1 are in front.
        let mut mask = Array2::from_elem((20, 15), false);
        mask[[0, 0]] = true;
        mask[[10, 1]] = true;
        mask[[19, 2]] = true;
        for c in 3..15 {
            mask[[19, c]] = true;
        }
        let region = Region::from_mask(0, 0, mask);
        assert_eq!(front_centroid(&region), 5);
    }

    #[test]
    fn test_symmetry_of_lopsided_block() {
        // Everything at or below the front row: each column contributes 1.
        let region = Region::from_mask(0, 0, Array2::from_elem((4, 6), true));
        assert!((symmetry(&region, 0) - 1.0).abs() < 1e-12);
        // Balanced split.
        assert!(symmetry(&region, 2).abs() < 1e-12);
    }
}

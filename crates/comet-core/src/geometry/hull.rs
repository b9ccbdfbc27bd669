use ndarray::Array2;

use super::rect::Rect;

/// Convex hull of integer points (Andrew's monotone chain).
///
/// Returns the hull counter-clockwise in image coordinates with collinear
/// points removed. Fewer than three distinct points are returned as-is.
pub fn convex_hull(mut points: Vec<(i64, i64)>) -> Vec<(i64, i64)> {
    points.sort_unstable();
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    fn cross(o: (i64, i64), a: (i64, i64), b: (i64, i64)) -> i64 {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    }

    let mut hull: Vec<(i64, i64)> = Vec::with_capacity(points.len() * 2);
    for &p in &points {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in points.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Euclidean length of a closed polygon.
pub fn polygon_length(points: &[(f64, f64)]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt())
        .sum()
}

/// Shoelace area of a closed polygon.
pub fn polygon_area(points: &[(f64, f64)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.0 * b.1 - b.0 * a.1)
        .sum();
    twice.abs() / 2.0
}

/// Mask over `bounds` of the pixels whose centers lie inside the polygon
/// (even-odd rule).
pub fn rasterize_polygon(points: &[(f64, f64)], bounds: Rect) -> Array2<bool> {
    let (w, h) = (bounds.width.max(0) as usize, bounds.height.max(0) as usize);
    let mut mask = Array2::from_elem((h, w), false);
    if points.len() < 3 {
        return mask;
    }

    let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
    for row in 0..h {
        let cy = bounds.y as f64 + row as f64 + 0.5;
        crossings.clear();
        for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
            if (a.1 > cy) != (b.1 > cy) {
                crossings.push(a.0 + (cy - a.1) * (b.0 - a.0) / (b.1 - a.1));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for pair in crossings.chunks_exact(2) {
            for col in 0..w {
                let cx = bounds.x as f64 + col as f64 + 0.5;
                if cx > pair[0] && cx < pair[1] {
                    mask[[row, col]] = true;
                }
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hull_drops_interior_and_collinear_points() {
        let points = vec![(0, 0), (2, 0), (4, 0), (4, 4), (0, 4), (2, 2), (1, 3)];
        let hull = convex_hull(points);
        assert_eq!(hull.len(), 4);
        assert!(hull.contains(&(0, 0)));
        assert!(hull.contains(&(4, 4)));
        assert!(!hull.contains(&(2, 0)));
    }

    #[test]
    fn test_polygon_measures() {
        let square = [(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0)];
        assert!((polygon_length(&square) - 12.0).abs() < 1e-12);
        assert!((polygon_area(&square) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_rasterize_triangle() {
        let triangle = [(0.0, 0.0), (4.0, 0.0), (0.0, 4.0)];
        let mask = rasterize_polygon(&triangle, Rect::new(0, 0, 4, 4));
        // Centers strictly below the diagonal x + y = 4.
        let count = mask.iter().filter(|&&v| v).count();
        assert_eq!(count, 6);
        assert!(mask[[0, 0]]);
        assert!(!mask[[3, 3]]);
    }
}

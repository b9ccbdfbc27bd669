use ndarray::{s, Array2};

use super::hull::{convex_hull, polygon_length, rasterize_polygon};
use super::outline::{trace_outline, traced_perimeter};
use super::rect::Rect;

/// A set of pixels in image coordinates, stored as a mask over its tight
/// bounding box.
///
/// Regions are immutable values: every algebra operation returns a new one.
#[derive(Clone, Debug)]
pub struct Region {
    x: i32,
    y: i32,
    /// Shape = (height, width) of the bounding box.
    mask: Array2<bool>,
    outline: Outline,
}

/// How the boundary length of a region is measured.
#[derive(Clone, Debug, PartialEq)]
pub enum Outline {
    /// Outline follows pixel edges; perimeter uses corner-corrected crack length.
    Traced,
    /// Outline is a closed polygon through pixel corners (image coordinates).
    Polygon(Vec<(f64, f64)>),
}

impl Region {
    /// Build a region from a mask whose `[0, 0]` element sits at `(x, y)`.
    /// The mask is trimmed to the bounding box of its set pixels.
    pub fn from_mask(x: i32, y: i32, mask: Array2<bool>) -> Self {
        Self::from_mask_with_outline(x, y, mask, Outline::Traced)
    }

    fn from_mask_with_outline(x: i32, y: i32, mask: Array2<bool>, outline: Outline) -> Self {
        let (h, w) = mask.dim();
        let mut min_row = usize::MAX;
        let mut max_row = 0;
        let mut min_col = usize::MAX;
        let mut max_col = 0;
        for ((row, col), &set) in mask.indexed_iter() {
            if set {
                min_row = min_row.min(row);
                max_row = max_row.max(row);
                min_col = min_col.min(col);
                max_col = max_col.max(col);
            }
        }

        if min_row == usize::MAX {
            return Self::empty();
        }
        if min_row == 0 && min_col == 0 && max_row + 1 == h && max_col + 1 == w {
            return Self {
                x,
                y,
                mask,
                outline,
            };
        }

        let trimmed = mask
            .slice(s![min_row..=max_row, min_col..=max_col])
            .to_owned();
        Self {
            x: x + min_col as i32,
            y: y + min_row as i32,
            mask: trimmed,
            outline,
        }
    }

    pub fn empty() -> Self {
        Self {
            x: 0,
            y: 0,
            mask: Array2::from_elem((0, 0), false),
            outline: Outline::Traced,
        }
    }

    /// Pixels whose centers fall inside the ellipse inscribed in `bounds`.
    pub fn ellipse(bounds: Rect) -> Self {
        if bounds.width <= 0 || bounds.height <= 0 {
            return Self::empty();
        }
        let (w, h) = (bounds.width as usize, bounds.height as usize);
        let (a, b) = (bounds.width as f64 / 2.0, bounds.height as f64 / 2.0);
        let mask = Array2::from_shape_fn((h, w), |(row, col)| {
            let dx = (col as f64 + 0.5 - a) / a;
            let dy = (row as f64 + 0.5 - b) / b;
            dx * dx + dy * dy <= 1.0
        });
        Self::from_mask(bounds.x, bounds.y, mask)
    }

    pub fn bounds(&self) -> Rect {
        let (h, w) = self.mask.dim();
        Rect::new(self.x, self.y, w as i32, h as i32)
    }

    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn area(&self) -> usize {
        self.mask.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty() || !self.mask.iter().any(|&v| v)
    }

    /// Whether the pixel at absolute `(x, y)` belongs to the region.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (col, row) = (x - self.x, y - self.y);
        if col < 0 || row < 0 {
            return false;
        }
        self.mask
            .get((row as usize, col as usize))
            .copied()
            .unwrap_or(false)
    }

    /// Absolute coordinates of every pixel, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.mask
            .indexed_iter()
            .filter(|(_, &set)| set)
            .map(move |((row, col), _)| (self.x + col as i32, self.y + row as i32))
    }

    /// Number of region pixels in a column given relative to the bounding box.
    /// Columns outside the box hold no pixels.
    pub fn column_height(&self, rel_col: i32) -> usize {
        if rel_col < 0 || rel_col as usize >= self.mask.ncols() {
            return 0;
        }
        self.mask.column(rel_col as usize).iter().filter(|&&v| v).count()
    }

    /// Geometric centroid of the pixel centers, or `None` for an empty region.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let mut sx = 0.0;
        let mut sy = 0.0;
        let mut n = 0usize;
        for (x, y) in self.pixels() {
            sx += x as f64 + 0.5;
            sy += y as f64 + 0.5;
            n += 1;
        }
        (n > 0).then(|| (sx / n as f64, sy / n as f64))
    }

    pub fn intersect(&self, other: &Region) -> Region {
        self.combine(other, |a, b| a && b)
    }

    /// Pixels of `self` that are not in `other`.
    pub fn subtract(&self, other: &Region) -> Region {
        self.combine(other, |a, b| a && !b)
    }

    fn combine(&self, other: &Region, op: impl Fn(bool, bool) -> bool) -> Region {
        let bounds = self.bounds();
        if bounds.is_empty() {
            return Region::empty();
        }
        let mask = Array2::from_shape_fn(self.mask.dim(), |(row, col)| {
            let inside = self.mask[[row, col]];
            inside && op(inside, other.contains(self.x + col as i32, self.y + row as i32))
        });
        Region::from_mask(self.x, self.y, mask)
    }

    /// Convex hull of the region as a polygon region. The hull polygon runs
    /// through pixel corners, and every source pixel stays inside.
    pub fn convex_hull(&self) -> Region {
        let h = self.mask.nrows();
        let mut corners: Vec<(i64, i64)> = Vec::with_capacity(h * 4);
        for row in 0..h {
            let line = self.mask.row(row);
            let first = line.iter().position(|&v| v);
            let last = line.iter().rposition(|&v| v);
            if let (Some(l), Some(r)) = (first, last) {
                let (x0, x1) = ((self.x + l as i32) as i64, (self.x + r as i32 + 1) as i64);
                let (y0, y1) = ((self.y + row as i32) as i64, (self.y + row as i32 + 1) as i64);
                corners.extend_from_slice(&[(x0, y0), (x0, y1), (x1, y0), (x1, y1)]);
            }
        }
        if corners.is_empty() {
            return Region::empty();
        }

        let hull = convex_hull(corners);
        let polygon: Vec<(f64, f64)> = hull.iter().map(|&(x, y)| (x as f64, y as f64)).collect();

        let bounds = self.bounds();
        let mut mask = rasterize_polygon(&polygon, bounds);
        // Guard against center-on-edge ties dropping source pixels.
        mask.zip_mut_with(&self.mask, |dst, &src| *dst |= src);

        Region::from_mask_with_outline(self.x, self.y, mask, Outline::Polygon(polygon))
    }

    /// Boundary length of the region.
    pub fn perimeter(&self) -> f64 {
        match &self.outline {
            Outline::Polygon(points) => polygon_length(points),
            Outline::Traced => {
                let vertices = trace_outline(&self.mask);
                traced_perimeter(&vertices)
            }
        }
    }
}

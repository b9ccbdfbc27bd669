use crate::consts::HISTOGRAM_BINS;
use crate::plane::GrayPlane;

use super::rect::Rect;
use super::region::Region;

/// Intensity statistics of a plane restricted to a region.
#[derive(Clone, Debug)]
pub struct RegionStats {
    pub bounds: Rect,
    pub area: usize,
    pub mean: f64,
    pub histogram: [u64; HISTOGRAM_BINS],
    /// Intensity-weighted centroid; falls back to the geometric one when the
    /// region holds no signal.
    pub x_center_of_mass: f64,
    pub y_center_of_mass: f64,
}

impl RegionStats {
    pub fn integrated_density(&self) -> f64 {
        self.mean * self.area as f64
    }
}

/// Measure `plane` over the pixels of `region`.
pub fn region_stats(region: &Region, plane: &GrayPlane) -> RegionStats {
    let mut histogram = [0u64; HISTOGRAM_BINS];
    let mut sum = 0.0;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut area = 0usize;

    for (x, y) in region.pixels() {
        let v = plane.get(x, y);
        histogram[v as usize] += 1;
        let vf = v as f64;
        sum += vf;
        sum_x += vf * (x as f64 + 0.5);
        sum_y += vf * (y as f64 + 0.5);
        area += 1;
    }

    let mean = if area > 0 { sum / area as f64 } else { 0.0 };
    let (x_center_of_mass, y_center_of_mass) = if sum > 0.0 {
        (sum_x / sum, sum_y / sum)
    } else {
        region.centroid().unwrap_or((0.0, 0.0))
    };

    RegionStats {
        bounds: region.bounds(),
        area,
        mean,
        histogram,
        x_center_of_mass,
        y_center_of_mass,
    }
}

use serde::Serialize;

use crate::geometry::{region_stats, Region};
use crate::plane::GrayPlane;

use super::shape::ShapeParams;

/// Output measurements of one comet. Lengths are in pixels, intensities in
/// gray levels, DNA in integrated intensity, percentages in 0..100.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Measurements {
    pub comet_length: f64,
    pub comet_area: f64,
    pub comet_intensity: f64,
    pub comet_dna: f64,
    pub head_length: f64,
    pub head_area: f64,
    pub head_intensity: f64,
    pub head_dna: f64,
    pub head_dna_percent: f64,
    pub tail_length: f64,
    pub tail_area: f64,
    pub tail_intensity: f64,
    pub tail_dna: f64,
    pub tail_dna_percent: f64,
    pub tail_moment: f64,
    pub tail_olive_moment: f64,
    /// Column splitting the head's integrated intensity in half.
    pub head_centroid: i32,
    /// Same for the tail; equals `head_centroid` when the tail is empty.
    pub tail_centroid: i32,
}

/// Measure a background-corrected comet.
///
/// `shape` must describe `boundary` on the corrected `plane`, and `head`
/// must lie within `boundary`.
pub fn measure_comet(
    shape: &ShapeParams,
    boundary: &Region,
    head: &Region,
    plane: &GrayPlane,
) -> Measurements {
    let comet_length = shape.bounds.width as f64;
    let comet_area = shape.area as f64;
    let comet_intensity = shape.mean;
    let comet_dna = comet_area * comet_intensity;

    let head_stats = region_stats(head, plane);
    let head_area = head_stats.area as f64;
    let head_intensity = head_stats.mean;
    let head_length = head_stats.bounds.width as f64;
    let head_dna = head_area * head_intensity;
    let head_centroid = intensity_centroid_x(head, plane);

    let tail_area = comet_area - head_area;
    let tail_length = (comet_length - head_length).max(0.0);
    let tail_dna = comet_dna - head_dna;
    let tail_intensity = if tail_area > 0.0 {
        tail_dna / tail_area
    } else {
        0.0
    };

    let (head_fraction, tail_fraction) = if comet_dna > 0.0 {
        (head_dna / comet_dna, tail_dna / comet_dna)
    } else {
        (0.0, 0.0)
    };

    let tail = boundary.subtract(head);
    let tail_centroid = if tail.is_empty() {
        head_centroid
    } else {
        intensity_centroid_x(&tail, plane)
    };

    Measurements {
        comet_length,
        comet_area,
        comet_intensity,
        comet_dna,
        head_length,
        head_area,
        head_intensity,
        head_dna,
        head_dna_percent: 100.0 * head_fraction,
        tail_length,
        tail_area,
        tail_intensity,
        tail_dna,
        tail_dna_percent: 100.0 * tail_fraction,
        tail_moment: tail_length * tail_fraction,
        tail_olive_moment: tail_fraction * (tail_centroid - head_centroid).abs() as f64,
        head_centroid,
        tail_centroid,
    }
}

/// First absolute column at which the running column sum of region
/// intensities exceeds half the region total. One past the last column when
/// it never does.
pub fn intensity_centroid_x(region: &Region, plane: &GrayPlane) -> i32 {
    let bounds = region.bounds();
    let total: f64 = region.pixels().map(|(x, y)| plane.get(x, y) as f64).sum();
    let half = total / 2.0;

    let mask = region.mask();
    let mut running = 0.0;
    for (col, column) in mask.columns().into_iter().enumerate() {
        let x = bounds.x + col as i32;
        for (row, &set) in column.iter().enumerate() {
            if set {
                running += plane.get(x, bounds.y + row as i32) as f64;
            }
        }
        if running > half {
            return x;
        }
    }
    bounds.right()
}

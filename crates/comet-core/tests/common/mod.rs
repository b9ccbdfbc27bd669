#![allow(dead_code)]

use comet_core::analysis::measure::measure_comet;
use comet_core::analysis::shape::measure_shape;
use comet_core::analysis::AnalysisConfig;
use comet_core::comet::{Comet, CometStatus};
use comet_core::detection::ThresholdMethod;
use comet_core::geometry::Region;
use comet_core::plane::GrayPlane;
use ndarray::Array2;

pub const BACKGROUND: u8 = 10;
pub const TAIL_LEVEL: u8 = 80;
pub const HEAD_LEVEL: u8 = 200;
pub const HEAD_RADIUS: i32 = 12;

/// Uniform plane of `width` x `height` pixels.
pub fn flat_plane(width: usize, height: usize, level: u8) -> GrayPlane {
    GrayPlane::new(Array2::from_elem((height, width), level))
}

/// Set every pixel with `((x-cx)/a)^2 + ((y-cy)/b)^2 <= 1` to `value`.
pub fn draw_ellipse(plane: &mut GrayPlane, cx: i32, cy: i32, a: i32, b: i32, value: u8) {
    for y in cy - b..=cy + b {
        for x in cx - a..=cx + a {
            let dx = (x - cx) as f64 / a as f64;
            let dy = (y - cy) as f64 / b as f64;
            if dx * dx + dy * dy <= 1.0 {
                plane.put(x, y, value);
            }
        }
    }
}

/// Draw a comet whose head disk is centered at `(cx, cy)` with an
/// elliptical tail trailing to the right.
pub fn draw_comet(plane: &mut GrayPlane, cx: i32, cy: i32) {
    draw_ellipse(plane, cx + 20, cy, 20, 9, TAIL_LEVEL);
    draw_ellipse(plane, cx, cy, HEAD_RADIUS, HEAD_RADIUS, HEAD_LEVEL);
}

/// 160 x 150 slide with two identical comets.
pub fn two_comet_plane() -> GrayPlane {
    let mut plane = flat_plane(160, 150, BACKGROUND);
    draw_comet(&mut plane, 50, 40);
    draw_comet(&mut plane, 50, 110);
    plane
}

/// Config with a fixed threshold and no global background correction.
pub fn fixed_config(level: u8) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.segmentation.threshold_method = ThresholdMethod::Fixed(level);
    config.segmentation.background_correction = false;
    config
}

/// Rectangular region of `width` x `height` pixels at `(x, y)`.
pub fn block(x: i32, y: i32, width: usize, height: usize) -> Region {
    Region::from_mask(x, y, Array2::from_elem((height, width), true))
}

/// A measured 10 x 10 comet of uniform `level` whose head is its leading
/// `head_cols` columns.
pub fn measured_comet(id: u32, status: CometStatus, level: u8, head_cols: usize) -> Comet {
    let plane = flat_plane(30, 30, level);
    let boundary = block(10, 10, 10, 10);
    let head = block(10, 10, head_cols, 10);
    let shape = measure_shape(&boundary, &plane);

    let mut comet = Comet::new(boundary.clone(), shape.clone());
    comet.id = Some(id);
    comet.status = status;
    comet.measurements = Some(measure_comet(&shape, &boundary, &head, &plane));
    comet.head = Some(head);
    comet
}

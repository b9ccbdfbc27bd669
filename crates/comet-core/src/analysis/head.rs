use tracing::debug;

use crate::consts::{
    BRIGHTEST_FRACTION, HISTOGRAM_BINS, PROFILE_SMOOTHING_DIVISOR, PROFILE_STRIP_HALF_HEIGHT,
    STREAK_ASPECT_RATIO, STREAK_CIRCULARITY,
};
use crate::geometry::{Rect, Region};
use crate::plane::GrayPlane;

use super::config::HeadFinding;
use super::events::{AnalysisEvent, EventSink, HeadRejection, HeadStage};
use super::local_background::column_average;
use super::shape::ShapeParams;
use super::signal::detect_head_edge;

/// A located head.
#[derive(Clone, Debug)]
pub struct HeadLocation {
    pub region: Region,
    pub stage: HeadStage,
    pub radius: i32,
}

/// Locate the head of a comet on the working plane.
///
/// `shape` must describe `boundary` as measured on `plane`. Returns `None`
/// when no configured stage yields a head; every rejection is reported to
/// `sink` under `index`.
pub fn locate_head(
    index: usize,
    boundary: &Region,
    shape: &ShapeParams,
    plane: &GrayPlane,
    mode: HeadFinding,
    sink: &dyn EventSink,
) -> Option<HeadLocation> {
    let stages: &[HeadStage] = match mode {
        HeadFinding::Auto => &[HeadStage::Brightest, HeadStage::Profile],
        HeadFinding::Brightest => &[HeadStage::Brightest],
        HeadFinding::Profile => &[HeadStage::Profile],
    };

    for &stage in stages {
        let attempt = match stage {
            HeadStage::Brightest => brightest_region_head(boundary, shape, plane),
            HeadStage::Profile => profile_head(boundary, shape, plane),
        };
        match attempt {
            Ok((region, radius)) => {
                sink.record(AnalysisEvent::HeadFound {
                    index,
                    stage,
                    radius,
                });
                return Some(HeadLocation {
                    region,
                    stage,
                    radius,
                });
            }
            Err(reason) => {
                debug!(index, ?stage, %reason, "Head candidate rejected");
                sink.record(AnalysisEvent::HeadRejected {
                    index,
                    stage,
                    reason,
                });
            }
        }
    }
    None
}

/// Histogram bin below the brightest 5% of the comet: the bin before the
/// first one at which the cumulative count over bins 0..=254 exceeds 95%.
pub fn local_threshold_bin(histogram: &[u64; HISTOGRAM_BINS]) -> i32 {
    let bins = &histogram[..HISTOGRAM_BINS - 1];
    let total: f64 = bins.iter().map(|&c| c as f64).sum();
    let limit = BRIGHTEST_FRACTION * total;

    let mut cumulative = 0.0;
    for (i, &count) in bins.iter().enumerate() {
        cumulative += count as f64;
        if cumulative > limit {
            return i as i32 - 1;
        }
    }
    0
}

/// Stage A: the head is centered on the brightest part of the comet.
fn brightest_region_head(
    boundary: &Region,
    shape: &ShapeParams,
    plane: &GrayPlane,
) -> Result<(Region, i32), HeadRejection> {
    let bin = local_threshold_bin(&shape.histogram);
    let bounds = shape.bounds;

    // Binarize the bounding-box crop, background pixels included.
    let mut min_x = i32::MAX;
    let mut max_x = i32::MIN;
    let mut min_y = i32::MAX;
    let mut max_y = i32::MIN;
    let mut sum_x = 0.0;
    let mut count = 0usize;
    for row in 0..bounds.height {
        for col in 0..bounds.width {
            if (plane.get(bounds.x + col, bounds.y + row) as i32) < bin {
                continue;
            }
            min_x = min_x.min(col);
            max_x = max_x.max(col);
            min_y = min_y.min(row);
            max_y = max_y.max(row);
            sum_x += col as f64 + 0.5;
            count += 1;
        }
    }
    if count == 0 {
        return Err(HeadRejection::NoBrightPixels);
    }

    let (span_w, span_h) = (max_x - min_x, max_y - min_y);
    if shape.circularity < STREAK_CIRCULARITY && span_w > span_h * STREAK_ASPECT_RATIO {
        return Err(HeadRejection::Streak);
    }

    let xc = (sum_x / count as f64) as i32;
    let radius = boundary.column_height(xc) as i32 / 2;
    if xc - radius > 0 {
        return Err(HeadRejection::Displaced);
    }

    head_circle(boundary, shape.front_y, radius).map(|head| (head, radius))
}

/// Stage B: the head ends at the first edge of the column intensity profile.
fn profile_head(
    boundary: &Region,
    shape: &ShapeParams,
    plane: &GrayPlane,
) -> Result<(Region, i32), HeadRejection> {
    let edge = profile_head_edge(boundary, shape, plane);
    let radius = edge as i32 / 2;
    head_circle(boundary, shape.front_y, radius).map(|head| (head, radius))
}

/// Head edge column offset from the masked intensity profile. Elongated
/// comets are profiled over a thin strip around the front row.
pub fn profile_head_edge(boundary: &Region, shape: &ShapeParams, plane: &GrayPlane) -> usize {
    let bounds = shape.bounds;
    let strip = if shape.circularity < STREAK_CIRCULARITY {
        Rect::new(
            bounds.x,
            shape.front_y - PROFILE_STRIP_HALF_HEIGHT,
            bounds.width,
            2 * PROFILE_STRIP_HALF_HEIGHT,
        )
    } else {
        bounds
    };

    let profile = column_average(plane, strip, Some(boundary));
    let window = (bounds.width.max(0) as usize / PROFILE_SMOOTHING_DIVISOR).max(1);
    detect_head_edge(&profile, window)
}

/// Circle of `radius` touching the comet's left edge, centered on the front
/// row, clipped to the comet.
fn head_circle(boundary: &Region, front_y: i32, radius: i32) -> Result<Region, HeadRejection> {
    let x = boundary.bounds().x;
    let circle = Region::ellipse(Rect::new(x, front_y - radius, 2 * radius, 2 * radius));
    let head = circle.intersect(boundary);
    if head.is_empty() {
        return Err(HeadRejection::EmptyHead);
    }
    Ok(head)
}

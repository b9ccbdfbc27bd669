use serde::Serialize;

use crate::consts::{
    BACKGROUND_SMOOTHING_RADIUS, BACKGROUND_STRIP_DIVISOR, MIN_BACKGROUND_STRIP_HEIGHT,
};
use crate::geometry::{Rect, Region};
use crate::plane::GrayPlane;

use super::signal::moving_average;

/// Per-column intensity profiles of a comet after background correction.
/// Every profile has one entry per bounding-box column.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Profiles {
    /// Background strip average, unsmoothed.
    pub background: Vec<f64>,
    pub comet: Vec<f64>,
    pub head: Vec<f64>,
    /// `comet - head`.
    pub tail: Vec<f64>,
    /// Largest value of the comet profile.
    pub max: f64,
}

/// Strip adjacent to the comet used to estimate its local background:
/// directly above when it fits in the image, else directly below.
pub fn background_strip(bounds: Rect) -> Rect {
    let height =
        ((bounds.height as f64 / BACKGROUND_STRIP_DIVISOR) as i32).max(MIN_BACKGROUND_STRIP_HEIGHT);
    if bounds.y - height >= 0 {
        Rect::new(bounds.x, bounds.y - height, bounds.width, height)
    } else {
        Rect::new(bounds.x, bounds.bottom(), bounds.width, height)
    }
}

/// Column sums of `plane` over `rect`, divided by the rect height.
///
/// With a mask only pixels inside it count; pixels outside the image read 0.
pub fn column_average(plane: &GrayPlane, rect: Rect, mask: Option<&Region>) -> Vec<f64> {
    if rect.width <= 0 || rect.height <= 0 {
        return vec![0.0; rect.width.max(0) as usize];
    }
    (0..rect.width)
        .map(|col| {
            let x = rect.x + col;
            let sum: f64 = (rect.y..rect.bottom())
                .filter(|&y| mask.is_none_or(|m| m.contains(x, y)))
                .map(|y| plane.get(x, y) as f64)
                .sum();
            sum / rect.height as f64
        })
        .collect()
}

/// Subtract the comet's local background from its pixels in place and
/// record its column profiles.
///
/// The background is the strip average smoothed over
/// ±`BACKGROUND_SMOOTHING_RADIUS` columns. Corrected values are truncated
/// toward zero and clamped at 0.
pub fn correct_background(plane: &mut GrayPlane, comet: &Region, head: Option<&Region>) -> Profiles {
    let bounds = comet.bounds();
    let strip = background_strip(bounds);

    let background = column_average(plane, strip, None);
    let smoothed = moving_average(&background, 2 * BACKGROUND_SMOOTHING_RADIUS + 1);

    for (x, y) in comet.pixels() {
        let col = (x - bounds.x) as usize;
        let value = (plane.get(x, y) as f64 - smoothed[col]) as i32;
        plane.put(x, y, value.clamp(0, 255) as u8);
    }

    // Profiles over the full comet box, normalized by its height.
    let comet_profile = column_average(plane, bounds, Some(comet));
    let head_profile = match head {
        Some(head) => column_average(plane, bounds, Some(head)),
        None => vec![0.0; comet_profile.len()],
    };
    let tail_profile: Vec<f64> = comet_profile
        .iter()
        .zip(&head_profile)
        .map(|(c, h)| c - h)
        .collect();
    let max = comet_profile.iter().copied().fold(0.0, f64::max);

    Profiles {
        background,
        comet: comet_profile,
        head: head_profile,
        tail: tail_profile,
        max,
    }
}

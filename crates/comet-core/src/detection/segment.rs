use tracing::debug;

use crate::geometry::Region;
use crate::plane::GrayPlane;

use super::background::{median_filter, rolling_ball_subtract};
use super::components::extract_particles;
use super::config::SegmentationConfig;
use super::morphology::opening;
use super::threshold::{auto_threshold, threshold_mask};

/// Candidate comet regions found in one image.
#[derive(Clone, Debug)]
pub struct Segmentation {
    /// Threshold level applied; foreground is strictly above it.
    pub level: u8,
    /// Particle regions in raster discovery order.
    pub regions: Vec<Region>,
}

/// Segment candidate comets from a grayscale plane.
///
/// Pipeline: optional median denoise + rolling-ball subtraction ->
/// threshold -> morphological opening -> particle extraction.
///
/// The input plane is never modified; measurements are taken on it later.
pub fn segment_comets(plane: &GrayPlane, config: &SegmentationConfig) -> Segmentation {
    let (h, w) = plane.data.dim();
    if h == 0 || w == 0 {
        return Segmentation {
            level: 0,
            regions: Vec::new(),
        };
    }

    // Step 1: Global background correction on a private copy.
    let corrected;
    let working = if config.background_correction {
        let denoised = median_filter(plane, config.median_radius);
        let radius = h.min(w) as f64 * config.rolling_ball_fraction;
        corrected = rolling_ball_subtract(&denoised, radius);
        debug!(radius, "Global background corrected");
        &corrected
    } else {
        plane
    };

    // Step 2: Threshold.
    let level = auto_threshold(&working.histogram(), config.threshold_method);
    let mask = threshold_mask(working, level);

    // Step 3: Opening removes debris and splits touching comets.
    let opened = opening(&mask, config.opening_iterations);

    // Step 4: Particles.
    let regions = extract_particles(&opened, &config.particles);
    debug!(
        method = %config.threshold_method,
        level,
        particles = regions.len(),
        "Segmentation complete"
    );

    Segmentation { level, regions }
}

use rayon::prelude::*;
use tracing::{debug, info};

use crate::comet::{Comet, CometStatus};
use crate::detection::segment_comets;
use crate::plane::GrayPlane;

use super::config::AnalysisConfig;
use super::events::{AnalysisEvent, EventSink};
use super::head::locate_head;
use super::local_background::correct_background;
use super::measure::measure_comet;
use super::shape::measure_shape;
use super::validity::{classify_comets, flag_area_outliers, PopulationMoments, RuleContext};

/// Result of analyzing one image.
#[derive(Clone, Debug)]
pub struct ImageAnalysis {
    /// Every segmented comet in discovery order, whatever its status.
    pub comets: Vec<Comet>,
    pub threshold_level: u8,
    /// Area and height moments of the Valid population before the outlier pass.
    pub moments: PopulationMoments,
    pub width: usize,
    pub height: usize,
}

impl ImageAnalysis {
    pub fn comet(&self, id: u32) -> Option<&Comet> {
        self.comets.iter().find(|c| c.id == Some(id))
    }

    fn comet_mut(&mut self, id: u32) -> Option<&mut Comet> {
        self.comets.iter_mut().find(|c| c.id == Some(id))
    }

    /// Advance the comet through the manual relabel cycle. Returns its new
    /// status, or `None` for an unknown id.
    pub fn relabel(&mut self, id: u32) -> Option<CometStatus> {
        let comet = self.comet_mut(id)?;
        comet.status = comet.status.relabel();
        Some(comet.status)
    }

    /// Mark a comet as deleted. Returns `false` for an unknown id.
    pub fn delete(&mut self, id: u32) -> bool {
        match self.comet_mut(id) {
            Some(comet) => {
                comet.status = CometStatus::Deleted;
                true
            }
            None => false,
        }
    }

    /// The first comet whose current boundary contains `(x, y)`.
    pub fn comet_at(&self, x: i32, y: i32) -> Option<&Comet> {
        self.comets.iter().find(|c| c.boundary().contains(x, y))
    }

    /// Comets that carry measurements.
    pub fn measurable(&self) -> impl Iterator<Item = &Comet> {
        self.comets
            .iter()
            .filter(|c| c.can_calculate_stats() && c.measurements.is_some())
    }
}

/// Run segmentation, classification, head localization, background
/// correction and measurement on one grayscale plane.
///
/// Returns `None` when the first classification pass leaves no Valid comet.
/// `plane` is not modified; background correction works on a private copy.
pub fn analyze_plane(
    plane: &GrayPlane,
    config: &AnalysisConfig,
    sink: &dyn EventSink,
) -> Option<ImageAnalysis> {
    let (h, w) = plane.data.dim();
    let segmentation = segment_comets(plane, &config.segmentation);

    // Shape of every raw region; read-only on the plane.
    let mut comets: Vec<Comet> = segmentation
        .regions
        .into_par_iter()
        .map(|region| {
            let shape = measure_shape(&region, plane);
            Comet::new(region, shape)
        })
        .collect();

    let ctx = RuleContext {
        config: &config.validity,
        image_width: w as i32,
        image_height: h as i32,
    };
    let valid = classify_comets(&mut comets, &ctx, sink);
    if valid == 0 {
        info!(candidates = comets.len(), "No valid comets found, nothing to analyze");
        sink.record(AnalysisEvent::NothingToAnalyze);
        return None;
    }

    let moments = flag_area_outliers(&mut comets, &config.validity, sink);
    debug!(
        valid,
        mean_area = moments.mean_area,
        std_area = moments.std_area,
        mean_height = moments.mean_height,
        std_height = moments.std_height,
        "Population moments"
    );

    // Each comet's correction is visible to the comets processed after it.
    let mut working = plane.clone();
    let mut next_id = 1u32;

    for (index, comet) in comets.iter_mut().enumerate() {
        if !comet.can_calculate_stats() {
            continue;
        }

        let hull = comet.raw_boundary.convex_hull();
        comet.shape = measure_shape(&hull, &working);
        comet.hull_boundary = Some(hull.clone());

        let Some(head) = locate_head(
            index,
            &hull,
            &comet.shape,
            &working,
            config.head_finding,
            sink,
        ) else {
            comet.status = CometStatus::InvalidNoHead;
            debug!(index, "No head found");
            continue;
        };

        comet.id = Some(next_id);
        next_id += 1;

        let profiles = correct_background(&mut working, &hull, Some(&head.region));
        comet.shape = measure_shape(&hull, &working);
        comet.measurements = Some(measure_comet(
            &comet.shape,
            &hull,
            &head.region,
            &working,
        ));
        comet.profiles = Some(profiles);
        comet.head = Some(head.region);
    }

    info!(
        comets = comets.len(),
        measured = next_id - 1,
        level = segmentation.level,
        "Image analyzed"
    );

    Some(ImageAnalysis {
        comets,
        threshold_level: segmentation.level,
        moments,
        width: w,
        height: h,
    })
}

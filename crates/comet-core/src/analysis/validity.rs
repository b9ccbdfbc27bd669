use tracing::debug;

use crate::comet::{Comet, CometStatus};

use super::config::ValidityConfig;
use super::events::{AnalysisEvent, EventSink};
use super::shape::ShapeParams;

/// Inputs shared by every rule besides the comet's own parameters.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    pub config: &'a ValidityConfig,
    pub image_width: i32,
    pub image_height: i32,
}

/// One step of the classification cascade.
pub struct ValidityRule {
    pub name: &'static str,
    /// Quantity the rule inspects, reported with its decision.
    pub metric: fn(&ShapeParams, &RuleContext) -> f64,
    /// New status given the metric and the status so far.
    pub apply: fn(f64, &RuleContext, CometStatus) -> CometStatus,
}

/// Rules in evaluation order. Later rules see the status produced by
/// earlier ones.
pub const RULES: [ValidityRule; 6] = [
    ValidityRule {
        name: "convexity",
        metric: |s, _| s.convexity,
        apply: |v, ctx, status| {
            if v < ctx.config.min_convexity {
                CometStatus::InvalidSize
            } else {
                status
            }
        },
    },
    ValidityRule {
        name: "symmetry",
        metric: |s, _| s.symmetry,
        apply: |v, ctx, status| {
            if v > ctx.config.max_symmetry {
                CometStatus::InvalidSize
            } else {
                status
            }
        },
    },
    ValidityRule {
        name: "hratio",
        metric: |s, _| s.hratio,
        apply: |v, ctx, status| {
            if v > ctx.config.max_hratio {
                CometStatus::InvalidSize
            } else {
                status
            }
        },
    },
    ValidityRule {
        name: "on_edge",
        metric: |s, ctx| {
            let b = s.bounds;
            let m = ctx.config.edge_margin;
            let on_edge = b.x <= m
                || b.y <= m
                || b.right() >= ctx.image_width - m
                || b.bottom() >= ctx.image_height - m;
            if on_edge {
                1.0
            } else {
                0.0
            }
        },
        apply: |v, _, status| {
            if v > 0.0 {
                CometStatus::InvalidSize
            } else {
                status
            }
        },
    },
    ValidityRule {
        name: "centerline_outlier",
        metric: |s, _| s.centerline_diff,
        apply: |v, ctx, status| {
            if v > ctx.config.outlier_centerline_diff && status == CometStatus::Valid {
                CometStatus::Outlier
            } else {
                status
            }
        },
    },
    ValidityRule {
        name: "centerline_invalid",
        metric: |s, _| s.centerline_diff,
        apply: |v, ctx, status| {
            if v > ctx.config.invalid_centerline_diff {
                CometStatus::InvalidSize
            } else {
                status
            }
        },
    },
];

/// Run the cascade over one comet's parameters starting from `status`.
/// Every status change is reported to `sink` under `index`.
pub fn classify(
    shape: &ShapeParams,
    ctx: &RuleContext,
    status: CometStatus,
    index: usize,
    sink: &dyn EventSink,
) -> CometStatus {
    RULES.iter().fold(status, |current, rule| {
        let value = (rule.metric)(shape, ctx);
        let next = (rule.apply)(value, ctx, current);
        if next != current {
            debug!(index, rule = rule.name, value, status = %next, "Validity rule applied");
            sink.record(AnalysisEvent::RuleApplied {
                index,
                rule: rule.name,
                value,
                status: next,
            });
        }
        next
    })
}

/// Classify every Valid comet from its current shape parameters.
/// Returns how many remain Valid.
pub fn classify_comets(comets: &mut [Comet], ctx: &RuleContext, sink: &dyn EventSink) -> usize {
    for (index, comet) in comets.iter_mut().enumerate() {
        if comet.status == CometStatus::Valid {
            comet.status = classify(&comet.shape, ctx, comet.status, index, sink);
        }
    }
    comets
        .iter()
        .filter(|c| c.status == CometStatus::Valid)
        .count()
}

/// Population moments of the Valid comets, computed by the outlier pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PopulationMoments {
    pub count: usize,
    pub mean_area: f64,
    pub std_area: f64,
    pub mean_height: f64,
    pub std_height: f64,
}

/// Mean and population standard deviation of area and height over Valid
/// comets.
pub fn population_moments(comets: &[Comet]) -> PopulationMoments {
    let valid: Vec<(f64, f64)> = comets
        .iter()
        .filter(|c| c.status == CometStatus::Valid)
        .map(|c| (c.shape.area as f64, c.shape.bounds.height as f64))
        .collect();
    let n = valid.len();
    if n == 0 {
        return PopulationMoments::default();
    }

    let nf = n as f64;
    let mean_area = valid.iter().map(|v| v.0).sum::<f64>() / nf;
    let mean_height = valid.iter().map(|v| v.1).sum::<f64>() / nf;
    let var_area = valid.iter().map(|v| (v.0 - mean_area).powi(2)).sum::<f64>() / nf;
    let var_height = valid.iter().map(|v| (v.1 - mean_height).powi(2)).sum::<f64>() / nf;

    PopulationMoments {
        count: n,
        mean_area,
        std_area: var_area.sqrt(),
        mean_height,
        std_height: var_height.sqrt(),
    }
}

/// Mark Valid comets whose area deviates from the Valid mean by at least
/// `area_outlier_sigma` population standard deviations as Outlier.
///
/// Nothing is flagged when every area is equal.
pub fn flag_area_outliers(
    comets: &mut [Comet],
    config: &ValidityConfig,
    sink: &dyn EventSink,
) -> PopulationMoments {
    let moments = population_moments(comets);
    if moments.std_area <= 0.0 {
        return moments;
    }

    let limit = config.area_outlier_sigma * moments.std_area;
    for (index, comet) in comets.iter_mut().enumerate() {
        if comet.status != CometStatus::Valid {
            continue;
        }
        let area = comet.shape.area as f64;
        if (area - moments.mean_area).abs() >= limit {
            comet.status = CometStatus::Outlier;
            debug!(index, area, mean = moments.mean_area, "Area outlier");
            sink.record(AnalysisEvent::AreaOutlier {
                index,
                area,
                mean: moments.mean_area,
                sigma: moments.std_area,
            });
        }
    }
    moments
}

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_AREA_OUTLIER_SIGMA, DEFAULT_EDGE_MARGIN, DEFAULT_INVALID_CENTERLINE_DIFF,
    DEFAULT_MAX_HEIGHT_RATIO, DEFAULT_MAX_SYMMETRY, DEFAULT_MIN_CONVEXITY,
    DEFAULT_OUTLIER_CENTERLINE_DIFF,
};
use crate::detection::SegmentationConfig;
use crate::error::{CometError, Result};

/// Which head-localization stages run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadFinding {
    /// Brightest region first, intensity profile when that fails.
    #[default]
    Auto,
    /// Brightest region only.
    Brightest,
    /// Intensity profile only.
    Profile,
}

impl std::fmt::Display for HeadFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Brightest => write!(f, "brightest"),
            Self::Profile => write!(f, "profile"),
        }
    }
}

/// Shape limits of the validity classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidityConfig {
    #[serde(default = "default_min_convexity")]
    pub min_convexity: f64,
    #[serde(default = "default_max_symmetry")]
    pub max_symmetry: f64,
    #[serde(default = "default_max_hratio")]
    pub max_hratio: f64,
    /// A bounding box within this many pixels of the image edge is rejected.
    #[serde(default = "default_edge_margin")]
    pub edge_margin: i32,
    #[serde(default = "default_outlier_centerline_diff")]
    pub outlier_centerline_diff: f64,
    #[serde(default = "default_invalid_centerline_diff")]
    pub invalid_centerline_diff: f64,
    /// Area deviation, in population standard deviations, marking an outlier.
    #[serde(default = "default_area_outlier_sigma")]
    pub area_outlier_sigma: f64,
}

fn default_min_convexity() -> f64 {
    DEFAULT_MIN_CONVEXITY
}
fn default_max_symmetry() -> f64 {
    DEFAULT_MAX_SYMMETRY
}
fn default_max_hratio() -> f64 {
    DEFAULT_MAX_HEIGHT_RATIO
}
fn default_edge_margin() -> i32 {
    DEFAULT_EDGE_MARGIN
}
fn default_outlier_centerline_diff() -> f64 {
    DEFAULT_OUTLIER_CENTERLINE_DIFF
}
fn default_invalid_centerline_diff() -> f64 {
    DEFAULT_INVALID_CENTERLINE_DIFF
}
fn default_area_outlier_sigma() -> f64 {
    DEFAULT_AREA_OUTLIER_SIGMA
}

impl Default for ValidityConfig {
    fn default() -> Self {
        Self {
            min_convexity: DEFAULT_MIN_CONVEXITY,
            max_symmetry: DEFAULT_MAX_SYMMETRY,
            max_hratio: DEFAULT_MAX_HEIGHT_RATIO,
            edge_margin: DEFAULT_EDGE_MARGIN,
            outlier_centerline_diff: DEFAULT_OUTLIER_CENTERLINE_DIFF,
            invalid_centerline_diff: DEFAULT_INVALID_CENTERLINE_DIFF,
            area_outlier_sigma: DEFAULT_AREA_OUTLIER_SIGMA,
        }
    }
}

/// Full per-image analysis configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub head_finding: HeadFinding,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub validity: ValidityConfig,
}

impl AnalysisConfig {
    /// Reject parameter combinations the analyzer cannot run with.
    pub fn validate(&self) -> Result<()> {
        let seg = &self.segmentation;
        if seg.median_radius < 0.0 {
            return Err(CometError::Config(format!(
                "median_radius must be non-negative, got {}",
                seg.median_radius
            )));
        }
        if !(seg.rolling_ball_fraction > 0.0 && seg.rolling_ball_fraction <= 1.0) {
            return Err(CometError::Config(format!(
                "rolling_ball_fraction must be in (0, 1], got {}",
                seg.rolling_ball_fraction
            )));
        }
        if let Some(max_area) = seg.particles.max_area {
            if max_area < seg.particles.min_area {
                return Err(CometError::Config(format!(
                    "max_area {} is below min_area {}",
                    max_area, seg.particles.min_area
                )));
            }
        }
        if seg.particles.min_circularity > seg.particles.max_circularity {
            return Err(CometError::Config("min_circularity exceeds max_circularity".into()));
        }
        if self.validity.area_outlier_sigma <= 0.0 {
            return Err(CometError::Config(format!(
                "area_outlier_sigma must be positive, got {}",
                self.validity.area_outlier_sigma
            )));
        }
        Ok(())
    }
}

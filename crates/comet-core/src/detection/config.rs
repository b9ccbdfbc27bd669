use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_MEDIAN_RADIUS, DEFAULT_MIN_PARTICLE_AREA, DEFAULT_OPENING_ITERATIONS,
    DEFAULT_ROLLING_BALL_FRACTION,
};

/// Method used to separate comets from the dark slide background.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdMethod {
    /// Zack's triangle method: distance from the line joining the histogram
    /// peak to its far end.
    #[default]
    Triangle,
    Huang,
    /// Level at which half the pixels are foreground.
    Percentile,
    Yen,
    Mean,
    /// Otsu's method: maximizes between-class variance.
    Otsu,
    Li,
    Intermodes,
    IsoData,
    MaxEntropy,
    Moments,
    /// User-specified fixed level in [0, 255].
    Fixed(u8),
}

impl std::fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Triangle => write!(f, "Triangle"),
            Self::Huang => write!(f, "Huang"),
            Self::Percentile => write!(f, "Percentile"),
            Self::Yen => write!(f, "Yen"),
            Self::Mean => write!(f, "Mean"),
            Self::Otsu => write!(f, "Otsu"),
            Self::Li => write!(f, "Li"),
            Self::Intermodes => write!(f, "Intermodes"),
            Self::IsoData => write!(f, "IsoData"),
            Self::MaxEntropy => write!(f, "MaxEntropy"),
            Self::Moments => write!(f, "Moments"),
            Self::Fixed(level) => write!(f, "Fixed({})", level),
        }
    }
}

/// Configuration for comet segmentation in a single image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Thresholding method.
    #[serde(default)]
    pub threshold_method: ThresholdMethod,
    /// Median-filter denoise and rolling-ball subtraction before thresholding.
    #[serde(default = "default_background_correction")]
    pub background_correction: bool,
    /// Radius of the median filter used by background correction.
    #[serde(default = "default_median_radius")]
    pub median_radius: f64,
    /// Rolling-ball radius as a fraction of the shorter image side.
    #[serde(default = "default_rolling_ball_fraction")]
    pub rolling_ball_fraction: f64,
    /// Erosions (then dilations) in the foreground opening.
    #[serde(default = "default_opening_iterations")]
    pub opening_iterations: usize,
    #[serde(default)]
    pub particles: ParticleFilter,
}

/// Size and shape limits for extracted particles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleFilter {
    /// Minimum particle area in pixels (holes counted when included).
    #[serde(default = "default_min_area")]
    pub min_area: usize,
    /// Maximum particle area; `None` means unbounded.
    #[serde(default)]
    pub max_area: Option<usize>,
    #[serde(default)]
    pub min_circularity: f64,
    #[serde(default = "default_max_circularity")]
    pub max_circularity: f64,
    /// Drop particles whose bounding box touches the image border.
    #[serde(default = "default_true")]
    pub exclude_edges: bool,
    /// Fill interior holes so they count as part of the particle.
    #[serde(default = "default_true")]
    pub include_holes: bool,
}

fn default_background_correction() -> bool {
    true
}
fn default_median_radius() -> f64 {
    DEFAULT_MEDIAN_RADIUS
}
fn default_rolling_ball_fraction() -> f64 {
    DEFAULT_ROLLING_BALL_FRACTION
}
fn default_opening_iterations() -> usize {
    DEFAULT_OPENING_ITERATIONS
}
fn default_min_area() -> usize {
    DEFAULT_MIN_PARTICLE_AREA
}
fn default_max_circularity() -> f64 {
    1.0
}
fn default_true() -> bool {
    true
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            threshold_method: ThresholdMethod::default(),
            background_correction: true,
            median_radius: DEFAULT_MEDIAN_RADIUS,
            rolling_ball_fraction: DEFAULT_ROLLING_BALL_FRACTION,
            opening_iterations: DEFAULT_OPENING_ITERATIONS,
            particles: ParticleFilter::default(),
        }
    }
}

impl Default for ParticleFilter {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_MIN_PARTICLE_AREA,
            max_area: None,
            min_circularity: 0.0,
            max_circularity: 1.0,
            exclude_edges: true,
            include_holes: true,
        }
    }
}

/// Number of intensity bins in an 8-bit histogram.
pub const HISTOGRAM_BINS: usize = 256;

/// Minimum row count (image height) to use row-level Rayon parallelism in filters.
pub const PARALLEL_ROW_THRESHOLD: usize = 64;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f64 = 1e-10;

// ---------------------------------------------------------------------------
// Segmentation
// ---------------------------------------------------------------------------

/// Smallest particle area (pixels, holes included) accepted as a comet.
pub const DEFAULT_MIN_PARTICLE_AREA: usize = 400;

/// Number of erosions (then dilations) in the foreground opening.
pub const DEFAULT_OPENING_ITERATIONS: usize = 3;

/// Radius of the denoising median filter applied before thresholding.
pub const DEFAULT_MEDIAN_RADIUS: f64 = 10.0;

/// Rolling-ball radius as a fraction of the shorter image side.
pub const DEFAULT_ROLLING_BALL_FRACTION: f64 = 0.3;

// ---------------------------------------------------------------------------
// Validity rules
// ---------------------------------------------------------------------------

/// Below this convexity a comet is rejected for shape.
pub const DEFAULT_MIN_CONVEXITY: f64 = 0.85;

/// Above this vertical asymmetry a comet is rejected for shape.
pub const DEFAULT_MAX_SYMMETRY: f64 = 0.5;

/// Above this height/width ratio a comet is rejected for shape.
pub const DEFAULT_MAX_HEIGHT_RATIO: f64 = 1.05;

/// Distance (pixels) from the image edge at which a comet counts as touching it.
pub const DEFAULT_EDGE_MARGIN: i32 = 1;

/// Centerline deviation above which a still-valid comet becomes an outlier.
pub const DEFAULT_OUTLIER_CENTERLINE_DIFF: f64 = 0.15;

/// Centerline deviation above which a comet is rejected for shape.
pub const DEFAULT_INVALID_CENTERLINE_DIFF: f64 = 0.2;

/// Area deviation, in population standard deviations, marking an outlier.
pub const DEFAULT_AREA_OUTLIER_SIGMA: f64 = 2.0;

// ---------------------------------------------------------------------------
// Head localization
// ---------------------------------------------------------------------------

/// Fraction of the leading bounding width used to compute the front centroid.
pub const FRONT_WIDTH_FRACTION: f64 = 0.1;

/// Cumulative histogram fraction above which pixels count as the brightest region.
pub const BRIGHTEST_FRACTION: f64 = 0.95;

/// Comets less circular than this are checked for streak-shaped bright regions.
pub const STREAK_CIRCULARITY: f64 = 0.9;

/// Bright-region width/height ratio that marks a streak.
pub const STREAK_ASPECT_RATIO: i32 = 2;

/// Half height of the horizontal strip used for elongated comet profiles.
pub const PROFILE_STRIP_HALF_HEIGHT: i32 = 5;

/// Profile smoothing window is the comet width divided by this.
pub const PROFILE_SMOOTHING_DIVISOR: usize = 10;

// ---------------------------------------------------------------------------
// Local background
// ---------------------------------------------------------------------------

/// Background strip height is the comet height divided by this.
pub const BACKGROUND_STRIP_DIVISOR: f64 = 5.0;

/// Minimum background strip height in pixels.
pub const MIN_BACKGROUND_STRIP_HEIGHT: i32 = 10;

/// Column radius of the background profile smoothing.
pub const BACKGROUND_SMOOTHING_RADIUS: usize = 2;

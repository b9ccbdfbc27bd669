use serde::{Deserialize, Serialize};

use crate::analysis::local_background::Profiles;
use crate::analysis::measure::Measurements;
use crate::analysis::shape::ShapeParams;
use crate::geometry::{Rect, Region};

/// Classification of a comet. Exactly one applies at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CometStatus {
    Valid,
    /// No head could be located; measurements cannot be computed.
    InvalidNoHead,
    /// Rejected for shape, still measured.
    InvalidSize,
    /// Statistically atypical, still measured.
    Outlier,
    /// Removed by the user.
    Deleted,
}

impl CometStatus {
    pub fn can_calculate_stats(self) -> bool {
        matches!(self, Self::Valid | Self::InvalidSize | Self::Outlier)
    }

    /// Next status in the manual relabel cycle
    /// `Valid -> InvalidSize -> Outlier -> InvalidSize`.
    pub fn relabel(self) -> Self {
        match self {
            Self::Valid => Self::InvalidSize,
            Self::InvalidSize => Self::Outlier,
            Self::Outlier => Self::InvalidSize,
            other => other,
        }
    }

    /// Label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Valid => "normal",
            Self::InvalidSize => "size_invalid",
            Self::InvalidNoHead => "no_head",
            Self::Outlier => "outlier",
            Self::Deleted => "deleted",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::Valid => 1,
            Self::InvalidNoHead => 1 << 1,
            Self::InvalidSize => 1 << 2,
            Self::Outlier => 1 << 3,
            Self::Deleted => 1 << 4,
        }
    }
}

impl std::fmt::Display for CometStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A set of statuses used to filter comet populations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StatusSet(u8);

impl StatusSet {
    pub const EMPTY: Self = Self(0);
    pub const VALID: Self = Self(1);
    pub const INVALID_NO_HEAD: Self = Self(1 << 1);
    pub const INVALID_SIZE: Self = Self(1 << 2);
    pub const OUTLIER: Self = Self(1 << 3);
    pub const DELETED: Self = Self(1 << 4);
    /// Every status whose comets carry measurements.
    pub const MEASURABLE: Self = Self(1 | 1 << 2 | 1 << 3);

    pub fn contains(self, status: CometStatus) -> bool {
        self.0 & status.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<CometStatus> for StatusSet {
    fn from(status: CometStatus) -> Self {
        Self(status.bit())
    }
}

impl std::ops::BitOr for StatusSet {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOr<CometStatus> for StatusSet {
    type Output = Self;
    fn bitor(self, rhs: CometStatus) -> Self {
        Self(self.0 | rhs.bit())
    }
}

/// Populations reported in the summary statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grouping {
    Normal,
    NormalOutlier,
    NormalInvalidSize,
    AllMeasurable,
}

impl Grouping {
    pub const ALL: [Grouping; 4] = [
        Self::Normal,
        Self::NormalOutlier,
        Self::NormalInvalidSize,
        Self::AllMeasurable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::NormalOutlier => "normal+outlier",
            Self::NormalInvalidSize => "normal+invalid_size",
            Self::AllMeasurable => "all_measurable",
        }
    }

    pub fn statuses(self) -> StatusSet {
        match self {
            Self::Normal => StatusSet::VALID,
            Self::NormalOutlier => StatusSet::VALID | StatusSet::OUTLIER,
            Self::NormalInvalidSize => StatusSet::VALID | StatusSet::INVALID_SIZE,
            Self::AllMeasurable => StatusSet::MEASURABLE,
        }
    }
}

impl std::fmt::Display for Grouping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One segmented comet and everything derived from it.
#[derive(Clone, Debug)]
pub struct Comet {
    /// Sequential 1-based id; absent for comets without a head.
    pub id: Option<u32>,
    pub status: CometStatus,
    /// Region as segmented.
    pub raw_boundary: Region,
    /// Convex hull of the raw region, set once the comet is processed.
    pub hull_boundary: Option<Region>,
    pub head: Option<Region>,
    /// Shape parameters of the current boundary, from the latest pass.
    pub shape: ShapeParams,
    pub profiles: Option<Profiles>,
    pub measurements: Option<Measurements>,
}

impl Comet {
    pub fn new(raw_boundary: Region, shape: ShapeParams) -> Self {
        Self {
            id: None,
            status: CometStatus::Valid,
            raw_boundary,
            hull_boundary: None,
            head: None,
            shape,
            profiles: None,
            measurements: None,
        }
    }

    /// The hull when set, else the raw region.
    pub fn boundary(&self) -> &Region {
        self.hull_boundary.as_ref().unwrap_or(&self.raw_boundary)
    }

    pub fn bounds(&self) -> Rect {
        self.boundary().bounds()
    }

    pub fn can_calculate_stats(&self) -> bool {
        self.status.can_calculate_stats()
    }
}

use std::sync::Mutex;

use crate::comet::CometStatus;

/// Step of head localization a rejection came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadStage {
    /// Brightest-region search.
    Brightest,
    /// Intensity-profile edge detection.
    Profile,
}

/// Why a head candidate was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadRejection {
    NoBrightPixels,
    /// Bright region is a horizontal streak on a non-circular comet.
    Streak,
    /// Bright region center lies further right than the head radius.
    Displaced,
    /// Head circle does not overlap the comet.
    EmptyHead,
}

impl std::fmt::Display for HeadRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoBrightPixels => write!(f, "no bright pixels"),
            Self::Streak => write!(f, "bright region is a streak"),
            Self::Displaced => write!(f, "bright region too far from the front"),
            Self::EmptyHead => write!(f, "head area zero"),
        }
    }
}

/// A classification or localization decision made during analysis.
///
/// `index` is the comet's position in discovery order within its image.
#[derive(Clone, Debug, PartialEq)]
pub enum AnalysisEvent {
    /// A validity rule changed a comet's status.
    RuleApplied {
        index: usize,
        rule: &'static str,
        value: f64,
        status: CometStatus,
    },
    /// The population pass flagged a comet by area.
    AreaOutlier {
        index: usize,
        area: f64,
        mean: f64,
        sigma: f64,
    },
    HeadRejected {
        index: usize,
        stage: HeadStage,
        reason: HeadRejection,
    },
    HeadFound {
        index: usize,
        stage: HeadStage,
        radius: i32,
    },
    /// No valid comet survived the first classification pass.
    NothingToAnalyze,
}

/// Receiver of analysis decisions. All methods default to no-ops.
pub trait EventSink: Send + Sync {
    fn record(&self, _event: AnalysisEvent) {}
}

/// Sink that discards every event.
pub struct NoOpSink;
impl EventSink for NoOpSink {}

/// Sink that keeps every event in order, for inspection and tests.
#[derive(Debug, Default)]
pub struct DecisionLog {
    events: Mutex<Vec<AnalysisEvent>>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<AnalysisEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for DecisionLog {
    fn record(&self, event: AnalysisEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

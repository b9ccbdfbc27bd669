use std::path::PathBuf;

use crate::analysis::ImageAnalysis;
use crate::comet::Comet;

/// Batch processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Analyzing,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analyzing => write!(f, "Analyzing images"),
            Self::Writing => write!(f, "Writing report"),
        }
    }
}

/// Thread-safe progress reporting for a batch.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started with `total_items` work items, if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Outcome of one successfully loaded image.
#[derive(Clone, Debug)]
pub struct ImageResult {
    pub path: PathBuf,
    /// Report key: the file stem.
    pub name: String,
    /// `None` when no valid comet was found.
    pub analysis: Option<ImageAnalysis>,
    /// Why the annotated image could not be written, if it was requested.
    pub overlay_error: Option<String>,
}

/// An image that could not be loaded.
#[derive(Clone, Debug)]
pub struct ImageFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Clone, Debug, Default)]
pub struct BatchResult {
    pub images: Vec<ImageResult>,
    pub failures: Vec<ImageFailure>,
}

impl BatchResult {
    /// `(name, analysis)` pairs of every analyzed image, in input order.
    pub fn report_entries(&self) -> Vec<(&str, &ImageAnalysis)> {
        self.images
            .iter()
            .filter_map(|r| r.analysis.as_ref().map(|a| (r.name.as_str(), a)))
            .collect()
    }

    /// Every comet of every analyzed image.
    pub fn comets(&self) -> impl Iterator<Item = &Comet> {
        self.images
            .iter()
            .filter_map(|r| r.analysis.as_ref())
            .flat_map(|a| a.comets.iter())
    }
}

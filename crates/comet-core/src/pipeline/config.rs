use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisConfig;

/// Batch run configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Images to analyze, in report order.
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    /// CSV report path; no report is written when absent.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Directory for annotated `<image>_out.png` files.
    #[serde(default)]
    pub overlay_dir: Option<PathBuf>,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

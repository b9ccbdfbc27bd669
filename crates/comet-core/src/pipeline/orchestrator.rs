use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::{analyze_plane, EventSink, NoOpSink};
use crate::error::{CometError, Result};
use crate::io::{load_plane, save_overlay, save_report};

use super::config::PipelineConfig;
use super::types::{
    BatchResult, ImageFailure, ImageResult, NoOpReporter, PipelineStage, ProgressReporter,
};

/// Report key of an image: its file stem.
pub fn image_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Analyze every input image in order, then write the report and overlays
/// the config asks for.
///
/// Images that fail to load are recorded in [`BatchResult::failures`] and
/// overlay write errors in [`ImageResult::overlay_error`]; the batch continues
/// past both. Errors writing the report are returned.
pub fn run_batch_reported(
    config: &PipelineConfig,
    reporter: Arc<dyn ProgressReporter>,
    sink: &dyn EventSink,
) -> Result<BatchResult> {
    if config.inputs.is_empty() {
        return Err(CometError::EmptyBatch);
    }
    config.analysis.validate()?;

    let mut result = BatchResult::default();
    reporter.begin_stage(PipelineStage::Analyzing, Some(config.inputs.len()));

    for (i, path) in config.inputs.iter().enumerate() {
        let name = image_name(path);
        match load_plane(path) {
            Ok(plane) => {
                info!(image = %name, width = plane.width(), height = plane.height(), "Analyzing image");
                let analysis = analyze_plane(&plane, &config.analysis, sink);
                if analysis.is_none() {
                    warn!(image = %name, "No comets to analyze");
                }
                let mut overlay_error = None;
                if let (Some(dir), Some(analysis)) = (&config.overlay_dir, &analysis) {
                    let out = dir.join(format!("{name}_out.png"));
                    if let Err(e) = save_overlay(&plane, analysis, &out) {
                        warn!(path = %out.display(), error = %e, "Failed to write overlay");
                        overlay_error = Some(e.to_string());
                    }
                }
                result.images.push(ImageResult {
                    path: path.clone(),
                    name,
                    analysis,
                    overlay_error,
                });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping image");
                result.failures.push(ImageFailure {
                    path: path.clone(),
                    error: e.to_string(),
                });
            }
        }
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    if let Some(output) = &config.output {
        reporter.begin_stage(PipelineStage::Writing, None);
        save_report(output, &result.report_entries())?;
        reporter.finish_stage();
    }

    info!(
        images = result.images.len(),
        failures = result.failures.len(),
        "Batch complete"
    );
    Ok(result)
}

/// Run a batch without progress reporting or decision events.
pub fn run_batch(config: &PipelineConfig) -> Result<BatchResult> {
    run_batch_reported(config, Arc::new(NoOpReporter), &NoOpSink)
}

pub mod config;
mod orchestrator;
mod types;

pub use config::PipelineConfig;
pub use orchestrator::{image_name, run_batch, run_batch_reported};
pub use types::{
    BatchResult, ImageFailure, ImageResult, NoOpReporter, PipelineStage, ProgressReporter,
};

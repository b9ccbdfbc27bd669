pub mod background;
pub mod components;
pub mod config;
pub mod morphology;
pub mod segment;
pub mod threshold;

pub use config::{ParticleFilter, SegmentationConfig, ThresholdMethod};
pub use segment::{segment_comets, Segmentation};

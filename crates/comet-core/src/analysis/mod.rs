pub mod analyzer;
pub mod config;
pub mod events;
pub mod head;
pub mod local_background;
pub mod measure;
pub mod shape;
pub mod signal;
pub mod validity;

pub use analyzer::{analyze_plane, ImageAnalysis};
pub use config::{AnalysisConfig, HeadFinding, ValidityConfig};
pub use events::{AnalysisEvent, DecisionLog, EventSink, HeadRejection, HeadStage, NoOpSink};
pub use measure::Measurements;
pub use shape::ShapeParams;

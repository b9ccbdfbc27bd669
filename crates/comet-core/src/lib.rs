pub mod analysis;
pub mod comet;
pub mod consts;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod io;
pub mod pipeline;
pub mod plane;
pub mod stats;

pub use analysis::{analyze_plane, AnalysisConfig, ImageAnalysis};
pub use comet::{Comet, CometStatus, Grouping, StatusSet};
pub use error::{CometError, Result};
pub use plane::GrayPlane;

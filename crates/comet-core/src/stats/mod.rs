mod field;
mod summary;

pub use field::{FieldStats, MeasurementField};
pub use summary::{summarize, summarize_groupings, PopulationSummary};

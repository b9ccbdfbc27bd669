pub mod hull;
pub mod outline;
pub mod rect;
pub mod region;
pub mod stats;

pub use rect::Rect;
pub use region::{Outline, Region};
pub use stats::{region_stats, RegionStats};

pub mod image_io;
pub mod overlay;
pub mod report;

pub use image_io::{load_plane, save_png, to_gray_plane};
pub use overlay::{render_overlay, save_overlay};
pub use report::{save_report, write_report};

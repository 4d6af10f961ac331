pub mod render;
pub mod summary;

pub use render::{render_label_colors, render_mean_colors};
pub use summary::{RegionSummary, SegmentationSummary};

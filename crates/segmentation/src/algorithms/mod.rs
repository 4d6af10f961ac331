pub mod connected;
pub mod edge_weights;
pub mod fh04;
pub mod mean_shift;
pub mod preprocessing;
pub mod region_color;
pub mod union_find;

pub use connected::{region_adjacency, split_connected};
pub use edge_weights::{compute_edge_weights, edge_weights, expected_edge_count};
pub use fh04::{segment_fh, SegmentFh04};
pub use mean_shift::{mean_shift_segment, MeanShiftModes, MeanShiftSearch, SegmentMeanShift};
pub use preprocessing::GaussianBlurPreprocessor;
pub use region_color::{region_mean_color, RegionColors, RegionStats};
pub use union_find::DisjointSet;

//! # Image Segmentation Library
//!
//! Region segmentation of grayscale and multi-band images.
//!
//! ## Core Features
//!
//! - **Graph-based segmentation**: Felzenszwalb-Huttenlocher (2004) over a 4- or
//!   8-connected pixel graph, with a minimum region size
//! - **Mean-shift segmentation**: per-pixel mode seeking in joint position/color
//!   space, with merging of similar neighbors and pruning of small regions
//! - **Region statistics**: mean color of every region
//! - **Pipeline System**: optional preprocessing followed by a segmenter
//! - **Generic pixels**: any `image` pixel whose channels convert to `f32`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use segmentation::Pipeline;
//!
//! let image = image::open("photo.png")?.to_rgb8();
//! let mut pipeline = Pipeline::builder().with_blur(0.8).build();
//! let result = pipeline.process(&image)?;
//!
//! println!("{} regions", result.segmentation.num_regions());
//! result.save_mean_colors("segmented.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Using the algorithms directly
//!
//! ```rust
//! use image::{GrayImage, Luma};
//! use segmentation::{edge_weights, region_mean_color, segment_fh, ConnectRule, Segmentation};
//!
//! let image = GrayImage::from_fn(4, 4, |_, y| Luma([if y < 2 { 10 } else { 200 }]));
//! let edges = edge_weights(&image, ConnectRule::Four);
//! let labeling = segment_fh(&edges, 16, 50.0, 1)?;
//! let segmentation = Segmentation::from_labeling(4, 4, labeling)?;
//! let colors = region_mean_color(&segmentation.labels, &image, segmentation.num_regions())?;
//!
//! assert_eq!(segmentation.region_sizes, vec![8, 8]);
//! assert_eq!(colors.get(1), &[200.0]);
//! # Ok::<(), segmentation::SegmentationError>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod pixel;
pub mod traits;
pub mod algorithms;
pub mod config;
pub mod pipeline;
pub mod io;

// Re-exports for convenience
pub use error::{SegmentationError, Result};
pub use types::{ConnectRule, Edge, LabelImage, Labeling, Segmentation, SegmentedImage};
pub use pixel::BandPixel;
pub use traits::*;
pub use algorithms::*;
pub use config::{ConfigFh04, ConfigMeanShift, SegmentationAlgorithm};
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use io::*;

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn create_test_image() -> RgbImage {
        let mut img = RgbImage::from_pixel(40, 30, Rgb([20, 40, 60]));
        for y in 10..25 {
            for x in 12..30 {
                img.put_pixel(x, y, Rgb([220, 180, 40]));
            }
        }
        img
    }

    #[test]
    fn test_pipeline_basic() {
        let mut pipeline = Pipeline::builder().build();
        let image = create_test_image();

        let result = pipeline.process(&image).expect("Should process successfully");
        assert_eq!(result.segmentation.num_regions(), 2);
        assert_eq!(result.segmentation.width(), 40);
        assert_eq!(result.segmentation.height(), 30);
        assert_eq!(result.region_colors.get(1), &[220.0, 180.0, 40.0]);
    }

    #[test]
    fn test_pipeline_with_blur() {
        let mut pipeline = Pipeline::builder().with_blur(0.8).build();
        let image = create_test_image();

        let result = pipeline.process(&image).expect("Should process successfully");
        assert!(result.segmentation.num_regions() >= 2);
        assert!(pipeline.info().contains("1 preprocessors"));
    }

    #[test]
    fn test_pipeline_from_algorithm() {
        let algorithm = SegmentationAlgorithm::MeanShift(ConfigMeanShift {
            spatial_radius: 3,
            min_region_size: 10,
            ..ConfigMeanShift::default()
        });
        let mut pipeline = Pipeline::builder()
            .with_algorithm(&algorithm)
            .expect("valid config")
            .build();
        let image = create_test_image();

        let result = pipeline.process(&image).expect("Should process successfully");
        assert_eq!(result.segmentation.num_regions(), 2);
        assert!(pipeline.info().contains("mean_shift"));
    }

    #[test]
    fn test_custom_segmenter() {
        let mut pipeline = Pipeline::builder()
            .set_segmenter(SegmentFh04::new(50.0, 1, ConnectRule::Four).expect("valid k"))
            .build();
        let image = GrayImage::from_fn(4, 4, |_, y| Luma([if y < 2 { 10 } else { 200 }]));

        let result = pipeline.process(&image).expect("Should process successfully");
        assert_eq!(result.segmentation.region_sizes, vec![8, 8]);
        assert_eq!(result.region_colors.get(0), &[10.0]);
    }
}

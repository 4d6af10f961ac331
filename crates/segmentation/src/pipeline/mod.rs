pub mod builder;

use imageproc::definitions::Image;
use tracing::info;
use crate::{
    algorithms::region_color::region_mean_color,
    error::Result,
    pixel::BandPixel,
    traits::{ImagePreprocessor, ImageSegmenter},
    types::SegmentedImage,
};

/// A segmentation pipeline: preprocessing stages followed by one segmenter
pub struct Pipeline<P: BandPixel> {
    preprocessors: Vec<Box<dyn ImagePreprocessor<P>>>,
    segmenter: Box<dyn ImageSegmenter<P>>,
}

impl<P: BandPixel> Pipeline<P> {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder<P> {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        preprocessors: Vec<Box<dyn ImagePreprocessor<P>>>,
        segmenter: Box<dyn ImageSegmenter<P>>,
    ) -> Self {
        Self {
            preprocessors,
            segmenter,
        }
    }

    /// Process an image through the entire pipeline
    pub fn process(&mut self, image: &Image<P>) -> Result<SegmentedImage> {
        // Step 1: Apply all preprocessors in sequence
        let mut processed: Option<Image<P>> = None;
        for preprocessor in &self.preprocessors {
            let next = preprocessor.preprocess(processed.as_ref().unwrap_or(image))?;
            processed = Some(next);
        }

        // Step 2: Segment
        let segmentation = self.segmenter.segment(processed.as_ref().unwrap_or(image))?;

        // Step 3: Region colors are measured on the unfiltered input
        let region_colors = region_mean_color(&segmentation.labels, image, segmentation.num_regions())?;

        info!(
            algorithm = self.segmenter.name(),
            regions = segmentation.num_regions(),
            "segmented {}x{} image",
            image.width(),
            image.height()
        );

        Ok(SegmentedImage {
            segmentation,
            region_colors,
        })
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: {} preprocessors, segmenter {}",
            self.preprocessors.len(),
            self.segmenter.name()
        )
    }
}

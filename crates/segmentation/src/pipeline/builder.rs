use imageproc::definitions::Clamp;
use crate::{
    algorithms::{GaussianBlurPreprocessor, SegmentFh04},
    config::SegmentationAlgorithm,
    error::Result,
    pipeline::Pipeline,
    pixel::BandPixel,
    traits::{ImagePreprocessor, ImageSegmenter},
};

/// Builder for creating segmentation pipelines with a fluent API
pub struct PipelineBuilder<P: BandPixel> {
    preprocessors: Vec<Box<dyn ImagePreprocessor<P>>>,
    segmenter: Option<Box<dyn ImageSegmenter<P>>>,
}

impl<P: BandPixel> PipelineBuilder<P> {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            preprocessors: Vec::new(),
            segmenter: None,
        }
    }

    /// Add a preprocessor to the pipeline
    pub fn add_preprocessor<T>(mut self, preprocessor: T) -> Self
    where
        T: ImagePreprocessor<P> + 'static,
    {
        self.preprocessors.push(Box::new(preprocessor));
        self
    }

    /// Set the segmenter (replaces any existing one)
    pub fn set_segmenter<S>(mut self, segmenter: S) -> Self
    where
        S: ImageSegmenter<P> + 'static,
    {
        self.segmenter = Some(Box::new(segmenter));
        self
    }

    /// Use the segmenter described by `algorithm`
    pub fn with_algorithm(mut self, algorithm: &SegmentationAlgorithm) -> Result<Self> {
        self.segmenter = Some(algorithm.build()?);
        Ok(self)
    }

    /// Build the pipeline, defaulting to FH04 with default parameters
    pub fn build(self) -> Pipeline<P> {
        let segmenter = self.segmenter
            .unwrap_or_else(|| Box::new(SegmentFh04::default()));

        Pipeline::new(self.preprocessors, segmenter)
    }
}

impl<P> PipelineBuilder<P>
where
    P: BandPixel,
    P::Subpixel: Into<f32> + Clamp<f32>,
{
    /// Add Gaussian smoothing as a preprocessing step
    pub fn with_blur(self, sigma: f32) -> Self {
        self.add_preprocessor(GaussianBlurPreprocessor { sigma })
    }
}

impl<P: BandPixel> Default for PipelineBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

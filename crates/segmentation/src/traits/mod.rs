use imageproc::definitions::Image;
use crate::{error::Result, pixel::BandPixel, types::Segmentation};

/// Trait for image preprocessing algorithms
pub trait ImagePreprocessor<P: BandPixel>: Send + Sync {
    /// Preprocess the input image (e.g., blur)
    fn preprocess(&self, image: &Image<P>) -> Result<Image<P>>;
}

/// Trait for segmentation algorithms producing one label per pixel
pub trait ImageSegmenter<P: BandPixel>: Send + Sync {
    /// Segment the image into regions.
    ///
    /// Takes `&mut self` so implementations can keep scratch buffers between calls.
    fn segment(&mut self, image: &Image<P>) -> Result<Segmentation>;

    /// Short identifier of the algorithm
    fn name(&self) -> &'static str;
}

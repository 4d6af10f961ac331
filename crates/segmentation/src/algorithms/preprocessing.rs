use imageproc::definitions::{Clamp, Image};
use crate::{
    error::{Result, SegmentationError},
    pixel::BandPixel,
    traits::ImagePreprocessor,
};

/// Gaussian blur preprocessor for noise reduction
#[derive(Debug, Clone)]
pub struct GaussianBlurPreprocessor {
    pub sigma: f32,
}

impl Default for GaussianBlurPreprocessor {
    fn default() -> Self {
        // Smoothing used in the FH04 paper
        Self { sigma: 0.8 }
    }
}

impl<P> ImagePreprocessor<P> for GaussianBlurPreprocessor
where
    P: BandPixel,
    P::Subpixel: Into<f32> + Clamp<f32>,
{
    fn preprocess(&self, image: &Image<P>) -> Result<Image<P>> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(SegmentationError::invalid(
                "sigma",
                format!("must be finite and > 0, got {}", self.sigma),
            ));
        }
        Ok(imageproc::filter::gaussian_blur_f32(image, self.sigma))
    }
}

use image::Pixel;
use imageproc::definitions::Image;

/// A pixel whose channels can be read as `f32` band values.
///
/// Implemented for every `image::Pixel` whose subpixel converts into `f32`,
/// which covers `Luma`/`Rgb`/`Rgba` over `u8`, `u16` and `f32`.
pub trait BandPixel: Pixel + 'static {
    /// Convert a single channel value to `f32`.
    fn sample(value: Self::Subpixel) -> f32;

    /// Number of bands per pixel.
    fn bands() -> usize {
        Self::CHANNEL_COUNT as usize
    }
}

impl<P> BandPixel for P
where
    P: Pixel + 'static,
    P::Subpixel: Into<f32>,
{
    #[inline]
    fn sample(value: Self::Subpixel) -> f32 {
        value.into()
    }
}

/// Read the bands of the pixel at flattened `index` into `out`.
#[inline]
pub(crate) fn read_bands<P: BandPixel>(image: &Image<P>, index: usize, out: &mut [f32]) {
    let bands = P::bands();
    let raw = &image.as_raw()[index * bands..(index + 1) * bands];
    for (dst, &src) in out.iter_mut().zip(raw) {
        *dst = P::sample(src);
    }
}

/// Squared Euclidean distance between two band vectors.
#[inline]
pub(crate) fn distance_sq(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    #[test]
    fn reads_interleaved_bands() {
        let img: Image<Rgb<u8>> = ImageBuffer::from_fn(2, 1, |x, _| Rgb([x as u8, 10, 20]));
        let mut out = [0.0; 3];
        read_bands(&img, 1, &mut out);
        assert_eq!(out, [1.0, 10.0, 20.0]);
        assert_eq!(<Rgb<u8> as BandPixel>::bands(), 3);
        assert_eq!(<Luma<f32> as BandPixel>::bands(), 1);
    }
}

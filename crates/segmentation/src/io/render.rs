use image::{Rgb, RgbImage};
use crate::{
    algorithms::region_color::RegionColors,
    error::{Result, SegmentationError},
    types::{SegmentedImage, Segmentation},
};

/// Paint every pixel with the mean color of its region.
///
/// Single-band colors are replicated to gray; otherwise the first three
/// bands are used. Values are clamped to `[0, 255]`.
pub fn render_mean_colors(segmentation: &Segmentation, colors: &RegionColors) -> Result<RgbImage> {
    if colors.num_regions() < segmentation.num_regions() {
        return Err(SegmentationError::invalid(
            "colors",
            format!(
                "{} region colors for {} regions",
                colors.num_regions(),
                segmentation.num_regions()
            ),
        ));
    }

    let palette: Vec<Rgb<u8>> = colors.iter().map(to_rgb).collect();
    Ok(RgbImage::from_fn(segmentation.width(), segmentation.height(), |x, y| {
        palette[segmentation.region_at(x, y) as usize]
    }))
}

/// Paint every region with a distinct, deterministic color.
pub fn render_label_colors(segmentation: &Segmentation) -> RgbImage {
    RgbImage::from_fn(segmentation.width(), segmentation.height(), |x, y| {
        label_color(segmentation.region_at(x, y))
    })
}

fn to_rgb(color: &[f32]) -> Rgb<u8> {
    let clamp = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    match color {
        [gray] => Rgb([clamp(*gray); 3]),
        [r, g, b, ..] => Rgb([clamp(*r), clamp(*g), clamp(*b)]),
        [a, b] => Rgb([clamp(*a), clamp(*b), 0]),
        [] => Rgb([0, 0, 0]),
    }
}

/// Hash a label into a bright color.
fn label_color(label: u32) -> Rgb<u8> {
    let mut h = label.wrapping_mul(0x9E37_79B9) ^ 0x5bd1_e995;
    h ^= h >> 15;
    h = h.wrapping_mul(0x2c1b_3c6d);
    h ^= h >> 12;
    let [r, g, b, _] = h.to_le_bytes();
    Rgb([r | 0x40, g | 0x40, b | 0x40])
}

impl SegmentedImage {
    /// Render the segmentation with region mean colors
    pub fn render_mean_colors(&self) -> Result<RgbImage> {
        render_mean_colors(&self.segmentation, &self.region_colors)
    }

    /// Save the mean-color rendering; the format follows the file extension
    pub fn save_mean_colors(&self, path: &str) -> Result<()> {
        self.render_mean_colors()?.save(path)?;
        Ok(())
    }

    /// Save a rendering with one arbitrary color per region
    pub fn save_label_colors(&self, path: &str) -> Result<()> {
        render_label_colors(&self.segmentation).save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algorithms::fh04::SegmentFh04, algorithms::region_color::region_mean_color, types::ConnectRule};
    use image::{GrayImage, Luma};

    fn two_halves() -> (GrayImage, Segmentation) {
        let img = GrayImage::from_fn(4, 4, |_, y| Luma([if y < 2 { 10 } else { 200 }]));
        let seg = SegmentFh04::new(50.0, 1, ConnectRule::Four)
            .expect("valid k")
            .segment(&img)
            .expect("segments");
        (img, seg)
    }

    #[test]
    fn mean_color_rendering_reproduces_flat_regions() {
        let (img, seg) = two_halves();
        let colors = region_mean_color(&seg.labels, &img, seg.num_regions()).expect("matching shapes");
        let rendered = render_mean_colors(&seg, &colors).expect("enough colors");
        assert_eq!(rendered.get_pixel(0, 0), &Rgb([10, 10, 10]));
        assert_eq!(rendered.get_pixel(3, 3), &Rgb([200, 200, 200]));
    }

    #[test]
    fn label_rendering_distinguishes_regions() {
        let (_, seg) = two_halves();
        let rendered = render_label_colors(&seg);
        assert_ne!(rendered.get_pixel(0, 0), rendered.get_pixel(0, 3));
        assert_eq!(rendered.get_pixel(0, 0), rendered.get_pixel(3, 1));
    }
}

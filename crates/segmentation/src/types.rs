use image::{ImageBuffer, Luma};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::{
    algorithms::region_color::RegionColors,
    error::{Result, SegmentationError},
};

/// One region id per pixel.
pub type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Which pixel pairs count as adjacent.
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames,
    PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectRule {
    /// Horizontal and vertical neighbors
    Four,
    /// Horizontal, vertical and diagonal neighbors
    #[default]
    Eight,
}

impl ConnectRule {
    /// Neighbor offsets that visit every unordered adjacent pair exactly once
    /// when applied to every pixel in raster order.
    pub fn forward_offsets(self) -> &'static [(i64, i64)] {
        match self {
            ConnectRule::Four => &[(1, 0), (0, 1)],
            ConnectRule::Eight => &[(1, 0), (0, 1), (1, 1), (-1, 1)],
        }
    }

    /// Visit every unordered in-bounds neighbor pair of a `width` x `height` grid.
    pub(crate) fn for_each_pair(self, width: usize, height: usize, mut f: impl FnMut(usize, usize)) {
        let offsets = self.forward_offsets();
        for y in 0..height {
            for x in 0..width {
                let a = y * width + x;
                for &(dx, dy) in offsets {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    f(a, ny as usize * width + nx as usize);
                }
            }
        }
    }
}

/// Undirected connection between two flattened pixel indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub index_a: usize,
    pub index_b: usize,
    /// Non-negative dissimilarity between the two pixels
    pub weight: f32,
}

/// Dense region assignment over a flat index space.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Labeling {
    /// Region id of every element, in `0..region_sizes.len()`
    pub labels: Vec<u32>,
    /// Number of elements in each region
    pub region_sizes: Vec<usize>,
}

impl Labeling {
    pub fn num_regions(&self) -> usize {
        self.region_sizes.len()
    }
}

/// Result of segmenting an image: a label per pixel and the size of each region.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub labels: LabelImage,
    pub region_sizes: Vec<usize>,
}

impl Segmentation {
    /// Wrap a flat labeling as an image of the given dimensions.
    pub fn from_labeling(width: u32, height: u32, labeling: Labeling) -> Result<Self> {
        let Labeling {
            labels,
            region_sizes,
        } = labeling;
        let mismatch = SegmentationError::ShapeMismatch {
            expected: (width, height),
            actual: (labels.len() as u32, 1),
        };
        if labels.len() != width as usize * height as usize {
            return Err(mismatch);
        }
        let labels = LabelImage::from_raw(width, height, labels).ok_or(mismatch)?;
        Ok(Self {
            labels,
            region_sizes,
        })
    }

    pub fn num_regions(&self) -> usize {
        self.region_sizes.len()
    }

    pub fn width(&self) -> u32 {
        self.labels.width()
    }

    pub fn height(&self) -> u32 {
        self.labels.height()
    }

    /// Region id of the pixel at `(x, y)`.
    pub fn region_at(&self, x: u32, y: u32) -> u32 {
        self.labels.get_pixel(x, y)[0]
    }
}

/// Output of a [`Pipeline`](crate::Pipeline) run.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedImage {
    pub segmentation: Segmentation,
    /// Mean color of each region measured on the input image
    pub region_colors: RegionColors,
}

use imageproc::definitions::Image;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SegmentationError},
    pixel::{read_bands, BandPixel},
    types::LabelImage,
};

/// Mean band values of every region, stored region-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionColors {
    bands: usize,
    means: Vec<f32>,
}

impl RegionColors {
    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn num_regions(&self) -> usize {
        if self.bands == 0 {
            0
        } else {
            self.means.len() / self.bands
        }
    }

    /// Mean color of `region`.
    pub fn get(&self, region: usize) -> &[f32] {
        &self.means[region * self.bands..(region + 1) * self.bands]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.means.chunks_exact(self.bands.max(1))
    }
}

/// Compute the mean color of each of `num_regions` regions.
///
/// `labels` must have the dimensions of `image` and every label must be
/// below `num_regions`. Regions without pixels get a mean of zero.
pub fn region_mean_color<P: BandPixel>(
    labels: &LabelImage,
    image: &Image<P>,
    num_regions: usize,
) -> Result<RegionColors> {
    if labels.dimensions() != image.dimensions() {
        return Err(SegmentationError::ShapeMismatch {
            expected: image.dimensions(),
            actual: labels.dimensions(),
        });
    }
    Ok(RegionStats::accumulate(labels.as_raw(), image, num_regions)?.colors())
}

/// Per-region band sums and pixel counts.
///
/// Sums are kept in `f64` so merging regions is exact regardless of the
/// order merges happen in.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionStats {
    bands: usize,
    sums: Vec<f64>,
    counts: Vec<usize>,
}

impl RegionStats {
    /// Accumulate statistics of `image` grouped by the flat `labels`.
    pub fn accumulate<P: BandPixel>(labels: &[u32], image: &Image<P>, num_regions: usize) -> Result<Self> {
        let pixel_count = image.width() as usize * image.height() as usize;
        if labels.len() != pixel_count {
            return Err(SegmentationError::ShapeMismatch {
                expected: image.dimensions(),
                actual: (labels.len() as u32, 1),
            });
        }

        let bands = P::bands();
        let mut stats = Self {
            bands,
            sums: vec![0.0; num_regions * bands],
            counts: vec![0; num_regions],
        };
        let mut color = vec![0.0f32; bands];
        for (index, &label) in labels.iter().enumerate() {
            let region = label as usize;
            if region >= num_regions {
                return Err(SegmentationError::invalid(
                    "labels",
                    format!("label {label} not below region count {num_regions}"),
                ));
            }
            read_bands(image, index, &mut color);
            stats.counts[region] += 1;
            for (sum, &value) in stats.sums[region * bands..(region + 1) * bands].iter_mut().zip(&color) {
                *sum += value as f64;
            }
        }
        Ok(stats)
    }

    pub fn num_regions(&self) -> usize {
        self.counts.len()
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn count(&self, region: usize) -> usize {
        self.counts[region]
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Write the mean color of `region` into `out`.
    pub fn mean_into(&self, region: usize, out: &mut [f32]) {
        let count = self.counts[region];
        let sums = &self.sums[region * self.bands..(region + 1) * self.bands];
        for (dst, &sum) in out.iter_mut().zip(sums) {
            *dst = if count == 0 { 0.0 } else { (sum / count as f64) as f32 };
        }
    }

    /// Squared Euclidean distance between the mean colors of two regions.
    pub fn distance_sq(&self, a: usize, b: usize) -> f32 {
        let (ca, cb) = (self.counts[a].max(1) as f64, self.counts[b].max(1) as f64);
        let sa = &self.sums[a * self.bands..(a + 1) * self.bands];
        let sb = &self.sums[b * self.bands..(b + 1) * self.bands];
        sa.iter()
            .zip(sb)
            .map(|(&x, &y)| {
                let d = x / ca - y / cb;
                d * d
            })
            .sum::<f64>() as f32
    }

    /// Combine regions: old region `r` becomes new region `map[r]`.
    pub fn remap(&self, map: &[u32], new_count: usize) -> Self {
        let bands = self.bands;
        let mut sums = vec![0.0; new_count * bands];
        let mut counts = vec![0; new_count];
        for (old, &new) in map.iter().enumerate() {
            let new = new as usize;
            counts[new] += self.counts[old];
            for b in 0..bands {
                sums[new * bands + b] += self.sums[old * bands + b];
            }
        }
        Self { bands, sums, counts }
    }

    /// Mean color of every region.
    pub fn colors(&self) -> RegionColors {
        let mut means = vec![0.0f32; self.num_regions() * self.bands];
        for region in 0..self.num_regions() {
            self.mean_into(region, &mut means[region * self.bands..(region + 1) * self.bands]);
        }
        RegionColors {
            bands: self.bands,
            means,
        }
    }
}

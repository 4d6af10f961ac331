//! Mean-shift segmentation.
//!
//! Every pixel climbs to a mode of the joint position/color density. Modes
//! that ended close together with similar colors are merged. Pixels sharing a
//! mode and touching each other form the initial regions, which are then
//! merged by color similarity and pruned by size.

pub mod merge;
pub mod prune;
pub mod search;
pub mod weights;

pub use merge::{MergeModes, MergeRegions};
pub use prune::PruneSmallRegions;
pub use search::{MeanShiftModes, MeanShiftSearch};
pub use weights::{ColorWeight, GaussianColor, GaussianSpatial, SpatialWeight, UniformColor, UniformSpatial};

use imageproc::definitions::Image;
use tracing::{debug, instrument};

use crate::{
    algorithms::{connected::split_connected, region_color::RegionStats},
    config::ConfigMeanShift,
    error::Result,
    pixel::BandPixel,
    traits::ImageSegmenter,
    types::{ConnectRule, Labeling, Segmentation},
};

/// Segment `image` with uniform kernels.
///
/// Adjacent regions closer than `color_radius / 2` in mean color are merged
/// and regions under `min_region_size` pixels are folded into a neighbor.
pub fn mean_shift_segment<P: BandPixel>(
    image: &Image<P>,
    spatial_radius: usize,
    color_radius: f32,
    min_region_size: usize,
    fast: bool,
) -> Result<Segmentation> {
    let config = ConfigMeanShift {
        spatial_radius,
        color_radius,
        min_region_size,
        fast,
        ..ConfigMeanShift::default()
    };
    SegmentMeanShift::from_config(&config)?.segment(image)
}

/// Window half-width, in pixels, within which converged modes may merge.
const MODE_MERGE_DISTANCE: usize = 3;

/// Mean-shift search followed by region merging and pruning.
#[derive(Debug, Clone)]
pub struct SegmentMeanShift<S = UniformSpatial, C = UniformColor> {
    search: MeanShiftSearch<S, C>,
    merge_modes: MergeModes,
    merge: MergeRegions,
    prune: Option<PruneSmallRegions>,
    connect_rule: ConnectRule,
}

impl SegmentMeanShift {
    pub fn from_config(config: &ConfigMeanShift) -> Result<Self> {
        config.validate()?;
        let search = MeanShiftSearch {
            max_iterations: config.max_iterations,
            convergence_tol: config.convergence_tol,
            ..MeanShiftSearch::uniform(config.spatial_radius, config.color_radius, config.fast)
        };
        Ok(Self::with_search(search, config))
    }
}

impl<S: SpatialWeight, C: ColorWeight> SegmentMeanShift<S, C> {
    /// Use a custom search (e.g. Gaussian kernels) with the merge and prune
    /// settings of `config`.
    pub fn with_search(search: MeanShiftSearch<S, C>, config: &ConfigMeanShift) -> Self {
        let prune = (config.min_region_size >= 2)
            .then(|| PruneSmallRegions::new(config.min_region_size, config.connect_rule));
        Self {
            search,
            merge_modes: MergeModes::new(MODE_MERGE_DISTANCE, config.color_radius / 2.0),
            merge: MergeRegions::new(config.color_radius / 2.0, config.connect_rule),
            prune,
            connect_rule: config.connect_rule,
        }
    }

    pub fn search(&self) -> &MeanShiftSearch<S, C> {
        &self.search
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn segment<P: BandPixel>(&mut self, image: &Image<P>) -> Result<Segmentation> {
        let width = image.width() as usize;
        let height = image.height() as usize;

        let mut modes = self.search.search(image);
        self.merge_modes.process(&mut modes, width, height);
        let Labeling {
            mut labels,
            region_sizes,
        } = split_connected(&modes.pixel_to_mode, width, height, self.connect_rule);
        debug!(
            modes = modes.num_modes(),
            regions = region_sizes.len(),
            "split modes into connected regions"
        );

        let mut stats = RegionStats::accumulate(&labels, image, region_sizes.len())?;
        self.merge.process(&mut labels, width, height, &mut stats);
        if let Some(prune) = &self.prune {
            prune.process(&mut labels, width, height, &mut stats);
        }

        let labeling = Labeling {
            labels,
            region_sizes: stats.counts().to_vec(),
        };
        Segmentation::from_labeling(image.width(), image.height(), labeling)
    }
}

impl<P, S, C> ImageSegmenter<P> for SegmentMeanShift<S, C>
where
    P: BandPixel,
    S: SpatialWeight,
    C: ColorWeight,
{
    fn segment(&mut self, image: &Image<P>) -> Result<Segmentation> {
        SegmentMeanShift::segment(self, image)
    }

    fn name(&self) -> &'static str {
        "mean_shift"
    }
}

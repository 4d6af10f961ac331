use tracing::{debug, trace};

use super::search::MeanShiftModes;
use crate::{
    algorithms::{connected::region_adjacency, region_color::RegionStats, union_find::DisjointSet},
    pixel::distance_sq,
    types::{ConnectRule, Labeling},
};

/// Merges modes that converged close to each other with similar colors.
///
/// Runs before modes are split into connected regions, so pixels whose
/// searches stopped a few pixels apart on the same plateau share a mode.
#[derive(Debug, Clone)]
pub struct MergeModes {
    /// Half-width of the square window searched around each mode location
    pub max_spatial_distance: usize,
    /// Euclidean color distance below which modes merge
    pub threshold: f32,
}

impl MergeModes {
    pub fn new(max_spatial_distance: usize, threshold: f32) -> Self {
        Self {
            max_spatial_distance,
            threshold,
        }
    }

    /// Merge modes of a `width` x `height` image in place.
    ///
    /// Colors are compared as found by the search, before any merging.
    pub fn process(&self, modes: &mut MeanShiftModes, width: usize, height: usize) {
        let count = modes.num_modes();
        if count < 2 {
            return;
        }

        // At most one mode per pixel: modes are keyed by the pixel they end on.
        let mut mode_at = vec![u32::MAX; width * height];
        let cell = |[x, y]: [f32; 2]| {
            let cx = (x.round() as usize).min(width - 1);
            let cy = (y.round() as usize).min(height - 1);
            (cx, cy)
        };
        for (mode, &location) in modes.locations.iter().enumerate() {
            let (cx, cy) = cell(location);
            mode_at[cy * width + cx] = mode as u32;
        }

        let threshold_sq = self.threshold * self.threshold;
        let r = self.max_spatial_distance;
        let mut forest = DisjointSet::new(count);
        let mut merges = 0;
        for mode in 0..count {
            let (cx, cy) = cell(modes.locations[mode]);
            for y in cy.saturating_sub(r)..=(cy + r).min(height - 1) {
                for x in cx.saturating_sub(r)..=(cx + r).min(width - 1) {
                    let other = mode_at[y * width + x];
                    if other == u32::MAX || other as usize <= mode {
                        continue;
                    }
                    let other = other as usize;
                    if forest.find(mode) != forest.find(other)
                        && distance_sq(modes.color(mode), modes.color(other)) < threshold_sq
                    {
                        forest.union(mode, other);
                        merges += 1;
                    }
                }
            }
        }

        if merges > 0 {
            let Labeling {
                labels: map,
                region_sizes,
            } = forest.labeling();
            *modes = modes.remap(&map, region_sizes.len());
        }
        debug!(before = count, after = modes.num_modes(), "merged nearby modes");
    }
}

/// Merges touching regions whose mean colors are within `threshold`.
#[derive(Debug, Clone)]
pub struct MergeRegions {
    /// Euclidean color distance below which neighbors merge
    pub threshold: f32,
    pub rule: ConnectRule,
}

impl MergeRegions {
    pub fn new(threshold: f32, rule: ConnectRule) -> Self {
        Self { threshold, rule }
    }

    /// Merge until a pass finds nothing to merge.
    ///
    /// `labels` and `stats` are rewritten in place with dense ids.
    pub fn process(&self, labels: &mut [u32], width: usize, height: usize, stats: &mut RegionStats) {
        let threshold_sq = self.threshold * self.threshold;
        let mut passes = 0;
        loop {
            passes += 1;
            let pairs = region_adjacency(labels, width, height, self.rule);
            let mut forest = DisjointSet::new(stats.num_regions());
            let mut merges = 0;
            for (a, b) in pairs {
                let (a, b) = (a as usize, b as usize);
                if forest.find(a) != forest.find(b) && stats.distance_sq(a, b) < threshold_sq {
                    forest.union(a, b);
                    merges += 1;
                }
            }
            trace!(pass = passes, merges, "merge pass");
            if merges == 0 {
                break;
            }
            relabel(labels, stats, &mut forest);
        }
        debug!(regions = stats.num_regions(), passes, "merged similar regions");
    }
}

/// Apply the merges recorded in `forest` to `labels` and `stats`.
pub(crate) fn relabel(labels: &mut [u32], stats: &mut RegionStats, forest: &mut DisjointSet) {
    let Labeling {
        labels: map,
        region_sizes,
    } = forest.labeling();
    *stats = stats.remap(&map, region_sizes.len());
    for label in labels.iter_mut() {
        *label = map[*label as usize];
    }
}

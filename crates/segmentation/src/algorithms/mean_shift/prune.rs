use tracing::debug;

use super::merge::relabel;
use crate::{
    algorithms::{connected::region_adjacency, region_color::RegionStats, union_find::DisjointSet},
    types::ConnectRule,
};

/// Folds regions smaller than `min_size` into their most similar neighbor.
#[derive(Debug, Clone)]
pub struct PruneSmallRegions {
    pub min_size: usize,
    pub rule: ConnectRule,
}

impl PruneSmallRegions {
    pub fn new(min_size: usize, rule: ConnectRule) -> Self {
        Self { min_size, rule }
    }

    /// Repeat until every region has at least `min_size` pixels or one region is left.
    ///
    /// Each pass merges every small region that has a neighbor, and on a
    /// connected pixel grid every region has one while more than one exists,
    /// so the region count drops on every pass.
    pub fn process(&self, labels: &mut [u32], width: usize, height: usize, stats: &mut RegionStats) {
        let mut passes = 0;
        while stats.num_regions() > 1 {
            let is_small: Vec<bool> = stats.counts().iter().map(|&c| c < self.min_size).collect();
            if !is_small.iter().any(|&s| s) {
                break;
            }
            passes += 1;

            // Most similar neighbor of each small region; ties go to the lower id.
            let mut best: Vec<Option<(f32, u32)>> = vec![None; stats.num_regions()];
            for (a, b) in region_adjacency(labels, width, height, self.rule) {
                for (region, other) in [(a, b), (b, a)] {
                    if !is_small[region as usize] {
                        continue;
                    }
                    let distance = stats.distance_sq(region as usize, other as usize);
                    let slot = &mut best[region as usize];
                    let better = match *slot {
                        None => true,
                        Some((d, id)) => distance < d || (distance == d && other < id),
                    };
                    if better {
                        *slot = Some((distance, other));
                    }
                }
            }

            let mut forest = DisjointSet::new(stats.num_regions());
            let mut merges = 0;
            for (region, choice) in best.iter().enumerate() {
                if let Some((_, other)) = *choice {
                    if forest.find(region) != forest.find(other as usize) {
                        forest.union(region, other as usize);
                        merges += 1;
                    }
                }
            }
            if merges == 0 {
                break;
            }
            relabel(labels, stats, &mut forest);
        }
        debug!(regions = stats.num_regions(), passes, min_size = self.min_size, "pruned small regions");
    }
}

use crate::{
    algorithms::union_find::DisjointSet,
    types::{ConnectRule, Labeling},
};

/// Split every label into its spatially connected pieces.
///
/// Two neighboring pixels end up in the same output region only when they
/// share an input label. Output ids are dense, in raster order.
pub fn split_connected(labels: &[u32], width: usize, height: usize, rule: ConnectRule) -> Labeling {
    debug_assert_eq!(labels.len(), width * height);
    let mut forest = DisjointSet::new(labels.len());
    rule.for_each_pair(width, height, |a, b| {
        if labels[a] == labels[b] {
            forest.union(a, b);
        }
    });
    forest.labeling()
}

/// Unordered pairs of distinct regions that touch under `rule`, sorted and deduplicated.
pub fn region_adjacency(labels: &[u32], width: usize, height: usize, rule: ConnectRule) -> Vec<(u32, u32)> {
    let mut pairs = Vec::new();
    rule.for_each_pair(width, height, |a, b| {
        let (la, lb) = (labels[a], labels[b]);
        if la != lb {
            pairs.push((la.min(lb), la.max(lb)));
        }
    });
    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

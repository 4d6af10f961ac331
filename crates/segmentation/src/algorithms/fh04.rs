//! Felzenszwalb-Huttenlocher graph-based segmentation.
//!
//! "Efficient Graph-Based Image Segmentation", Felzenszwalb and Huttenlocher
//! (2004). Edges are processed in order of increasing weight; two regions merge
//! when the connecting edge is no heavier than either region's internal
//! difference plus `k / size`.

use imageproc::definitions::Image;
use tracing::{debug, instrument};

use crate::{
    algorithms::{edge_weights::compute_edge_weights, union_find::DisjointSet},
    config::ConfigFh04,
    error::{Result, SegmentationError},
    pixel::BandPixel,
    traits::ImageSegmenter,
    types::{ConnectRule, Edge, Labeling, Segmentation},
};

/// Segment a graph of `pixel_count` nodes described by `edges`.
///
/// Equal-weight edges are processed in their input order, so the result is
/// fully determined by the edge list.
pub fn segment_fh(edges: &[Edge], pixel_count: usize, k: f32, min_size: usize) -> Result<Labeling> {
    let mut state = FhState::default();
    state.segment(edges, pixel_count, k, min_size)
}

/// Scratch storage for one segmentation, reusable across calls.
#[derive(Debug, Default)]
struct FhState {
    sorted: Vec<Edge>,
    rejected: Vec<Edge>,
    forest: DisjointSet,
    threshold: Vec<f32>,
}

impl FhState {
    fn segment(&mut self, edges: &[Edge], pixel_count: usize, k: f32, min_size: usize) -> Result<Labeling> {
        validate(edges, pixel_count, k)?;

        self.forest.reset(pixel_count);
        self.threshold.clear();
        self.threshold.resize(pixel_count, k);

        self.sorted.clear();
        self.sorted.extend_from_slice(edges);
        // Stable: ties keep input order.
        self.sorted.sort_by(|a, b| a.weight.total_cmp(&b.weight));

        self.rejected.clear();
        for edge in &self.sorted {
            let ra = self.forest.find(edge.index_a);
            let rb = self.forest.find(edge.index_b);
            if ra == rb {
                continue;
            }
            if edge.weight <= self.threshold[ra] && edge.weight <= self.threshold[rb] {
                let root = self.forest.union(ra, rb);
                self.threshold[root] = edge.weight + k / self.forest.size_of(root) as f32;
            } else {
                self.rejected.push(*edge);
            }
        }
        debug!(edges = edges.len(), rejected = self.rejected.len(), "threshold pass done");

        // Every edge between distinct regions is in `rejected`, in weight
        // order, and sizes only grow, so one pass leaves no small region with
        // a neighbor.
        if min_size > 1 {
            for edge in &self.rejected {
                let ra = self.forest.find(edge.index_a);
                let rb = self.forest.find(edge.index_b);
                if ra != rb && (self.forest.size_of(ra) < min_size || self.forest.size_of(rb) < min_size) {
                    self.forest.union(ra, rb);
                }
            }
        }

        Ok(self.forest.labeling())
    }
}

fn validate(edges: &[Edge], pixel_count: usize, k: f32) -> Result<()> {
    if !(k.is_finite() && k > 0.0) {
        return Err(SegmentationError::invalid("k", format!("must be finite and > 0, got {k}")));
    }
    for edge in edges {
        if edge.index_a >= pixel_count || edge.index_b >= pixel_count {
            return Err(SegmentationError::invalid(
                "edges",
                format!(
                    "edge ({}, {}) out of range for {pixel_count} pixels",
                    edge.index_a, edge.index_b
                ),
            ));
        }
        if !(edge.weight.is_finite() && edge.weight >= 0.0) {
            return Err(SegmentationError::invalid(
                "edges",
                format!("edge weight must be finite and >= 0, got {}", edge.weight),
            ));
        }
    }
    Ok(())
}

/// Reusable FH segmenter for images.
///
/// Holds the edge list and union-find storage between calls so repeated
/// segmentation of same-sized frames does not reallocate.
#[derive(Debug)]
pub struct SegmentFh04 {
    k: f32,
    min_size: usize,
    rule: ConnectRule,
    edges: Vec<Edge>,
    state: FhState,
}

impl SegmentFh04 {
    pub fn new(k: f32, min_size: usize, rule: ConnectRule) -> Result<Self> {
        if !(k.is_finite() && k > 0.0) {
            return Err(SegmentationError::invalid("k", format!("must be finite and > 0, got {k}")));
        }
        Ok(Self {
            k,
            min_size,
            rule,
            edges: Vec::new(),
            state: FhState::default(),
        })
    }

    pub fn from_config(config: &ConfigFh04) -> Result<Self> {
        Self::new(config.k, config.min_size, config.connect_rule)
    }

    pub fn k(&self) -> f32 {
        self.k
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn connect_rule(&self) -> ConnectRule {
        self.rule
    }

    /// Segment `image`, reusing internal scratch buffers.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn segment<P: BandPixel>(&mut self, image: &Image<P>) -> Result<Segmentation> {
        compute_edge_weights(image, self.rule, &mut self.edges);
        let pixel_count = image.width() as usize * image.height() as usize;
        let labeling = self.state.segment(&self.edges, pixel_count, self.k, self.min_size)?;
        debug!(regions = labeling.num_regions(), "fh04 segmentation done");
        Segmentation::from_labeling(image.width(), image.height(), labeling)
    }
}

impl Default for SegmentFh04 {
    fn default() -> Self {
        let config = ConfigFh04::default();
        Self {
            k: config.k,
            min_size: config.min_size,
            rule: config.connect_rule,
            edges: Vec::new(),
            state: FhState::default(),
        }
    }
}

impl<P: BandPixel> ImageSegmenter<P> for SegmentFh04 {
    fn segment(&mut self, image: &Image<P>) -> Result<Segmentation> {
        SegmentFh04::segment(self, image)
    }

    fn name(&self) -> &'static str {
        "fh04"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::edge_weights::edge_weights;
    use image::{GrayImage, Luma};

    fn two_halves() -> GrayImage {
        GrayImage::from_fn(4, 4, |_, y| Luma([if y < 2 { 10 } else { 200 }]))
    }

    #[test]
    fn splits_two_uniform_halves() {
        let img = two_halves();
        let edges = edge_weights(&img, ConnectRule::Four);
        let labeling = segment_fh(&edges, 16, 50.0, 1).expect("valid input");
        assert_eq!(labeling.region_sizes, vec![8, 8]);
        assert!(labeling.labels[..8].iter().all(|&l| l == 0));
        assert!(labeling.labels[8..].iter().all(|&l| l == 1));
    }

    #[test]
    fn uniform_image_is_one_region_for_any_k() {
        let img = GrayImage::from_pixel(6, 5, Luma([77]));
        let edges = edge_weights(&img, ConnectRule::Eight);
        for k in [0.001, 1.0, 300.0, 1e6] {
            let labeling = segment_fh(&edges, 30, k, 0).expect("valid input");
            assert_eq!(labeling.region_sizes, vec![30], "k = {k}");
        }
    }

    #[test]
    fn min_size_absorbs_small_regions() {
        // A single bright pixel in a dark image.
        let img = GrayImage::from_fn(5, 5, |x, y| Luma([if (x, y) == (2, 2) { 255 } else { 0 }]));
        let edges = edge_weights(&img, ConnectRule::Four);

        let unpruned = segment_fh(&edges, 25, 10.0, 1).expect("valid input");
        assert_eq!(unpruned.num_regions(), 2);

        let pruned = segment_fh(&edges, 25, 10.0, 4).expect("valid input");
        assert_eq!(pruned.region_sizes, vec![25]);
    }

    #[test]
    fn min_size_larger_than_image_gives_one_region() {
        let img = GrayImage::from_fn(3, 3, |x, _| Luma([(x * 100) as u8]));
        let edges = edge_weights(&img, ConnectRule::Four);
        let labeling = segment_fh(&edges, 9, 1.0, 100).expect("valid input");
        assert_eq!(labeling.region_sizes, vec![9]);
    }

    #[test]
    fn rejects_bad_parameters() {
        let edges = [Edge {
            index_a: 0,
            index_b: 5,
            weight: 1.0,
        }];
        assert!(matches!(
            segment_fh(&edges, 4, 1.0, 0),
            Err(SegmentationError::InvalidParameter { name: "edges", .. })
        ));
        assert!(matches!(
            segment_fh(&[], 4, 0.0, 0),
            Err(SegmentationError::InvalidParameter { name: "k", .. })
        ));
        assert!(matches!(
            segment_fh(&[], 4, f32::NAN, 0),
            Err(SegmentationError::InvalidParameter { name: "k", .. })
        ));
        assert!(SegmentFh04::new(-3.0, 10, ConnectRule::Eight).is_err());
    }

    #[test]
    fn empty_graph() {
        let labeling = segment_fh(&[], 0, 1.0, 5).expect("valid input");
        assert!(labeling.labels.is_empty());
        assert_eq!(labeling.num_regions(), 0);
    }

    #[test]
    fn segmenter_reuses_scratch_across_sizes() {
        let mut segmenter = SegmentFh04::new(50.0, 1, ConnectRule::Four).expect("valid k");
        let first = segmenter.segment(&two_halves()).expect("segments");
        assert_eq!(first.num_regions(), 2);

        let small = GrayImage::from_pixel(2, 2, Luma([5]));
        let second = segmenter.segment(&small).expect("segments");
        assert_eq!(second.region_sizes, vec![4]);

        let again = segmenter.segment(&two_halves()).expect("segments");
        assert_eq!(again, first);
    }
}

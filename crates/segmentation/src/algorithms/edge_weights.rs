use imageproc::definitions::Image;

use crate::{
    pixel::{distance_sq, read_bands, BandPixel},
    types::{ConnectRule, Edge},
};

/// Fill `edges` with one edge per unordered pair of adjacent pixels.
///
/// `edges` is cleared first; its capacity is reused. The weight is the
/// Euclidean distance between the two pixels' band vectors, which reduces to
/// the absolute difference for single-band images.
pub fn compute_edge_weights<P: BandPixel>(image: &Image<P>, rule: ConnectRule, edges: &mut Vec<Edge>) {
    edges.clear();

    let width = image.width() as usize;
    let height = image.height() as usize;
    let bands = P::bands();
    let mut color_a = vec![0.0f32; bands];
    let mut color_b = vec![0.0f32; bands];

    rule.for_each_pair(width, height, |index_a, index_b| {
        read_bands(image, index_a, &mut color_a);
        read_bands(image, index_b, &mut color_b);
        let weight = if bands == 1 {
            (color_a[0] - color_b[0]).abs()
        } else {
            distance_sq(&color_a, &color_b).sqrt()
        };
        edges.push(Edge {
            index_a,
            index_b,
            weight,
        });
    });

    tracing::trace!(rule = %rule, edges = edges.len(), "computed edge weights");
}

/// Allocating variant of [`compute_edge_weights`].
pub fn edge_weights<P: BandPixel>(image: &Image<P>, rule: ConnectRule) -> Vec<Edge> {
    let mut edges = Vec::new();
    compute_edge_weights(image, rule, &mut edges);
    edges
}

/// Number of edges [`compute_edge_weights`] produces for a `width` x `height` image.
pub fn expected_edge_count(width: usize, height: usize, rule: ConnectRule) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    let four = width * (height - 1) + height * (width - 1);
    match rule {
        ConnectRule::Four => four,
        ConnectRule::Eight => four + 2 * (width - 1) * (height - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma, Rgb};

    #[test]
    fn four_connected_count_on_3x3() {
        let img = GrayImage::new(3, 3);
        let edges = edge_weights(&img, ConnectRule::Four);
        assert_eq!(edges.len(), 3 * 2 + 3 * 2);
        assert_eq!(edges.len(), expected_edge_count(3, 3, ConnectRule::Four));
    }

    #[test]
    fn eight_connected_count_on_3x3() {
        let img = GrayImage::new(3, 3);
        let edges = edge_weights(&img, ConnectRule::Eight);
        assert_eq!(edges.len(), 20);
        assert_eq!(edges.len(), expected_edge_count(3, 3, ConnectRule::Eight));
    }

    #[test]
    fn pairs_are_unique_and_in_bounds() {
        let img: Image<Luma<f32>> = ImageBuffer::new(5, 4);
        for rule in [ConnectRule::Four, ConnectRule::Eight] {
            let edges = edge_weights(&img, rule);
            let mut pairs: Vec<(usize, usize)> = edges
                .iter()
                .map(|e| (e.index_a.min(e.index_b), e.index_a.max(e.index_b)))
                .collect();
            pairs.sort_unstable();
            pairs.dedup();
            assert_eq!(pairs.len(), edges.len());
            assert!(edges.iter().all(|e| e.index_a < 20 && e.index_b < 20));
        }
    }

    #[test]
    fn single_band_weight_is_absolute_difference() {
        let img = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 30 } else { 10 }]));
        let edges = edge_weights(&img, ConnectRule::Four);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].weight, 20.0);
    }

    #[test]
    fn multi_band_weight_is_euclidean() {
        let img: Image<Rgb<u8>> =
            ImageBuffer::from_fn(1, 2, |_, y| if y == 0 { Rgb([0, 0, 0]) } else { Rgb([3, 4, 0]) });
        let edges = edge_weights(&img, ConnectRule::Four);
        assert_eq!(edges.len(), 1);
        assert!((edges[0].weight - 5.0).abs() < 1e-6);
    }

    #[test]
    fn scratch_is_overwritten_not_appended() {
        let big = GrayImage::new(4, 4);
        let small = GrayImage::new(2, 1);
        let mut edges = Vec::new();
        compute_edge_weights(&big, ConnectRule::Eight, &mut edges);
        compute_edge_weights(&small, ConnectRule::Eight, &mut edges);
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn degenerate_images() {
        assert!(edge_weights(&GrayImage::new(0, 0), ConnectRule::Eight).is_empty());
        assert!(edge_weights(&GrayImage::new(1, 1), ConnectRule::Eight).is_empty());
        assert_eq!(edge_weights(&GrayImage::new(1, 4), ConnectRule::Eight).len(), 3);
    }
}

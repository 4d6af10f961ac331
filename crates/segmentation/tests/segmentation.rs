use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use imageproc::definitions::Image;
use segmentation::{
    edge_weights, expected_edge_count, mean_shift_segment, region_mean_color, segment_fh, ConnectRule,
    SegmentFh04, Segmentation, SegmentationError,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Deterministic pseudo-random texture.
fn noisy_image(width: u32, height: u32, seed: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let mut h = (x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663) ^ seed).wrapping_mul(0x9E37_79B9);
        h ^= h >> 16;
        let base = if x < width / 2 { 60 } else { 180 };
        Luma([(base + (h % 40) as i32 - 20) as u8])
    })
}

fn color_blocks() -> RgbImage {
    RgbImage::from_fn(24, 16, |x, y| match (x < 12, y < 8) {
        (true, true) => Rgb([200, 30, 30]),
        (false, true) => Rgb([30, 200, 30]),
        (true, false) => Rgb([30, 30, 200]),
        (false, false) => Rgb([200, 200, 30]),
    })
}

fn assert_partition(seg: &Segmentation) {
    let mut counts = vec![0usize; seg.num_regions()];
    for label in seg.labels.pixels() {
        let label = label[0] as usize;
        assert!(label < seg.num_regions(), "label {label} out of range");
        counts[label] += 1;
    }
    assert_eq!(counts, seg.region_sizes);
    assert!(counts.iter().all(|&c| c > 0), "empty region");
    assert_eq!(counts.iter().sum::<usize>(), (seg.width() * seg.height()) as usize);
}

#[test]
fn two_halves_scenario() {
    init_tracing();
    let img = GrayImage::from_fn(4, 4, |_, y| Luma([if y < 2 { 10 } else { 200 }]));
    let mut fh = SegmentFh04::new(50.0, 1, ConnectRule::Four).expect("valid k");
    let seg = fh.segment(&img).expect("segments");

    assert_eq!(seg.region_sizes, vec![8, 8]);
    let colors = region_mean_color(&seg.labels, &img, seg.num_regions()).expect("matching shapes");
    assert_eq!(colors.get(0), &[10.0]);
    assert_eq!(colors.get(1), &[200.0]);
}

#[test]
fn edge_count_on_3x3() {
    let img = GrayImage::new(3, 3);
    assert_eq!(edge_weights(&img, ConnectRule::Four).len(), 3 * 2 + 3 * 2);
    for (w, h) in [(1, 1), (3, 3), (7, 2), (5, 9)] {
        let img = GrayImage::new(w, h);
        for rule in [ConnectRule::Four, ConnectRule::Eight] {
            assert_eq!(
                edge_weights(&img, rule).len(),
                expected_edge_count(w as usize, h as usize, rule)
            );
        }
    }
}

#[test]
fn fh_partition_and_min_size() {
    init_tracing();
    let img = noisy_image(32, 24, 7);
    for min_size in [1, 5, 20, 100] {
        let mut fh = SegmentFh04::new(150.0, min_size, ConnectRule::Eight).expect("valid k");
        let seg = fh.segment(&img).expect("segments");
        assert_partition(&seg);
        assert!(seg.region_sizes.iter().all(|&s| s >= min_size), "min_size = {min_size}");
    }
}

#[test]
fn fh_whole_image_when_min_size_exceeds_pixels() {
    let img = noisy_image(5, 4, 3);
    let mut fh = SegmentFh04::new(1.0, 1000, ConnectRule::Four).expect("valid k");
    let seg = fh.segment(&img).expect("segments");
    assert_eq!(seg.region_sizes, vec![20]);
}

#[test]
fn fh_uniform_image_is_single_region() {
    let img: Image<Luma<f32>> = ImageBuffer::from_pixel(10, 10, Luma([0.25]));
    for k in [0.01, 5.0, 1000.0] {
        let mut fh = SegmentFh04::new(k, 0, ConnectRule::Eight).expect("valid k");
        assert_eq!(fh.segment(&img).expect("segments").region_sizes, vec![100]);
    }
}

#[test]
fn fh_is_deterministic() {
    let img = noisy_image(20, 20, 11);
    let edges = edge_weights(&img, ConnectRule::Eight);
    let first = segment_fh(&edges, 400, 80.0, 4).expect("valid input");
    for _ in 0..3 {
        assert_eq!(segment_fh(&edges, 400, 80.0, 4).expect("valid input"), first);
    }
}

#[test]
fn fh_multi_band_blocks() {
    let img = color_blocks();
    let mut fh = SegmentFh04::new(100.0, 10, ConnectRule::Eight).expect("valid k");
    let seg = fh.segment(&img).expect("segments");
    assert_partition(&seg);
    assert_eq!(seg.region_sizes, vec![96, 96, 96, 96]);

    let colors = region_mean_color(&seg.labels, &img, seg.num_regions()).expect("matching shapes");
    assert_eq!(colors.get(seg.region_at(20, 12) as usize), &[200.0, 200.0, 30.0]);
}

#[test]
fn region_mean_color_is_idempotent() {
    let img = noisy_image(16, 16, 5);
    let mut fh = SegmentFh04::new(60.0, 3, ConnectRule::Four).expect("valid k");
    let seg = fh.segment(&img).expect("segments");
    let first = region_mean_color(&seg.labels, &img, seg.num_regions()).expect("matching shapes");
    let second = region_mean_color(&seg.labels, &img, seg.num_regions()).expect("matching shapes");
    assert_eq!(first, second);
}

#[test]
fn region_mean_color_rejects_other_shapes() {
    let img = GrayImage::new(8, 8);
    let seg = SegmentFh04::new(10.0, 1, ConnectRule::Four)
        .expect("valid k")
        .segment(&GrayImage::new(4, 8))
        .expect("segments");
    assert!(matches!(
        region_mean_color(&seg.labels, &img, seg.num_regions()),
        Err(SegmentationError::ShapeMismatch { .. })
    ));
}

#[test]
fn mean_shift_uniform_image_is_single_region() {
    init_tracing();
    let img = RgbImage::from_pixel(12, 10, Rgb([90, 90, 90]));
    for fast in [false, true] {
        let seg = mean_shift_segment(&img, 4, 12.0, 5, fast).expect("valid parameters");
        assert_eq!(seg.region_sizes, vec![120]);
    }
}

#[test]
fn mean_shift_partition_and_pruning() {
    init_tracing();
    let img = noisy_image(24, 16, 9);
    for fast in [false, true] {
        let seg = mean_shift_segment(&img, 3, 25.0, 8, fast).expect("valid parameters");
        assert_partition(&seg);
        assert!(
            seg.num_regions() == 1 || seg.region_sizes.iter().all(|&s| s >= 8),
            "fast = {fast}: {:?}",
            seg.region_sizes
        );
    }
}

#[test]
fn mean_shift_outlier_absorbed() {
    let img = GrayImage::from_fn(8, 8, |x, y| Luma([if (x, y) == (4, 4) { 255 } else { 40 }]));
    let seg = mean_shift_segment(&img, 2, 10.0, 4, false).expect("valid parameters");
    assert!(seg.region_sizes.iter().all(|&s| s >= 4));
    assert_eq!(seg.num_regions(), 1);
}

#[test]
fn mean_shift_color_blocks() {
    let img = color_blocks();
    let seg = mean_shift_segment(&img, 3, 20.0, 10, false).expect("valid parameters");
    assert_partition(&seg);
    assert_eq!(seg.region_sizes, vec![96, 96, 96, 96]);
}

#[test]
fn mean_shift_is_deterministic() {
    let img = noisy_image(16, 12, 21);
    let first = mean_shift_segment(&img, 3, 20.0, 4, true).expect("valid parameters");
    let second = mean_shift_segment(&img, 3, 20.0, 4, true).expect("valid parameters");
    assert_eq!(first, second);
}

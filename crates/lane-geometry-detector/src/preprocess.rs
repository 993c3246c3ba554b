//! Frame binarization: Otsu mask AND Canny edges, then a morphological close.

use crate::edges::canny_edges;
use crate::PreprocessParams;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::separable_filter_equal;
use imageproc::morphology::{dilate, erode};
use lane_geometry_core::{binarize_above, otsu_threshold};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Binomial 5-tap kernel; its outer product is the 5×5 Gaussian.
const GAUSSIAN_5: [f32; 5] = [
    1.0 / 16.0,
    4.0 / 16.0,
    6.0 / 16.0,
    4.0 / 16.0,
    1.0 / 16.0,
];

/// Every stage mask of the binarization, all in crop coordinates.
#[derive(Clone, Debug)]
pub struct PreprocessOutput {
    /// Otsu foreground.
    pub binary: GrayImage,
    /// Canny edges of the blurred intensity.
    pub edges: GrayImage,
    /// `binary AND edges`, closed. This is what gets rectified.
    pub lane: GrayImage,
    pub otsu_threshold: u8,
}

/// Turn the grayscale road region into a lane-candidate mask.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(gray, params), fields(width = gray.width(), height = gray.height()))
)]
pub fn preprocess(gray: &GrayImage, params: &PreprocessParams) -> PreprocessOutput {
    let threshold = otsu_threshold(gray);
    let binary = binarize_above(gray, threshold);

    let blurred: GrayImage = separable_filter_equal(gray, &GAUSSIAN_5);
    let edges = canny_edges(&blurred, params.canny_low, params.canny_high);

    let combined = and_masks(&binary, &edges);
    let lane = close_square(&combined, params.close_kernel, params.close_iterations);
    log::debug!(
        "preprocess: otsu threshold {threshold}, {} edge px, {} lane px",
        count_foreground(&edges),
        count_foreground(&lane)
    );

    PreprocessOutput {
        binary,
        edges,
        lane,
        otsu_threshold: threshold,
    }
}

/// Pixel-wise AND of two masks of equal size.
pub fn and_masks(a: &GrayImage, b: &GrayImage) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let on = a.get_pixel(x, y).0[0] > 0 && b.get_pixel(x, y).0[0] > 0;
        Luma([if on { 255 } else { 0 }])
    })
}

/// Dilate with a `kernel`×`kernel` square, `iterations` times.
pub fn dilate_square(mask: &GrayImage, kernel: u32, iterations: u32) -> GrayImage {
    let radius = square_radius(kernel);
    let mut out = mask.clone();
    for _ in 0..iterations {
        out = dilate(&out, Norm::LInf, radius);
    }
    out
}

/// Morphological close: `iterations` dilations followed by as many erosions.
pub fn close_square(mask: &GrayImage, kernel: u32, iterations: u32) -> GrayImage {
    let radius = square_radius(kernel);
    let mut out = dilate_square(mask, kernel, iterations);
    for _ in 0..iterations {
        out = erode(&out, Norm::LInf, radius);
    }
    out
}

pub(crate) fn count_foreground(mask: &GrayImage) -> usize {
    mask.as_raw().iter().filter(|&&v| v > 0).count()
}

#[inline]
fn square_radius(kernel: u32) -> u8 {
    (kernel / 2).min(u8::MAX as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_region_yields_empty_mask() {
        let gray = GrayImage::from_pixel(64, 48, Luma([120]));
        let out = preprocess(&gray, &PreprocessParams::default());
        assert_eq!(count_foreground(&out.binary), 0);
        assert_eq!(count_foreground(&out.edges), 0);
        assert_eq!(count_foreground(&out.lane), 0);
    }

    #[test]
    fn and_requires_both_masks() {
        let a = GrayImage::from_fn(4, 1, |x, _| Luma([if x < 2 { 255 } else { 0 }]));
        let b = GrayImage::from_fn(4, 1, |x, _| Luma([if x % 2 == 0 { 7 } else { 0 }]));
        let c = and_masks(&a, &b);
        let row: Vec<u8> = (0..4).map(|x| c.get_pixel(x, 0).0[0]).collect();
        assert_eq!(row, vec![255, 0, 0, 0]);
    }

    #[test]
    fn square_dilation_grows_by_radius_per_iteration() {
        let mut mask = GrayImage::new(41, 41);
        mask.put_pixel(20, 20, Luma([255]));
        let once = dilate_square(&mask, 11, 1);
        assert_eq!(count_foreground(&once), 121);
        let twice = dilate_square(&mask, 11, 2);
        assert_eq!(count_foreground(&twice), 21 * 21);
        assert!(twice.get_pixel(10, 10).0[0] > 0);
        assert_eq!(twice.get_pixel(9, 20).0[0], 0);
    }

    #[test]
    fn closing_bridges_short_gaps() {
        // dashed vertical marking: 8 px strokes with 6 px gaps
        let mask = GrayImage::from_fn(60, 80, |x, y| {
            let on = (28..32).contains(&x) && (y % 14) < 8;
            Luma([if on { 255 } else { 0 }])
        });
        let closed = close_square(&mask, 11, 2);
        for y in 0..80 {
            assert!(closed.get_pixel(30, y).0[0] > 0, "gap left open at row {y}");
        }
        assert_eq!(closed.get_pixel(5, 40).0[0], 0);
    }

    #[test]
    fn low_contrast_step_produces_edges() {
        // 30 grey levels: one 5×5 blur then Sobel peaks at |gx| 76
        let gray = GrayImage::from_fn(64, 32, |x, _| Luma([if x < 32 { 100 } else { 130 }]));
        let out = preprocess(&gray, &PreprocessParams::default());
        assert!(count_foreground(&out.edges) > 0);
        for y in 1..31 {
            assert_eq!(out.edges.get_pixel(31, y).0[0], 255, "row {y}");
        }
    }

    #[test]
    fn soft_edged_stripe_survives_binarization() {
        // dark road, one bright marking with one-pixel soft borders
        let gray = GrayImage::from_fn(120, 60, |x, _| {
            let v = match x {
                49 | 64 => 180,
                50..=63 => 220,
                _ => 40,
            };
            Luma([v])
        });
        let out = preprocess(&gray, &PreprocessParams::default());
        assert!(out.otsu_threshold < 180);
        let on_marking = (49..=64).filter(|&x| out.lane.get_pixel(x, 30).0[0] > 0).count();
        assert!(on_marking >= 12, "only {on_marking} marking columns kept");
        assert_eq!(out.lane.get_pixel(10, 30).0[0], 0);
        assert_eq!(out.lane.get_pixel(110, 30).0[0], 0);
    }
}

//! Histogram seeding and sliding-window pixel classification.

use crate::SearchParams;
use image::GrayImage;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A foreground pixel in rectified coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanePixel {
    pub x: u32,
    pub y: u32,
}

/// One visited window: columns `[x_low, x_high]`, rows `[y_low, y_high)`.
///
/// The column range is `[x_center - W, x_center + W)` clipped to the mask, so
/// `x_high` is the last column collected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidingWindow {
    /// Center before clipping; may lie outside the image.
    pub x_center: i64,
    pub x_low: u32,
    pub x_high: u32,
    pub y_low: u32,
    pub y_high: u32,
    pub pixel_count: usize,
}

impl SlidingWindow {
    /// `false` when the clipped column range is empty.
    #[inline]
    pub fn is_inside(&self) -> bool {
        self.x_low <= self.x_high
    }
}

/// Search output for one side.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SideSearch {
    /// Seed column of the bottom window.
    pub base_x: usize,
    pub pixels: Vec<LanePixel>,
    /// Bottom to top.
    pub windows: Vec<SlidingWindow>,
}

/// Seeds picked from the column histogram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramSeeds {
    pub left_base: usize,
    pub right_base: usize,
    /// Split column between the two halves.
    pub midpoint: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneSearchResult {
    pub left: SideSearch,
    pub right: SideSearch,
}

/// Per-column intensity sum over the lower half `[h/2, h)`.
pub fn column_histogram(mask: &GrayImage) -> Vec<u64> {
    let (w, h) = mask.dimensions();
    let mut hist = vec![0u64; w as usize];
    for y in h / 2..h {
        for (x, bin) in hist.iter_mut().enumerate() {
            *bin += mask.get_pixel(x as u32, y).0[0] as u64;
        }
    }
    hist
}

/// Index of the first maximum; 0 for an empty slice.
fn argmax_first(values: &[u64]) -> usize {
    let mut best = 0usize;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Finds left and right lane pixels in a rectified mask.
#[derive(Clone, Debug)]
pub struct LaneSearcher {
    params: SearchParams,
}

impl LaneSearcher {
    pub fn new(params: SearchParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Seed both sides from the peaks of the lower-half column histogram.
    pub fn seed_bases(&self, mask: &GrayImage) -> HistogramSeeds {
        let width = mask.width() as i64;
        let midpoint = (width / 2 + self.params.midpoint_offset as i64).clamp(0, width) as usize;
        let hist = column_histogram(mask);
        let (lower, upper) = hist.split_at(midpoint);
        HistogramSeeds {
            left_base: argmax_first(lower),
            right_base: argmax_first(upper) + midpoint,
            midpoint,
        }
    }

    /// Histogram seeding followed by the window walk.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn search(&self, mask: &GrayImage) -> LaneSearchResult {
        let seeds = self.seed_bases(mask);
        log::debug!(
            "search seeds: left {}, right {}, split {}",
            seeds.left_base,
            seeds.right_base,
            seeds.midpoint
        );
        self.search_from(mask, seeds.left_base, seeds.right_base)
    }

    /// Walk the windows upward from explicit seed columns.
    pub fn search_from(
        &self,
        mask: &GrayImage,
        left_base: usize,
        right_base: usize,
    ) -> LaneSearchResult {
        LaneSearchResult {
            left: self.walk(mask, left_base),
            right: self.walk(mask, right_base),
        }
    }

    fn walk(&self, mask: &GrayImage, base_x: usize) -> SideSearch {
        let (w, h) = mask.dimensions();
        let windows = self.params.num_windows.max(1) as u32;
        let band_h = h / windows;
        let half = self.params.window_half_width as i64;

        let mut side = SideSearch {
            base_x,
            pixels: Vec::new(),
            windows: Vec::with_capacity(windows as usize),
        };
        if w == 0 || band_h == 0 {
            return side;
        }

        let mut center = base_x as i64;
        for i in 0..windows {
            let y_high = h - i * band_h;
            let y_low = y_high - band_h;
            let x_low = (center - half).max(0);
            let x_high = (center + half - 1).min(w as i64 - 1);

            let start = side.pixels.len();
            let mut sum_x = 0u64;
            if x_low <= x_high {
                for y in y_low..y_high {
                    for x in x_low as u32..=x_high as u32 {
                        if mask.get_pixel(x, y).0[0] > 0 {
                            side.pixels.push(LanePixel { x, y });
                            sum_x += x as u64;
                        }
                    }
                }
            }
            let count = side.pixels.len() - start;

            side.windows.push(SlidingWindow {
                x_center: center,
                x_low: x_low as u32,
                x_high: x_high.max(0) as u32,
                y_low,
                y_high,
                pixel_count: count,
            });

            if count > self.params.min_pixels {
                center = (sum_x / count as u64) as i64;
            }
        }
        side
    }
}

//! Canny edges on an already smoothed image: 3×3 Sobel gradients, L1
//! magnitude, four-direction non-maximum suppression and hysteresis.

use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

const TAN_22_5_DEG: f32 = 0.414_213_56;

const SUPPRESSED: u8 = 0;
const WEAK: u8 = 1;
const STRONG: u8 = 2;

/// Edge mask (255 on edges) of `smoothed`.
///
/// Pixels with magnitude above `high` seed edges; pixels above `low` are kept
/// when 8-connected to a seed. The one-pixel border is never an edge.
pub fn canny_edges(smoothed: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (w, h) = smoothed.dimensions();
    let mut out = GrayImage::new(w, h);
    if w < 3 || h < 3 {
        return out;
    }

    let gx = horizontal_sobel(smoothed);
    let gy = vertical_sobel(smoothed);
    let (wu, hu) = (w as usize, h as usize);
    let magnitude: Vec<f32> = gx
        .as_raw()
        .iter()
        .zip(gy.as_raw())
        .map(|(&x, &y)| (x as f32).abs() + (y as f32).abs())
        .collect();
    let mag = |x: usize, y: usize| magnitude[y * wu + x];

    let mut class = vec![SUPPRESSED; wu * hu];
    let mut stack = Vec::new();
    for y in 1..hu - 1 {
        for x in 1..wu - 1 {
            let m = mag(x, y);
            if m <= low {
                continue;
            }
            let dx = gx.get_pixel(x as u32, y as u32).0[0] as f32;
            let dy = gy.get_pixel(x as u32, y as u32).0[0] as f32;
            let (ax, ay) = (dx.abs(), dy.abs());

            // neighbours along the gradient direction
            let (n1, n2) = if ay <= ax * TAN_22_5_DEG {
                (mag(x - 1, y), mag(x + 1, y))
            } else if ax <= ay * TAN_22_5_DEG {
                (mag(x, y - 1), mag(x, y + 1))
            } else if (dx > 0.0) == (dy > 0.0) {
                (mag(x - 1, y - 1), mag(x + 1, y + 1))
            } else {
                (mag(x + 1, y - 1), mag(x - 1, y + 1))
            };
            // a plateau of two equal maxima keeps its first pixel only
            if !(m > n1 && m >= n2) {
                continue;
            }

            if m > high {
                class[y * wu + x] = STRONG;
                stack.push((x, y));
            } else {
                class[y * wu + x] = WEAK;
            }
        }
    }

    while let Some((x, y)) = stack.pop() {
        out.put_pixel(x as u32, y as u32, Luma([255]));
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                let idx = ny * wu + nx;
                if class[idx] == WEAK {
                    class[idx] = STRONG;
                    stack.push((nx, ny));
                }
            }
        }
    }
    out
}

//! Masks and debug renderings handed to collaborators.

use crate::{FrameGeometry, LaneFit, LaneSearchResult, PerspectiveMapper, SlidingWindow};
use image::{GrayImage, Luma, Rgb, RgbImage};

const WINDOW_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LEFT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const RIGHT_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Fill every row between the two boundaries, each pulled inward by `inset`.
///
/// Rows where the inset boundaries cross (or are not finite) stay empty.
pub fn road_area_rectified(
    width: u32,
    height: u32,
    left: &LaneFit,
    right: &LaneFit,
    inset: f64,
) -> GrayImage {
    let mut out = GrayImage::new(width, height);
    if width == 0 {
        return out;
    }
    let last = (width - 1) as f64;
    for y in 0..height {
        let lo = (left.x_at(y as f64) + inset).ceil();
        let hi = (right.x_at(y as f64) - inset).floor();
        if !(lo.is_finite() && hi.is_finite()) || lo > hi || hi < 0.0 || lo > last {
            continue;
        }
        for x in lo.max(0.0) as u32..=hi.min(last) as u32 {
            out.put_pixel(x, y, Luma([255]));
        }
    }
    out
}

/// Road region between the fitted boundaries as a full-frame camera mask.
///
/// Rows above `frame.crop_top` are always zero. Unwarped pixels count as road
/// when at least half covered.
pub fn road_area_mask(
    mapper: &PerspectiveMapper,
    frame: &FrameGeometry,
    left: &LaneFit,
    right: &LaneFit,
    inset: f64,
) -> GrayImage {
    let (rw, rh) = mapper.rectified_size();
    let rectified = road_area_rectified(rw, rh, left, right, inset);
    let camera = mapper.unwarp(&rectified);

    let mut out = GrayImage::new(frame.width, frame.height);
    for (x, y, px) in camera.enumerate_pixels() {
        let fy = y + frame.crop_top;
        if px.0[0] >= 128 && x < frame.width && fy < frame.height {
            out.put_pixel(x, fy, Luma([255]));
        }
    }
    out
}

fn outline_window(img: &mut RgbImage, window: &SlidingWindow) {
    if !window.is_inside() || window.y_low >= window.y_high {
        return;
    }
    let (w, h) = img.dimensions();
    let x_hi = window.x_high.min(w.saturating_sub(1));
    let y_hi = (window.y_high - 1).min(h.saturating_sub(1));
    if window.x_low > x_hi || window.y_low > y_hi {
        return;
    }
    for x in window.x_low..=x_hi {
        img.put_pixel(x, window.y_low, WINDOW_COLOR);
        img.put_pixel(x, y_hi, WINDOW_COLOR);
    }
    for y in window.y_low..=y_hi {
        img.put_pixel(window.x_low, y, WINDOW_COLOR);
        img.put_pixel(x_hi, y, WINDOW_COLOR);
    }
}

/// RGB copy of the searched mask with windows outlined in green, left pixels
/// red and right pixels blue.
pub fn search_debug_image(rectified: &GrayImage, search: &LaneSearchResult) -> RgbImage {
    let mut out = RgbImage::from_fn(rectified.width(), rectified.height(), |x, y| {
        let v = rectified.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    });
    for window in search.left.windows.iter().chain(search.right.windows.iter()) {
        outline_window(&mut out, window);
    }
    for (pixels, color) in [
        (&search.left.pixels, LEFT_COLOR),
        (&search.right.pixels, RIGHT_COLOR),
    ] {
        for p in pixels {
            if p.x < out.width() && p.y < out.height() {
                out.put_pixel(p.x, p.y, color);
            }
        }
    }
    out
}

use crate::{sample_bilinear_u8, GrayImageView};
use ::image::GrayImage;
use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};
use serde::{Deserialize, Serialize};

/// Planar projective transform `p' ~ H * p`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    /// Inverse transform, rescaled so that `h[(2, 2)] == 1` when possible.
    pub fn inverse(&self) -> Option<Self> {
        let inv = self.h.try_inverse()?;
        Some(Self::new(normalize_homography(inv).unwrap_or(inv)))
    }
}

fn hartley_normalization(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };

    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn normalize_points4(pts: &[Point2<f32>; 4]) -> ([Point2<f64>; 4], Matrix3<f64>) {
    // Hartley normalization: translate to centroid, scale so mean distance = sqrt(2)
    let n = 4.0_f64;
    let (mut cx, mut cy) = (0.0_f64, 0.0_f64);
    for p in pts {
        cx += p.x as f64;
        cy += p.y as f64;
    }
    cx /= n;
    cy /= n;

    let mean_dist = pts
        .iter()
        .map(|p| (p.x as f64 - cx).hypot(p.y as f64 - cy))
        .sum::<f64>()
        / n;

    let t = hartley_normalization(cx, cy, mean_dist);
    let out = pts.map(|p| {
        let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
        Point2::new(v[0], v[1])
    });

    (out, t)
}

fn normalize_homography(h: Matrix3<f64>) -> Option<Matrix3<f64>> {
    let s = h[(2, 2)];
    if s.abs() < 1e-12 {
        return None;
    }
    Some(h / s)
}

fn denormalize_homography(
    hn: Matrix3<f64>,
    t_src: Matrix3<f64>,
    t_dst: Matrix3<f64>,
) -> Option<Matrix3<f64>> {
    let t_dst_inv = t_dst.try_inverse()?;
    Some(t_dst_inv * hn * t_src)
}

/// Compute H such that `dst ~ H * src` from exactly four correspondences.
///
/// Corner order must be consistent between `src` and `dst`. Returns `None`
/// when the correspondences are degenerate (repeated or collinear points).
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    // Unknowns: [h11 h12 h13 h21 h22 h23 h31 h32], with h33 = 1
    // For each correspondence (x,y)->(u,v):
    // h11 x + h12 y + h13 - u h31 x - u h32 y = u
    // h21 x + h22 y + h23 - v h31 x - v h32 y = v
    let (src_n, t_src) = normalize_points4(src);
    let (dst_n, t_dst) = normalize_points4(dst);

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for k in 0..4 {
        let x = src_n[k].x;
        let y = src_n[k].y;
        let u = dst_n[k].x;
        let v = dst_n[k].y;

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let x = a.lu().solve(&b)?;
    if x.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let hn = Matrix3::<f64>::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    let h_den = denormalize_homography(hn, t_src, t_dst)?;
    let h_den = normalize_homography(h_den)?;
    // collinear input leaves a rank-deficient map behind
    if h_den.determinant().abs() < 1e-12 {
        return None;
    }

    Some(Homography::new(h_den))
}

/// Inverse-map warp: every output pixel `(x, y)` is mapped through
/// `h_src_from_dst` and the source is sampled bilinearly there.
///
/// Pixel centres sit on integer coordinates, so an identity map copies the
/// source exactly. Samples falling outside the source read as 0.
pub fn warp_perspective_gray(
    src: &GrayImageView<'_>,
    h_src_from_dst: &Homography,
    out_w: u32,
    out_h: u32,
) -> GrayImage {
    let mut out = GrayImage::new(out_w, out_h);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let ps = h_src_from_dst.apply(Point2::new(x as f32, y as f32));
        if ps.x.is_finite() && ps.y.is_finite() {
            px.0[0] = sample_bilinear_u8(src, ps.x, ps.y);
        }
    }
    out
}

//! Pixel fits to world-unit curvature radius and lateral offset.

use crate::{GeometryParams, LaneFit};
use lane_geometry_core::fit_quadratic;
use serde::{Deserialize, Serialize};

/// World-unit lane geometry for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvatureResult {
    /// Mean of the two side radii; `+∞` for straight lanes.
    pub radius_m: f64,
    pub left_radius_m: f64,
    pub right_radius_m: f64,
    /// Positive when the vehicle sits right of the lane center. May be NaN
    /// when both boundaries coincide at the reference row.
    pub lateral_offset_m: f64,
}

/// Radius of `x = a·y² + b·y + c` at `y`; `+∞` when `a == 0`.
pub fn radius_of_curvature(coeffs: [f64; 3], y: f64) -> f64 {
    let [a, b, _] = coeffs;
    if a == 0.0 {
        return f64::INFINITY;
    }
    let slope = 2.0 * a * y + b;
    (1.0 + slope * slope).powf(1.5) / (2.0 * a).abs()
}

/// Converts pixel-space fits into world units.
#[derive(Clone, Debug)]
pub struct GeometryEvaluator {
    params: GeometryParams,
}

impl GeometryEvaluator {
    pub fn new(params: GeometryParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GeometryParams {
        &self.params
    }

    /// Radius and lateral offset of a `width × height` rectified view.
    pub fn evaluate(
        &self,
        width: u32,
        height: u32,
        left: &LaneFit,
        right: &LaneFit,
    ) -> CurvatureResult {
        let ym = self.params.ym_per_pix();
        let y_eval = height.saturating_sub(1) as f64 * ym;

        let left_radius_m = self.world_radius(height, left, y_eval);
        let right_radius_m = self.world_radius(height, right, y_eval);
        let radius_m = (left_radius_m + right_radius_m) / 2.0;

        let lateral_offset_m = self.lateral_offset(width, height, left, right);
        log::debug!(
            "geometry: radius {radius_m:.1} m (left {left_radius_m:.1}, right {right_radius_m:.1}), offset {lateral_offset_m:.3} m"
        );

        CurvatureResult {
            radius_m,
            left_radius_m,
            right_radius_m,
            lateral_offset_m,
        }
    }

    /// Re-fit the sampled boundary in metres and take its radius at `y_eval`.
    fn world_radius(&self, height: u32, fit: &LaneFit, y_eval: f64) -> f64 {
        let ym = self.params.ym_per_pix();
        let xm = self.params.xm_per_pix();
        let ys: Vec<f64> = (0..height).map(|y| y as f64 * ym).collect();
        let xs: Vec<f64> = (0..height).map(|y| fit.x_at(y as f64) * xm).collect();
        match fit_quadratic(&ys, &xs) {
            Some(world) => radius_of_curvature(world, y_eval),
            None => f64::INFINITY,
        }
    }

    fn lateral_offset(&self, width: u32, height: u32, left: &LaneFit, right: &LaneFit) -> f64 {
        let row = self.params.reference_row.min(height.saturating_sub(1)) as f64;
        let left_x = left.x_at(row);
        let right_x = right.x_at(row);

        let scale = self.params.lane_width_m / (left_x - right_x).abs();
        let lane_center = (left_x + right_x) / 2.0 * scale;
        let camera_center = width as f64 / 2.0 * scale;
        camera_center - lane_center + self.params.mounting_bias_m
    }

    /// Offset for the controller, or `None` when non-finite or implausible.
    pub fn trusted_offset(&self, result: &CurvatureResult) -> Option<f64> {
        let offset = result.lateral_offset_m;
        (offset.is_finite() && offset.abs() <= self.params.max_abs_offset_m).then_some(offset)
    }

    /// Radius for the controller, or `None` for straight or noisy fits.
    pub fn reliable_radius(&self, result: &CurvatureResult) -> Option<f64> {
        let radius = result.radius_m;
        (radius.is_finite() && radius <= self.params.max_radius_m).then_some(radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unbiased() -> GeometryParams {
        GeometryParams {
            mounting_bias_m: 0.0,
            ..GeometryParams::default()
        }
    }

    #[test]
    fn zero_quadratic_term_is_straight() {
        assert_eq!(radius_of_curvature([0.0, 0.3, 12.0], 19.98), f64::INFINITY);
    }

    #[test]
    fn radius_grows_as_curvature_vanishes() {
        let y = 19.98;
        let mut prev = 0.0;
        for a in [1e-3, 1e-4, 1e-5, 1e-6] {
            let r = radius_of_curvature([a, 0.0, 0.0], y);
            assert!(r > prev, "radius {r} for a={a} not above {prev}");
            prev = r;
        }
        assert!(prev > 1e5);
    }

    #[test]
    fn circle_like_curve_matches_closed_form() {
        // x = a y² at its vertex has radius 1 / (2a)
        let r = radius_of_curvature([0.01, 0.0, 0.0], 0.0);
        assert_relative_eq!(r, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn straight_lanes_have_huge_radius() {
        let eval = GeometryEvaluator::new(GeometryParams::default());
        let result = eval.evaluate(
            2880,
            1000,
            &LaneFit::new(0.0, 0.0, 1400.0),
            &LaneFit::new(0.0, 0.0, 1750.0),
        );
        assert!(result.radius_m > 1e6);
        assert_eq!(eval.reliable_radius(&result), None);
    }

    #[test]
    fn curved_lanes_report_reliable_radius() {
        let eval = GeometryEvaluator::new(GeometryParams::default());
        let left = LaneFit::new(2e-4, -0.1, 1400.0);
        let right = LaneFit::new(2e-4, -0.1, 1750.0);
        let result = eval.evaluate(2880, 1000, &left, &right);

        // same curve in metres: a_w = a·xm/ym², b_w = b·xm/ym
        let p = GeometryParams::default();
        let (xm, ym) = (p.xm_per_pix(), p.ym_per_pix());
        let world = [2e-4 * xm / (ym * ym), -0.1 * xm / ym, 0.0];
        let expected = radius_of_curvature(world, 999.0 * ym);
        assert_relative_eq!(result.left_radius_m, expected, max_relative = 1e-6);
        assert_relative_eq!(result.radius_m, expected, max_relative = 1e-6);
        let reliable = eval.reliable_radius(&result).expect("finite radius");
        assert!(reliable < p.max_radius_m);
    }

    #[test]
    fn vehicle_right_of_center_is_positive() {
        let eval = GeometryEvaluator::new(unbiased());
        let left = LaneFit::new(0.0, 0.0, 100.0);
        let right = LaneFit::new(0.0, 0.0, 300.0);
        let result = eval.evaluate(600, 1000, &left, &right);
        // camera 300, lane center 200, 3.7 m over 200 px
        assert_relative_eq!(result.lateral_offset_m, 1.85, epsilon = 1e-12);
        assert_eq!(eval.trusted_offset(&result), Some(result.lateral_offset_m));
    }

    #[test]
    fn mounting_bias_is_added() {
        let eval = GeometryEvaluator::new(GeometryParams::default());
        let left = LaneFit::new(0.0, 0.0, 1340.0);
        let right = LaneFit::new(0.0, 0.0, 1540.0);
        let result = eval.evaluate(2880, 1000, &left, &right);
        // camera 1440 == lane center
        assert_relative_eq!(result.lateral_offset_m, 1.8, epsilon = 1e-12);
    }

    #[test]
    fn offset_is_measured_at_reference_row() {
        let params = GeometryParams {
            reference_row: 50,
            ..unbiased()
        };
        let eval = GeometryEvaluator::new(params);
        // left boundary drifts with y; at y=50 it sits at 100
        let left = LaneFit::new(0.0, 1.0, 50.0);
        let right = LaneFit::new(0.0, 0.0, 300.0);
        let result = eval.evaluate(600, 100, &left, &right);
        assert_relative_eq!(result.lateral_offset_m, 1.85, epsilon = 1e-9);
    }

    #[test]
    fn reference_row_is_clamped_to_last_row() {
        let eval = GeometryEvaluator::new(unbiased());
        // reference_row 940 clamps to 99
        let left = LaneFit::new(0.0, 1.0, 1.0);
        let right = LaneFit::new(0.0, 0.0, 300.0);
        let result = eval.evaluate(600, 100, &left, &right);
        assert_relative_eq!(result.lateral_offset_m, 1.85, epsilon = 1e-9);
    }

    #[test]
    fn coincident_boundaries_give_no_offset() {
        let eval = GeometryEvaluator::new(GeometryParams::default());
        let fit = LaneFit::new(0.0, 0.0, 1500.0);
        let result = eval.evaluate(2880, 1000, &fit, &fit);
        assert!(!result.lateral_offset_m.is_finite());
        assert_eq!(eval.trusted_offset(&result), None);
    }

    #[test]
    fn implausible_offset_is_dropped() {
        let eval = GeometryEvaluator::new(unbiased());
        // 3.7 m lane entirely left of the camera
        let left = LaneFit::new(0.0, 0.0, 0.0);
        let right = LaneFit::new(0.0, 0.0, 200.0);
        let result = eval.evaluate(2000, 1000, &left, &right);
        assert!(result.lateral_offset_m > 3.7);
        assert_eq!(eval.trusted_offset(&result), None);
    }
}

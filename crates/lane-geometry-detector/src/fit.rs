//! Per-side quadratic fit with fallback to the remembered curve.

use crate::LanePixel;
use lane_geometry_core::{eval_quadratic, fit_quadratic};
use serde::{Deserialize, Serialize};

/// Lane boundary `x = a·y² + b·y + c` in rectified pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneFit {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl LaneFit {
    pub const ZERO: Self = Self {
        a: 0.0,
        b: 0.0,
        c: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    pub fn from_coeffs([a, b, c]: [f64; 3]) -> Self {
        Self { a, b, c }
    }

    pub fn coeffs(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }

    /// Column of the boundary at row `y`.
    #[inline]
    pub fn x_at(&self, y: f64) -> f64 {
        eval_quadratic(&self.coeffs(), y)
    }
}

/// Whether a side's curve came from this frame's pixels or from memory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "fit", rename_all = "snake_case")]
pub enum FitOutcome {
    Fitted(LaneFit),
    Fallback(LaneFit),
}

impl FitOutcome {
    #[inline]
    pub fn fit(&self) -> LaneFit {
        match self {
            Self::Fitted(fit) | Self::Fallback(fit) => *fit,
        }
    }

    #[inline]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Least-squares fit through `pixels`, or `memory_fit` unchanged when the
/// pixels cannot determine a quadratic (fewer than three distinct rows).
pub fn fit_lane(pixels: &[LanePixel], memory_fit: LaneFit) -> FitOutcome {
    let ys: Vec<f64> = pixels.iter().map(|p| p.y as f64).collect();
    let xs: Vec<f64> = pixels.iter().map(|p| p.x as f64).collect();

    match fit_quadratic(&ys, &xs) {
        Some(coeffs) if coeffs.iter().all(|c| c.is_finite()) => {
            FitOutcome::Fitted(LaneFit::from_coeffs(coeffs))
        }
        _ => {
            log::debug!(
                "degenerate lane fit from {} pixels, keeping remembered curve",
                pixels.len()
            );
            FitOutcome::Fallback(memory_fit)
        }
    }
}

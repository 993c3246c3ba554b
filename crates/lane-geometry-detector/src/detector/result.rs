use crate::{CurvatureResult, FitOutcome, LaneSearchResult};
use image::GrayImage;

/// Intermediate masks kept when `LaneDetectorParams::collect_debug` is set.
#[derive(Clone, Debug)]
pub struct LaneDebugImages {
    /// Otsu foreground, crop coordinates.
    pub binary: GrayImage,
    /// Canny edges, crop coordinates.
    pub edges: GrayImage,
    /// Closed `binary AND edges`, crop coordinates.
    pub lane: GrayImage,
    /// Rectified, corridor-restricted and thickened mask the search ran on.
    pub rectified: GrayImage,
}

/// Everything one frame produced.
#[derive(Clone, Debug)]
pub struct LaneDetection {
    pub left: FitOutcome,
    pub right: FitOutcome,
    pub left_base_x: usize,
    pub right_base_x: usize,
    pub search: LaneSearchResult,
    pub curvature: CurvatureResult,
    /// `curvature.lateral_offset_m` when finite and plausible.
    pub lateral_offset_m: Option<f64>,
    /// `curvature.radius_m` when finite and below the configured limit.
    pub reliable_radius_m: Option<f64>,
    pub debug: Option<LaneDebugImages>,
}

impl LaneDetection {
    /// `true` when either side reused the remembered curve.
    pub fn any_fallback(&self) -> bool {
        self.left.is_fallback() || self.right.is_fallback()
    }
}

use crate::ParamsError;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Fixed camera resolution and the row where the road region starts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    /// Rows `[0, crop_top)` (sky, horizon) are discarded before processing.
    pub crop_top: u32,
}

impl FrameGeometry {
    /// Height of the processed road region.
    #[inline]
    pub fn crop_height(&self) -> u32 {
        self.height.saturating_sub(self.crop_top)
    }
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            width: 2880,
            height: 2000,
            crop_top: 1000,
        }
    }
}

/// Binarization settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessParams {
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Side of the square structuring element used by the closing (odd).
    pub close_kernel: u32,
    /// Dilations, then as many erosions.
    pub close_iterations: u32,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            canny_low: 10.0,
            canny_high: 60.0,
            close_kernel: 11,
            close_iterations: 2,
        }
    }
}

/// Bird's-eye calibration.
///
/// Point order is bottom-left, top-left, top-right, bottom-right. Source
/// points are in crop coordinates (row 0 is `FrameGeometry::crop_top`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerspectiveParams {
    pub src: [[f32; 2]; 4],
    pub dst: [[f32; 2]; 4],
    pub rectified_width: u32,
    pub rectified_height: u32,
    /// Columns outside `[corridor_x_min, corridor_x_max)` are cleared after warping.
    pub corridor_x_min: u32,
    pub corridor_x_max: u32,
    pub thicken_kernel: u32,
    pub thicken_iterations: u32,
}

impl PerspectiveParams {
    pub fn src_points(&self) -> [Point2<f32>; 4] {
        self.src.map(|[x, y]| Point2::new(x, y))
    }

    pub fn dst_points(&self) -> [Point2<f32>; 4] {
        self.dst.map(|[x, y]| Point2::new(x, y))
    }
}

impl Default for PerspectiveParams {
    fn default() -> Self {
        Self {
            src: [[440.0, 645.0], [1350.0, 0.0], [1785.0, 0.0], [2585.0, 645.0]],
            dst: [[1350.0, 940.0], [1350.0, 0.0], [1785.0, 0.0], [1785.0, 940.0]],
            rectified_width: 2880,
            rectified_height: 1000,
            corridor_x_min: 1200,
            corridor_x_max: 2000,
            thicken_kernel: 11,
            thicken_iterations: 2,
        }
    }
}

/// Sliding-window search settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Number of horizontal bands.
    pub num_windows: usize,
    /// Window spans columns `[center - w, center + w)`.
    pub window_half_width: u32,
    /// A window recenters only when it holds more pixels than this.
    pub min_pixels: usize,
    /// Shift of the left/right histogram split away from the image centre.
    pub midpoint_offset: i32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            num_windows: 10,
            window_half_width: 50,
            min_pixels: 50,
            midpoint_offset: 300,
        }
    }
}

/// Pixel-to-world conversion constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryParams {
    /// Road length covered by `longitudinal_span_px` rectified rows.
    pub longitudinal_span_m: f64,
    pub longitudinal_span_px: f64,
    /// Physical lane width and its nominal rectified column span.
    pub lane_width_m: f64,
    pub lane_width_px: f64,
    /// Rectified row where the lateral offset is measured.
    pub reference_row: u32,
    /// Camera mounting offset added to the lateral estimate.
    pub mounting_bias_m: f64,
    /// Offsets beyond this magnitude are reported as unknown.
    pub max_abs_offset_m: f64,
    /// Radii above this are treated as "no reliable curvature".
    pub max_radius_m: f64,
}

impl GeometryParams {
    #[inline]
    pub fn ym_per_pix(&self) -> f64 {
        self.longitudinal_span_m / self.longitudinal_span_px
    }

    #[inline]
    pub fn xm_per_pix(&self) -> f64 {
        self.lane_width_m / self.lane_width_px
    }
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            longitudinal_span_m: 20.0,
            longitudinal_span_px: 1000.0,
            lane_width_m: 3.7,
            lane_width_px: 2030.0,
            reference_row: 940,
            mounting_bias_m: 1.8,
            max_abs_offset_m: 3.7,
            max_radius_m: 10_000.0,
        }
    }
}

/// Configuration for the lane detector.
///
/// `Default` is the calibrated camera; every constant tied to that mounting
/// lives here so a new camera means a new params value, not code changes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneDetectorParams {
    #[serde(default)]
    pub frame: FrameGeometry,
    #[serde(default)]
    pub preprocess: PreprocessParams,
    #[serde(default)]
    pub perspective: PerspectiveParams,
    #[serde(default)]
    pub search: SearchParams,
    #[serde(default)]
    pub geometry: GeometryParams,
    /// Road-area polygon is shrunk by this many pixels on both sides.
    #[serde(default = "default_road_area_inset")]
    pub road_area_inset_px: f64,
    /// Keep intermediate masks in `LaneDetection::debug`.
    #[serde(default)]
    pub collect_debug: bool,
}

fn default_road_area_inset() -> f64 {
    5.0
}

fn check_kernel(name: &'static str, size: u32) -> Result<(), ParamsError> {
    if size == 0 || size % 2 == 0 || size > 511 {
        return Err(ParamsError::InvalidKernel { name, size });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ParamsError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ParamsError::NonPositive { name, value });
    }
    Ok(())
}

impl LaneDetectorParams {
    /// Column splitting the histogram into left and right halves.
    #[inline]
    pub fn histogram_split(&self) -> i64 {
        (self.perspective.rectified_width / 2) as i64 + self.search.midpoint_offset as i64
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let frame = &self.frame;
        if frame.width == 0 || frame.height == 0 {
            return Err(ParamsError::EmptyFrame {
                width: frame.width,
                height: frame.height,
            });
        }
        if frame.crop_top >= frame.height {
            return Err(ParamsError::CropOutsideFrame {
                crop_top: frame.crop_top,
                height: frame.height,
            });
        }

        let pre = &self.preprocess;
        if !(pre.canny_low >= 0.0 && pre.canny_low <= pre.canny_high) {
            return Err(ParamsError::InvalidCannyThresholds {
                low: pre.canny_low,
                high: pre.canny_high,
            });
        }
        check_kernel("close", pre.close_kernel)?;

        let persp = &self.perspective;
        if persp.rectified_width == 0 || persp.rectified_height == 0 {
            return Err(ParamsError::EmptyRectified {
                width: persp.rectified_width,
                height: persp.rectified_height,
            });
        }
        if persp.corridor_x_min >= persp.corridor_x_max
            || persp.corridor_x_max > persp.rectified_width
        {
            return Err(ParamsError::InvalidCorridor {
                min: persp.corridor_x_min,
                max: persp.corridor_x_max,
                width: persp.rectified_width,
            });
        }
        check_kernel("thicken", persp.thicken_kernel)?;

        let split = self.histogram_split();
        if split <= 0 || split >= persp.rectified_width as i64 {
            return Err(ParamsError::SplitOutsideImage {
                split,
                width: persp.rectified_width,
            });
        }
        let search = &self.search;
        if search.num_windows == 0 || search.num_windows > persp.rectified_height as usize {
            return Err(ParamsError::InvalidWindowCount {
                windows: search.num_windows,
                rows: persp.rectified_height,
            });
        }
        if search.window_half_width == 0 {
            return Err(ParamsError::EmptyWindow);
        }

        let geom = &self.geometry;
        if geom.reference_row >= persp.rectified_height {
            return Err(ParamsError::ReferenceRowOutside {
                row: geom.reference_row,
                height: persp.rectified_height,
            });
        }
        check_positive("longitudinal_span_m", geom.longitudinal_span_m)?;
        check_positive("longitudinal_span_px", geom.longitudinal_span_px)?;
        check_positive("lane_width_m", geom.lane_width_m)?;
        check_positive("lane_width_px", geom.lane_width_px)?;
        check_positive("max_abs_offset_m", geom.max_abs_offset_m)?;
        check_positive("max_radius_m", geom.max_radius_m)?;
        if !geom.mounting_bias_m.is_finite() {
            return Err(ParamsError::NonPositive {
                name: "mounting_bias_m",
                value: geom.mounting_bias_m,
            });
        }
        if !(self.road_area_inset_px.is_finite() && self.road_area_inset_px >= 0.0) {
            return Err(ParamsError::NonPositive {
                name: "road_area_inset_px",
                value: self.road_area_inset_px,
            });
        }
        Ok(())
    }
}

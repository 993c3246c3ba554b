/// Inconsistent calibration or tuning values.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("frame size must be non-zero (width={width}, height={height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("crop_top={crop_top} leaves no rows in a frame of height {height}")]
    CropOutsideFrame { crop_top: u32, height: u32 },
    #[error("rectified size must be non-zero (width={width}, height={height})")]
    EmptyRectified { width: u32, height: u32 },
    #[error("{name} kernel must be odd and in 1..=511 (got {size})")]
    InvalidKernel { name: &'static str, size: u32 },
    #[error("canny thresholds must satisfy 0 <= low <= high (low={low}, high={high})")]
    InvalidCannyThresholds { low: f32, high: f32 },
    #[error("corridor [{min}, {max}) is empty or exceeds rectified width {width}")]
    InvalidCorridor { min: u32, max: u32, width: u32 },
    #[error("histogram split {split} must lie strictly inside the rectified width {width}")]
    SplitOutsideImage { split: i64, width: u32 },
    #[error("need at least one window per rectified row (windows={windows}, rows={rows})")]
    InvalidWindowCount { windows: usize, rows: u32 },
    #[error("window half-width must be positive")]
    EmptyWindow,
    #[error("reference row {row} is outside the rectified height {height}")]
    ReferenceRowOutside { row: u32, height: u32 },
    #[error("{name} must be finite and positive (got {value})")]
    NonPositive { name: &'static str, value: f64 },
}

/// Errors returned by the lane detector.
#[derive(thiserror::Error, Debug)]
pub enum LaneDetectError {
    #[error(
        "frame is {got_width}x{got_height}, calibrated geometry expects {expected_width}x{expected_height}"
    )]
    FrameSize {
        expected_width: u32,
        expected_height: u32,
        got_width: u32,
        got_height: u32,
    },
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error("perspective calibration points do not define an invertible homography")]
    Homography,
}

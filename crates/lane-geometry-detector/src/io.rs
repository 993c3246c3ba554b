//! JSON configuration and report helpers.

use crate::{FitOutcome, LaneDetection, LaneDetectorParams};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum LaneIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LaneDetectorParams {
    /// Load params from a JSON file. Missing sections fall back to defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LaneIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write params to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), LaneIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Serializable per-frame summary for the control loop and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneFrameReport {
    pub frame: String,
    #[serde(default)]
    pub left: Option<FitOutcome>,
    #[serde(default)]
    pub right: Option<FitOutcome>,
    #[serde(default)]
    pub left_base_x: Option<usize>,
    #[serde(default)]
    pub right_base_x: Option<usize>,
    #[serde(default)]
    pub left_pixels: usize,
    #[serde(default)]
    pub right_pixels: usize,
    /// Mean radius when reliable.
    #[serde(default)]
    pub radius_m: Option<f64>,
    /// Trusted lateral offset.
    #[serde(default)]
    pub lateral_offset_m: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl LaneFrameReport {
    pub fn from_detection(frame: impl Into<String>, detection: &LaneDetection) -> Self {
        Self {
            frame: frame.into(),
            left: Some(detection.left),
            right: Some(detection.right),
            left_base_x: Some(detection.left_base_x),
            right_base_x: Some(detection.right_base_x),
            left_pixels: detection.search.left.pixels.len(),
            right_pixels: detection.search.right.pixels.len(),
            radius_m: detection.reliable_radius_m,
            lateral_offset_m: detection.lateral_offset_m,
            error: None,
        }
    }

    /// Report for a frame that never produced a detection.
    pub fn failed(frame: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            frame: frame.into(),
            left: None,
            right: None,
            left_base_x: None,
            right_base_x: None,
            left_pixels: 0,
            right_pixels: 0,
            radius_m: None,
            lateral_offset_m: None,
            error: Some(error.to_string()),
        }
    }

    /// Single-line JSON, as emitted by the CLI.
    pub fn to_json_line(&self) -> Result<String, LaneIoError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LaneFit;

    #[test]
    fn params_round_trip_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("params.json");
        let mut params = LaneDetectorParams::default();
        params.search.min_pixels = 75;
        params.collect_debug = true;
        params.write_json(&path).expect("write");
        let loaded = LaneDetectorParams::load_json(&path).expect("load");
        assert_eq!(loaded, params);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = LaneDetectorParams::load_json(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, LaneIoError::Io(_)));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ \"frame\": ").expect("write");
        let err = LaneDetectorParams::load_json(&path).unwrap_err();
        assert!(matches!(err, LaneIoError::Json(_)));
    }

    #[test]
    fn failed_report_carries_error_only() {
        let report = LaneFrameReport::failed("f.png", "frame is 10x10");
        let json: serde_json::Value =
            serde_json::from_str(&report.to_json_line().expect("json")).expect("parse");
        assert_eq!(json["frame"], "f.png");
        assert_eq!(json["error"], "frame is 10x10");
        assert!(json["left"].is_null());
    }

    #[test]
    fn report_parses_back() {
        let report = LaneFrameReport {
            frame: "a.png".into(),
            left: Some(FitOutcome::Fitted(LaneFit::new(0.0, 0.0, 400.0))),
            right: Some(FitOutcome::Fallback(LaneFit::ZERO)),
            left_base_x: Some(400),
            right_base_x: Some(0),
            left_pixels: 1200,
            right_pixels: 0,
            radius_m: None,
            lateral_offset_m: Some(-0.25),
            error: None,
        };
        let line = report.to_json_line().expect("json");
        assert!(!line.contains('\n'));
        let parsed: LaneFrameReport = serde_json::from_str(&line).expect("parse");
        assert_eq!(parsed, report);
    }
}

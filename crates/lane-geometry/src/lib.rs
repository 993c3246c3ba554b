//! High-level facade crate for the `lane-geometry-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the core and detector crates
//! - frame loading from image files
//! - a `LaneTracker` that owns the lane memory across a frame sequence
//! - (feature `cli`, on by default) the `lane-geometry` binary
//!
//! ## Quickstart
//!
//! ```no_run
//! use lane_geometry::{load_frame, LaneDetectorParams, LaneTracker};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tracker = LaneTracker::new(LaneDetectorParams::default())?;
//! for path in ["frame_000.png", "frame_001.png"] {
//!     let frame = load_frame(path)?;
//!     let detection = tracker.process(&frame)?;
//!     println!("offset: {:?} m", detection.lateral_offset_m);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `lane_geometry::core`: image view, homography and warp, Otsu, quadratic fit, logger.
//! - `lane_geometry::detector`: the per-frame pipeline, params, results and overlays.

pub use lane_geometry_core as core;
pub use lane_geometry_detector as detector;

pub use lane_geometry_detector::{
    CurvatureResult, FitOutcome, LaneDetectError, LaneDetection, LaneDetector,
    LaneDetectorParams, LaneFit, LaneFrameReport, LaneIoError, LaneMemory, ParamsError,
};

mod frames;
mod tracker;

pub use frames::{load_frame, FrameError};
pub use tracker::LaneTracker;

//! Per-frame lane pipeline.
//!
//! This module wires binarization, bird's-eye rectification, the sliding
//! window search, per-side fitting and the world-unit geometry together, and
//! threads the caller's `LaneMemory` through each frame.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::{LaneDetectError, ParamsError};
pub use params::{
    FrameGeometry, GeometryParams, LaneDetectorParams, PerspectiveParams, PreprocessParams,
    SearchParams,
};
pub use pipeline::LaneDetector;
pub use result::{LaneDebugImages, LaneDetection};

//! Per-frame lane geometry estimation on top of `lane-geometry-core`.
//!
//! ## Quickstart
//!
//! ```
//! use image::GrayImage;
//! use lane_geometry_detector::{LaneDetector, LaneDetectorParams, LaneMemory};
//!
//! let detector = LaneDetector::new(LaneDetectorParams::default())?;
//!
//! // a rectified mask without any lane pixels: both sides keep the memory
//! let rectified = GrayImage::new(2880, 1000);
//! let (detection, memory) = detector.track_rectified(&rectified, LaneMemory::new());
//! assert!(detection.left.is_fallback() && detection.right.is_fallback());
//! assert_eq!(memory, LaneMemory::new());
//! # Ok::<(), lane_geometry_detector::LaneDetectError>(())
//! ```
//!
//! Pipeline, per frame:
//! 1. Crop the road region and convert it to intensity.
//! 2. Otsu foreground AND Canny edges, closed with a square element.
//! 3. Warp to the bird's-eye plane, clear columns outside the corridor,
//!    thicken the strokes.
//! 4. Seed both sides from the lower-half column histogram and walk the
//!    sliding windows bottom to top.
//! 5. Fit `x = a·y² + b·y + c` per side; a side without enough rows reuses
//!    the remembered curve.
//! 6. Re-fit in metres for the curvature radius; measure the lateral offset
//!    at the reference row.

mod detector;
mod edges;
mod fit;
mod geometry;
mod io;
mod memory;
mod overlay;
mod perspective;
mod preprocess;
mod search;

pub use detector::{
    FrameGeometry, GeometryParams, LaneDebugImages, LaneDetectError, LaneDetection,
    LaneDetector, LaneDetectorParams, ParamsError, PerspectiveParams, PreprocessParams,
    SearchParams,
};
pub use edges::canny_edges;
pub use fit::{fit_lane, FitOutcome, LaneFit};
pub use geometry::{radius_of_curvature, CurvatureResult, GeometryEvaluator};
pub use io::{LaneFrameReport, LaneIoError};
pub use memory::LaneMemory;
pub use overlay::{road_area_mask, road_area_rectified, search_debug_image};
pub use perspective::PerspectiveMapper;
pub use preprocess::{and_masks, close_square, dilate_square, preprocess, PreprocessOutput};
pub use search::{
    column_histogram, HistogramSeeds, LanePixel, LaneSearchResult, LaneSearcher, SideSearch,
    SlidingWindow,
};

use crate::{load_frame, FrameError};
use image::RgbImage;
use lane_geometry_detector::{
    LaneDetectError, LaneDetection, LaneDetector, LaneDetectorParams, LaneMemory,
};
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Consecutive fallback frames before the tracker warns.
const FALLBACK_WARN_STREAK: u32 = 5;

/// Runs a frame sequence through one detector, carrying the lane memory.
///
/// `process` takes `&mut self`, so a tracker never sees two frames at once.
/// Repeated fallbacks are counted and logged; they never fail a frame.
#[derive(Clone, Debug)]
pub struct LaneTracker {
    detector: LaneDetector,
    memory: LaneMemory,
    frames: u64,
    fallback_streak: u32,
}

impl LaneTracker {
    pub fn new(params: LaneDetectorParams) -> Result<Self, LaneDetectError> {
        Ok(Self::from_detector(LaneDetector::new(params)?))
    }

    pub fn from_detector(detector: LaneDetector) -> Self {
        Self {
            detector,
            memory: LaneMemory::new(),
            frames: 0,
            fallback_streak: 0,
        }
    }

    #[inline]
    pub fn detector(&self) -> &LaneDetector {
        &self.detector
    }

    #[inline]
    pub fn memory(&self) -> &LaneMemory {
        &self.memory
    }

    /// Frames processed successfully.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Consecutive frames, up to the latest, where a side fell back.
    #[inline]
    pub fn fallback_streak(&self) -> u32 {
        self.fallback_streak
    }

    /// Forget the lane memory, e.g. after a cut in the video.
    pub fn reset(&mut self) {
        self.memory = LaneMemory::new();
        self.fallback_streak = 0;
    }

    /// Detect lanes in the next frame. A rejected frame leaves the memory as is.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all, fields(frame = self.frames)))]
    pub fn process(&mut self, frame: &RgbImage) -> Result<LaneDetection, LaneDetectError> {
        let (detection, memory) = self.detector.detect(frame, self.memory)?;
        self.memory = memory;
        self.frames += 1;

        if detection.any_fallback() {
            self.fallback_streak += 1;
            if self.fallback_streak == FALLBACK_WARN_STREAK {
                log::warn!(
                    "lane tracking degraded: {} consecutive frames reused remembered curves",
                    self.fallback_streak
                );
            } else {
                log::debug!("fallback streak {}", self.fallback_streak);
            }
        } else {
            if self.fallback_streak >= FALLBACK_WARN_STREAK {
                log::info!(
                    "lane tracking recovered after {} fallback frames",
                    self.fallback_streak
                );
            }
            self.fallback_streak = 0;
        }
        Ok(detection)
    }

    /// Load an image file and process it as the next frame.
    pub fn process_path(&mut self, path: impl AsRef<Path>) -> Result<LaneDetection, FrameError> {
        let frame = load_frame(path)?;
        Ok(self.process(&frame)?)
    }
}

use super::{LaneDebugImages, LaneDetectError, LaneDetection, LaneDetectorParams};
use crate::fit::fit_lane;
use crate::geometry::GeometryEvaluator;
use crate::memory::LaneMemory;
use crate::overlay;
use crate::perspective::PerspectiveMapper;
use crate::preprocess::preprocess;
use crate::search::{LaneSearchResult, LaneSearcher};
use image::{imageops, GrayImage, RgbImage};
use lane_geometry_core::luma_bt601;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Lane geometry estimator for one calibrated camera.
///
/// Immutable after construction; all per-frame state lives in the
/// `LaneMemory` the caller passes in and gets back.
#[derive(Clone, Debug)]
pub struct LaneDetector {
    params: LaneDetectorParams,
    mapper: PerspectiveMapper,
    searcher: LaneSearcher,
    evaluator: GeometryEvaluator,
}

impl LaneDetector {
    /// Validate the params and solve the perspective calibration.
    pub fn new(params: LaneDetectorParams) -> Result<Self, LaneDetectError> {
        params.validate()?;
        let mapper = PerspectiveMapper::new(&params.frame, &params.perspective)?;
        let searcher = LaneSearcher::new(params.search);
        let evaluator = GeometryEvaluator::new(params.geometry);
        Ok(Self {
            params,
            mapper,
            searcher,
            evaluator,
        })
    }

    #[inline]
    pub fn params(&self) -> &LaneDetectorParams {
        &self.params
    }

    #[inline]
    pub fn mapper(&self) -> &PerspectiveMapper {
        &self.mapper
    }

    /// Run one frame.
    ///
    /// Returns the detection and the memory to pass to the next frame. Only
    /// a frame of the calibrated resolution is accepted.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame, memory), fields(width = frame.width(), height = frame.height()))
    )]
    pub fn detect(
        &self,
        frame: &RgbImage,
        memory: LaneMemory,
    ) -> Result<(LaneDetection, LaneMemory), LaneDetectError> {
        let geom = &self.params.frame;
        let (w, h) = frame.dimensions();
        if (w, h) != (geom.width, geom.height) {
            return Err(LaneDetectError::FrameSize {
                expected_width: geom.width,
                expected_height: geom.height,
                got_width: w,
                got_height: h,
            });
        }

        let crop = imageops::crop_imm(frame, 0, geom.crop_top, geom.width, geom.crop_height())
            .to_image();
        let gray = luma_bt601(&crop);
        let pre = preprocess(&gray, &self.params.preprocess);
        let rectified = self.rectify(&pre.lane);

        let (mut detection, memory) = self.track_rectified(&rectified, memory);
        if self.params.collect_debug {
            detection.debug = Some(LaneDebugImages {
                binary: pre.binary,
                edges: pre.edges,
                lane: pre.lane,
                rectified,
            });
        }
        Ok((detection, memory))
    }

    /// Warp a crop-space lane mask, clear the columns outside the corridor
    /// and thicken what is left.
    pub fn rectify(&self, lane_mask: &GrayImage) -> GrayImage {
        let warped = self.mapper.warp(lane_mask);
        let restricted = self.mapper.restrict_corridor(warped);
        self.mapper.thicken(&restricted)
    }

    /// Search, fit and evaluate an already rectified mask.
    pub fn track_rectified(
        &self,
        rectified: &GrayImage,
        memory: LaneMemory,
    ) -> (LaneDetection, LaneMemory) {
        let search = self.searcher.search(rectified);
        let left = fit_lane(&search.left.pixels, memory.left_fit);
        let right = fit_lane(&search.right.pixels, memory.right_fit);

        let (w, h) = rectified.dimensions();
        let curvature = self.evaluator.evaluate(w, h, &left.fit(), &right.fit());
        let lateral_offset_m = self.evaluator.trusted_offset(&curvature);
        let reliable_radius_m = self.evaluator.reliable_radius(&curvature);

        let next = memory.advance(&left, &right, search.left.base_x, search.right.base_x);
        log::debug!(
            "frame: left {} px{}, right {} px{}, offset {:?}",
            search.left.pixels.len(),
            if left.is_fallback() { " (fallback)" } else { "" },
            search.right.pixels.len(),
            if right.is_fallback() { " (fallback)" } else { "" },
            lateral_offset_m
        );

        let detection = LaneDetection {
            left,
            right,
            left_base_x: search.left.base_x,
            right_base_x: search.right.base_x,
            search,
            curvature,
            lateral_offset_m,
            reliable_radius_m,
            debug: None,
        };
        (detection, next)
    }

    /// Full-frame camera mask of the road between the detected boundaries.
    pub fn road_area_mask(&self, detection: &LaneDetection) -> GrayImage {
        overlay::road_area_mask(
            &self.mapper,
            &self.params.frame,
            &detection.left.fit(),
            &detection.right.fit(),
            self.params.road_area_inset_px,
        )
    }

    /// Search windows and classified pixels drawn over the rectified mask.
    pub fn search_debug_image(&self, rectified: &GrayImage, search: &LaneSearchResult) -> RgbImage {
        overlay::search_debug_image(rectified, search)
    }
}

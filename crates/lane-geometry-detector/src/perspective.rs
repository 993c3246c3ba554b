use crate::{FrameGeometry, LaneDetectError, PerspectiveParams};
use crate::preprocess::dilate_square;
use image::GrayImage;
use lane_geometry_core::{homography_from_4pt, warp_perspective_gray, GrayImageView, Homography};
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Fixed bird's-eye mapping between the cropped camera region and the
/// rectified (top-down) plane.
#[derive(Clone, Debug)]
pub struct PerspectiveMapper {
    /// camera → rectified (M)
    h_rect_from_cam: Homography,
    /// rectified → camera (Minv)
    h_cam_from_rect: Homography,
    camera_size: (u32, u32),
    rectified_size: (u32, u32),
    corridor: (u32, u32),
    thicken_kernel: u32,
    thicken_iterations: u32,
}

impl PerspectiveMapper {
    /// Solve both homographies from the calibrated quadrilaterals.
    pub fn new(frame: &FrameGeometry, params: &PerspectiveParams) -> Result<Self, LaneDetectError> {
        let src = params.src_points();
        let dst = params.dst_points();
        let h_rect_from_cam =
            homography_from_4pt(&src, &dst).ok_or(LaneDetectError::Homography)?;
        let h_cam_from_rect = h_rect_from_cam
            .inverse()
            .ok_or(LaneDetectError::Homography)?;

        Ok(Self {
            h_rect_from_cam,
            h_cam_from_rect,
            camera_size: (frame.width, frame.crop_height()),
            rectified_size: (params.rectified_width, params.rectified_height),
            corridor: (params.corridor_x_min, params.corridor_x_max),
            thicken_kernel: params.thicken_kernel,
            thicken_iterations: params.thicken_iterations,
        })
    }

    /// Camera → rectified transform.
    #[inline]
    pub fn forward(&self) -> &Homography {
        &self.h_rect_from_cam
    }

    /// Rectified → camera transform.
    #[inline]
    pub fn inverse(&self) -> &Homography {
        &self.h_cam_from_rect
    }

    /// `(width, height)` of the cropped camera region.
    #[inline]
    pub fn camera_size(&self) -> (u32, u32) {
        self.camera_size
    }

    /// `(width, height)` of the rectified plane.
    #[inline]
    pub fn rectified_size(&self) -> (u32, u32) {
        self.rectified_size
    }

    #[inline]
    pub fn to_rectified(&self, p_cam: Point2<f32>) -> Point2<f32> {
        self.h_rect_from_cam.apply(p_cam)
    }

    #[inline]
    pub fn to_camera(&self, p_rect: Point2<f32>) -> Point2<f32> {
        self.h_cam_from_rect.apply(p_rect)
    }

    /// Rectify a camera-space mask (bilinear).
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn warp(&self, mask: &GrayImage) -> GrayImage {
        let (w, h) = self.rectified_size;
        warp_perspective_gray(&GrayImageView::from(mask), &self.h_cam_from_rect, w, h)
    }

    /// Clear every column outside the calibrated corridor.
    pub fn restrict_corridor(&self, mut mask: GrayImage) -> GrayImage {
        let (x_min, x_max) = self.corridor;
        for (x, _, px) in mask.enumerate_pixels_mut() {
            if x < x_min || x >= x_max {
                px.0[0] = 0;
            }
        }
        mask
    }

    /// Widen thin rectified strokes for the window search.
    pub fn thicken(&self, mask: &GrayImage) -> GrayImage {
        dilate_square(mask, self.thicken_kernel, self.thicken_iterations)
    }

    /// Project a rectified-space drawing back onto the cropped camera region.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn unwarp(&self, overlay: &GrayImage) -> GrayImage {
        let (w, h) = self.camera_size;
        warp_perspective_gray(&GrayImageView::from(overlay), &self.h_rect_from_cam, w, h)
    }
}

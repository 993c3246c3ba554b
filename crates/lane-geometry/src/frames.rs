use image::{ImageReader, RgbImage};
use lane_geometry_detector::LaneDetectError;
use std::path::Path;

/// Errors produced while turning an image file into a detection.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Detect(#[from] LaneDetectError),
}

/// Decode an image file into an 8-bit RGB frame.
pub fn load_frame(path: impl AsRef<Path>) -> Result<RgbImage, FrameError> {
    Ok(ImageReader::open(path)?.decode()?.to_rgb8())
}

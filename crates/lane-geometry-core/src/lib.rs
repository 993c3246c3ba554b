//! Core types and utilities for lane geometry estimation.
//!
//! This crate is intentionally small and purely geometric: a borrowed
//! grayscale view with bilinear sampling, the 4-point perspective solve and
//! warp used for bird's-eye rectification, Otsu thresholding and a
//! conditioned quadratic least-squares fit. It knows nothing about lanes.

mod gray;
mod homography;
mod logger;
mod polyfit;
mod threshold;

pub use gray::{luma_bt601, sample_bilinear, sample_bilinear_u8, GrayImageView};
pub use homography::{homography_from_4pt, warp_perspective_gray, Homography};
pub use polyfit::{eval_quadratic, fit_quadratic};
pub use threshold::{binarize_above, otsu_threshold, otsu_threshold_from_samples};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};

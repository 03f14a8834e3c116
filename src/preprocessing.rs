// src/preprocessing.rs

use crate::types::Frame;
use anyhow::{Context, Result};
use opencv::{
    core::{self, Mat, Scalar, Size},
    imgproc,
    prelude::*,
};

/// Shrink an image by an integer factor with bilinear interpolation.
///
/// OpenCV's `INTER_LINEAR` samples at pixel centres, so detections in the
/// small image map back onto the full frame by plain multiplication.
pub fn downscale(src: &Mat, factor: u32) -> Result<Mat> {
    let factor = factor.max(1) as i32;
    if factor == 1 || src.empty() {
        return Ok(src.try_clone()?);
    }

    let size = Size::new((src.cols() / factor).max(1), (src.rows() / factor).max(1));
    let mut dst = Mat::default();
    imgproc::resize(src, &mut dst, size, 0.0, 0.0, imgproc::INTER_LINEAR)
        .context("downscale failed")?;
    Ok(dst)
}

/// Copy an RGB frame into an owned 8UC3 Mat (channel order stays RGB).
pub fn frame_to_mat(frame: &Frame) -> Result<Mat> {
    let mut mat = Mat::new_rows_cols_with_default(
        frame.height as i32,
        frame.width as i32,
        core::CV_8UC3,
        Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(&frame.data);
    Ok(mat)
}

pub fn rgb_to_gray(rgb: &Mat) -> Result<Mat> {
    let mut gray = Mat::default();
    imgproc::cvt_color(rgb, &mut gray, imgproc::COLOR_RGB2GRAY, 0)
        .context("RGB to grayscale conversion failed")?;
    Ok(gray)
}

pub fn rgb_to_hsv(rgb: &Mat) -> Result<Mat> {
    let mut hsv = Mat::default();
    imgproc::cvt_color(rgb, &mut hsv, imgproc::COLOR_RGB2HSV, 0)
        .context("RGB to HSV conversion failed")?;
    Ok(hsv)
}

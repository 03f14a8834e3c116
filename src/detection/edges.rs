// src/detection/edges.rs
//
// Path-edge detection: Canny on the ball band with the diamond markers
// masked out, then probabilistic Hough segments.

use super::band::DetectionBand;
use crate::preprocessing::{rgb_to_gray, rgb_to_hsv};
use crate::types::{EdgeConfig, LineSegment, Point};
use anyhow::{Context, Result};
use opencv::{
    core::{self, Mat, Point as CvPoint, Scalar, Size, Vec4i, Vector},
    imgproc,
    prelude::*,
};
use std::f64::consts::PI;
use tracing::debug;

pub struct EdgeDetector {
    params: EdgeConfig,
}

impl EdgeDetector {
    pub fn new(params: EdgeConfig) -> Self {
        Self { params }
    }

    /// Path-edge segments in full-frame pixels. Empty when nothing is found.
    pub fn detect(&self, band: &DetectionBand) -> Result<Vec<LineSegment>> {
        let diamonds = self.diamond_mask(&band.rgb)?;
        let edges = self.masked_edges(&band.rgb, &diamonds)?;

        let min_length = band.rows() as f64 * self.params.min_length_ratio;
        let mut lines = Vector::<Vec4i>::new();
        imgproc::hough_lines_p(
            &edges,
            &mut lines,
            1.0,
            PI / 180.0,
            self.params.hough_threshold,
            min_length,
            self.params.max_gap,
        )
        .context("probabilistic Hough failed")?;

        let transform = band.transform;
        let segments: Vec<LineSegment> = lines
            .iter()
            .map(|l| {
                let a = transform.to_full(Point::new(l[0], l[1]));
                let b = transform.to_full(Point::new(l[2], l[3]));
                LineSegment {
                    x1: a.x,
                    y1: a.y,
                    x2: b.x,
                    y2: b.y,
                }
            })
            .collect();

        debug!("{} edge segment(s) in band", segments.len());
        Ok(segments)
    }

    /// Dilated mask of the collectible diamonds (255 where a diamond is).
    pub fn diamond_mask(&self, rgb: &Mat) -> Result<Mat> {
        let hsv = rgb_to_hsv(rgb)?;
        let [hl, sl, vl] = self.params.diamond_hsv_low;
        let [hh, sh, vh] = self.params.diamond_hsv_high;

        let mut mask = Mat::default();
        core::in_range(
            &hsv,
            &Scalar::new(hl, sl, vl, 0.0),
            &Scalar::new(hh, sh, vh, 0.0),
            &mut mask,
        )?;

        if self.params.diamond_dilate_iterations <= 0 {
            return Ok(mask);
        }

        let kernel = imgproc::get_structuring_element(
            imgproc::MORPH_RECT,
            Size::new(3, 3),
            CvPoint::new(-1, -1),
        )?;
        let mut dilated = Mat::default();
        imgproc::dilate(
            &mask,
            &mut dilated,
            &kernel,
            CvPoint::new(-1, -1),
            self.params.diamond_dilate_iterations,
            core::BORDER_CONSTANT,
            imgproc::morphology_default_border_value()?,
        )?;
        Ok(dilated)
    }

    /// Canny edges with every pixel under `mask` cleared.
    fn masked_edges(&self, rgb: &Mat, mask: &Mat) -> Result<Mat> {
        let gray = rgb_to_gray(rgb)?;
        let mut edges = Mat::default();
        imgproc::canny(
            &gray,
            &mut edges,
            self.params.canny_low,
            self.params.canny_high,
            3,
            false,
        )
        .context("Canny failed")?;

        let mut keep = Mat::default();
        core::bitwise_not(mask, &mut keep, &Mat::default())?;
        let mut filtered = Mat::default();
        core::bitwise_and(&edges, &keep, &mut filtered, &Mat::default())?;
        Ok(filtered)
    }
}

// src/detection/ball.rs
//
// Hough-circle ball detection inside the horizontal band the ball never
// leaves.

use super::band::DetectionBand;
use crate::preprocessing::rgb_to_gray;
use crate::types::{BallConfig, BallState, Point};
use anyhow::{Context, Result};
use opencv::{
    core::{Vec3f, Vector},
    imgproc,
    prelude::*,
};
use tracing::debug;

pub struct BallDetector {
    params: BallConfig,
}

impl BallDetector {
    pub fn new(params: BallConfig) -> Self {
        Self { params }
    }

    /// Strongest circle in full-frame pixels, or `None` when nothing matches.
    pub fn detect(&self, band: &DetectionBand) -> Result<Option<BallState>> {
        let gray = rgb_to_gray(&band.rgb)?;
        let band_h = band.rows() as f64;

        let min_dist = scaled_at_least_one(band_h, self.params.min_dist_ratio) as f64;
        let min_radius = scaled_at_least_one(band_h, self.params.min_radius_ratio);
        let max_radius = scaled_at_least_one(band_h, self.params.max_radius_ratio);

        let mut circles = Vector::<Vec3f>::new();
        imgproc::hough_circles(
            &gray,
            &mut circles,
            imgproc::HOUGH_GRADIENT,
            self.params.dp,
            min_dist,
            self.params.canny_high,
            self.params.accumulator_threshold,
            min_radius,
            max_radius,
        )
        .context("Hough circle detection failed")?;

        let transform = band.transform;
        let Some(best) = circles.iter().next() else {
            debug!(
                "No ball in band rows {}..{}",
                transform.y_top,
                transform.y_top + transform.scale_len(band.rows() as i32)
            );
            return Ok(None);
        };

        let center = transform.to_full(Point::new(
            best[0].round() as i32,
            best[1].round() as i32,
        ));
        let ball = BallState {
            x: center.x,
            y: center.y,
            radius: transform.scale_len(best[2].round() as i32),
        };

        debug!(
            "Ball at ({}, {}) r={} ({} candidate(s))",
            ball.x,
            ball.y,
            ball.radius,
            circles.len()
        );
        Ok(Some(ball))
    }
}

/// `floor(len * ratio)`, never below 1.
fn scaled_at_least_one(len: f64, ratio: f64) -> i32 {
    ((len * ratio) as i32).max(1)
}

// src/detection/band.rs
//
// The horizontal strip the ball travels in, cropped at full resolution and
// then downscaled. Built once per frame and shared by the ball and edge
// detectors.

use crate::geometry::{crop_centered, BandTransform};
use crate::preprocessing::{downscale, frame_to_mat};
use crate::types::{BandConfig, Frame};
use anyhow::Result;
use opencv::{core::Mat, prelude::*};

pub struct DetectionBand {
    /// RGB band rows, downscaled.
    pub rgb: Mat,
    /// Maps band pixels back to full-frame pixels.
    pub transform: BandTransform,
}

impl DetectionBand {
    /// `None` when the frame or the configured band has no rows.
    pub fn extract(frame: &Frame, config: &BandConfig) -> Result<Option<Self>> {
        let (band, y_top, _) = crop_centered(frame, config.center_ratio, config.crop_ratio);
        if band.is_empty() {
            return Ok(None);
        }

        let rgb = downscale(&frame_to_mat(&band)?, config.downscale)?;
        Ok(Some(Self {
            rgb,
            transform: BandTransform::new(config.downscale, y_top),
        }))
    }

    pub fn rows(&self) -> usize {
        self.rgb.rows() as usize
    }
}

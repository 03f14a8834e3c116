// src/overlay.rs
//
// Vision window: the captured frame with the detection band, edge
// segments, ball and probe points drawn on top.

use crate::geometry::band_rows;
use crate::interface::Overlay;
use crate::pipeline::{FrameContext, LoopState};
use crate::preprocessing::frame_to_mat;
use crate::types::{BandConfig, VisionConfig};
use anyhow::{Context, Result};
use opencv::{
    core::{Mat, Point, Scalar},
    highgui, imgproc,
    prelude::*,
};
use tracing::info;

const KEY_ESC: i32 = 27;

// BGR
fn green() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}
fn red() -> Scalar {
    Scalar::new(0.0, 0.0, 255.0, 0.0)
}
fn yellow() -> Scalar {
    Scalar::new(0.0, 255.0, 255.0, 0.0)
}
fn cyan() -> Scalar {
    Scalar::new(255.0, 255.0, 0.0, 0.0)
}
fn grey() -> Scalar {
    Scalar::new(128.0, 128.0, 128.0, 0.0)
}

pub struct HighguiOverlay {
    window_name: String,
    poll_delay_ms: i32,
    band: BandConfig,
}

impl HighguiOverlay {
    pub fn new(vision: &VisionConfig, band: BandConfig) -> Result<Self> {
        highgui::named_window(&vision.window_name, highgui::WINDOW_NORMAL)
            .context("failed to open vision window")?;
        info!("Vision window '{}' opened", vision.window_name);

        Ok(Self {
            window_name: vision.window_name.clone(),
            poll_delay_ms: vision.poll_delay_ms.max(1),
            band,
        })
    }
}

impl Overlay for HighguiOverlay {
    fn present(&mut self, ctx: &FrameContext, fps: f64) -> Result<bool> {
        if ctx.frame.is_empty() {
            return Ok(false);
        }

        let canvas = render(ctx, fps, &self.band)?;
        highgui::imshow(&self.window_name, &canvas)?;

        let key = highgui::wait_key(self.poll_delay_ms)?;
        if key == KEY_ESC || key == i32::from(b'q') {
            info!("Exit requested from vision window");
            return Ok(true);
        }
        Ok(false)
    }
}

impl Drop for HighguiOverlay {
    fn drop(&mut self) {
        let _ = highgui::destroy_window(&self.window_name);
    }
}

/// Draw one frame's annotations onto a BGR copy of the capture.
pub fn render(ctx: &FrameContext, fps: f64, band: &BandConfig) -> Result<Mat> {
    let rgb = frame_to_mat(&ctx.frame)?;
    let mut canvas = Mat::default();
    imgproc::cvt_color(&rgb, &mut canvas, imgproc::COLOR_RGB2BGR, 0)?;

    let width = canvas.cols();
    let (top, bottom) = band_rows(ctx.frame.height, band.center_ratio, band.crop_ratio);
    for y in [top as i32, bottom as i32] {
        imgproc::line(
            &mut canvas,
            Point::new(0, y),
            Point::new(width, y),
            grey(),
            1,
            imgproc::LINE_8,
            0,
        )?;
    }

    for seg in &ctx.segments {
        imgproc::line(
            &mut canvas,
            Point::new(seg.x1, seg.y1),
            Point::new(seg.x2, seg.y2),
            green(),
            2,
            imgproc::LINE_8,
            0,
        )?;
    }

    if let Some(ball) = ctx.ball {
        imgproc::circle(
            &mut canvas,
            Point::new(ball.x, ball.y),
            ball.radius.max(1),
            red(),
            2,
            imgproc::LINE_8,
            0,
        )?;
    }

    if let Some(probes) = ctx.verdict.and_then(|v| v.probes) {
        for (p, color) in [(probes.front, yellow()), (probes.iso, cyan())] {
            imgproc::circle(
                &mut canvas,
                Point::new(p.x, p.y),
                4,
                color,
                -1,
                imgproc::LINE_8,
                0,
            )?;
        }
    }

    let status_color = match ctx.state {
        LoopState::Active => green(),
        LoopState::TrackSuspended => red(),
        _ => grey(),
    };
    let status = format!(
        "{} | dir {} | {:.1} fps{}",
        ctx.state.as_str(),
        ctx.direction,
        fps,
        if ctx.direction_changed { " | TURN" } else { "" }
    );
    imgproc::put_text(
        &mut canvas,
        &status,
        Point::new(10, 30),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.7,
        status_color,
        2,
        imgproc::LINE_8,
        false,
    )?;

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{ProbePoints, Verdict};
    use crate::types::{BallState, Direction, Frame, LineSegment};
    use opencv::core::Vec3b;

    fn bgr_at(mat: &Mat, x: i32, y: i32) -> [u8; 3] {
        let px = mat.at_2d::<Vec3b>(y, x).unwrap();
        [px[0], px[1], px[2]]
    }

    #[test]
    fn test_render_swaps_to_bgr() {
        let frame = Frame::filled(40, 60, [200, 10, 20]);
        let ctx = FrameContext::new(1, frame, LoopState::StartupDelay, Direction::Right);
        let canvas = render(&ctx, 0.0, &BandConfig::default()).unwrap();

        assert_eq!(canvas.cols(), 40);
        assert_eq!(canvas.rows(), 60);
        // A pixel away from the status text and band lines.
        assert_eq!(bgr_at(&canvas, 35, 55), [20, 10, 200]);
    }

    #[test]
    fn test_render_draws_annotations() {
        let frame = Frame::filled(800, 1200, [0, 0, 0]);
        let mut ctx = FrameContext::new(7, frame, LoopState::Active, Direction::Right);
        ctx.ball = Some(BallState {
            x: 400,
            y: 600,
            radius: 16,
        });
        ctx.segments = vec![LineSegment {
            x1: 100,
            y1: 700,
            x2: 300,
            y2: 700,
        }];
        ctx.verdict = Some(Verdict {
            probes: Some(ProbePoints {
                front: crate::types::Point::new(466, 600),
                iso: crate::types::Point::new(433, 581),
            }),
            trigger: None,
        });

        let canvas = render(&ctx, 60.0, &BandConfig::default()).unwrap();
        assert_eq!(bgr_at(&canvas, 200, 700), [0, 255, 0]);
        assert_eq!(bgr_at(&canvas, 416, 600), [0, 0, 255]);
        assert_eq!(bgr_at(&canvas, 466, 600), [0, 255, 255]);
        assert_eq!(bgr_at(&canvas, 433, 581), [255, 255, 0]);
        // Band boundaries for a 1200-row frame.
        assert_eq!(bgr_at(&canvas, 700, 504), [128, 128, 128]);
    }
}

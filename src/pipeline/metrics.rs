// src/pipeline/metrics.rs
//
// Loop counters and frame rate. Owned by the loop thread only.

use std::time::Instant;

/// Weight of the newest sample in the smoothed FPS.
const FPS_SMOOTHING: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct LoopMetrics {
    pub frames_captured: u64,
    pub frames_processed: u64,
    pub ball_misses: u64,
    pub decisions: u64,
    pub clicks: u64,
    pub suspensions: u64,
    pub started_at: Instant,
    last_tick: Option<Instant>,
    smoothed_fps: f64,
}

impl LoopMetrics {
    pub fn new() -> Self {
        Self {
            frames_captured: 0,
            frames_processed: 0,
            ball_misses: 0,
            decisions: 0,
            clicks: 0,
            suspensions: 0,
            started_at: Instant::now(),
            last_tick: None,
            smoothed_fps: 0.0,
        }
    }

    /// Mark the end of an iteration and update the smoothed FPS.
    pub fn tick(&mut self, now: Instant) -> f64 {
        if let Some(last) = self.last_tick {
            let dt = now.duration_since(last).as_secs_f64();
            if dt > 0.0 {
                let instant_fps = 1.0 / dt;
                self.smoothed_fps = if self.smoothed_fps == 0.0 {
                    instant_fps
                } else {
                    self.smoothed_fps * (1.0 - FPS_SMOOTHING) + instant_fps * FPS_SMOOTHING
                };
            }
        }
        self.last_tick = Some(now);
        self.smoothed_fps
    }

    pub fn fps(&self) -> f64 {
        self.smoothed_fps
    }

    pub fn average_fps(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            self.frames_captured as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            frames_captured: self.frames_captured,
            frames_processed: self.frames_processed,
            ball_misses: self.ball_misses,
            decisions: self.decisions,
            clicks: self.clicks,
            suspensions: self.suspensions,
            fps: self.fps(),
            average_fps: self.average_fps(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for LoopMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub frames_captured: u64,
    pub frames_processed: u64,
    pub ball_misses: u64,
    pub decisions: u64,
    pub clicks: u64,
    pub suspensions: u64,
    pub fps: f64,
    pub average_fps: f64,
    pub elapsed_secs: f64,
}

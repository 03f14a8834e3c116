// src/pipeline/orchestrator.rs
//
// The poll → detect → decide → act loop. Single-threaded: each iteration
// captures one frame, works on it, hands it to the overlay and drops it.

use crate::decision::DecisionEngine;
use crate::detection::{render_edge_raster, BallDetector, DetectionBand, EdgeDetector};
use crate::interface::{Actuator, FrameSource, Overlay};
use crate::pipeline::state_machine::{in_startup_delay, DropoutTracker, LoopState};
use crate::pipeline::{FrameContext, LoopMetrics, MetricsSummary};
use crate::types::{BallState, Config, Direction, EdgeRaster, Frame, LineSegment};
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Cooperative stop request, checked once per iteration after rendering.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct Autopilot<S: FrameSource, A: Actuator, O: Overlay> {
    config: Config,
    source: S,
    actuator: A,
    overlay: O,

    ball_detector: BallDetector,
    edge_detector: EdgeDetector,
    engine: DecisionEngine,

    direction: Direction,
    tracker: DropoutTracker,
    state: LoopState,
    metrics: LoopMetrics,
    stop: StopHandle,
    frame_id: u64,
}

impl<S: FrameSource, A: Actuator, O: Overlay> Autopilot<S, A, O> {
    pub fn new(config: Config, source: S, actuator: A, overlay: O) -> Self {
        let detection = &config.detection;
        let ball_detector = BallDetector::new(detection.ball.clone());
        let edge_detector = EdgeDetector::new(detection.edges.clone());
        let engine = DecisionEngine::new(config.decision.clone());
        let tracker = DropoutTracker::new(config.tracking.dropout_threshold);
        let direction = config.decision.initial_direction;

        Self {
            config,
            source,
            actuator,
            overlay,
            ball_detector,
            edge_detector,
            engine,
            direction,
            tracker,
            state: LoopState::StartupDelay,
            metrics: LoopMetrics::new(),
            stop: StopHandle::default(),
            frame_id: 0,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn metrics(&self) -> &LoopMetrics {
        &self.metrics
    }

    /// Run until the overlay or the stop handle asks to quit. Consumes the
    /// autopilot so the capture source and overlay are released on return.
    pub fn run(mut self) -> Result<MetricsSummary> {
        info!(
            "Autopilot running: initial direction {}, startup delay {} ms, dropout threshold {}",
            self.direction, self.config.timing.startup_delay_ms, self.config.tracking.dropout_threshold
        );

        let started = Instant::now();
        while self.step(started.elapsed())? {}

        self.state = LoopState::Terminated;
        let summary = self.metrics.summary();
        info!(
            "Autopilot stopped after {} frame(s), {} click(s)",
            summary.frames_captured, summary.clicks
        );
        Ok(summary)
    }

    /// One iteration. Returns `false` once a quit was requested.
    pub fn step(&mut self, elapsed: Duration) -> Result<bool> {
        let frame = self.source.capture().context("frame capture failed")?;
        self.metrics.frames_captured += 1;
        self.frame_id += 1;

        let ctx = self.process(frame, elapsed)?;

        let fps = self.metrics.tick(Instant::now());
        let quit = self.overlay.present(&ctx, fps)?;

        if quit || self.stop.is_stopped() {
            info!("Quit requested at frame {}", ctx.frame_id);
            return Ok(false);
        }
        Ok(true)
    }

    /// Detect and decide on one captured frame.
    pub fn process(&mut self, frame: Frame, elapsed: Duration) -> Result<FrameContext> {
        let delay = Duration::from_millis(self.config.timing.startup_delay_ms);
        if in_startup_delay(elapsed, delay) {
            self.state = LoopState::StartupDelay;
            return Ok(FrameContext::new(
                self.frame_id,
                frame,
                self.state,
                self.direction,
            ));
        }

        let (ball, segments) = match DetectionBand::extract(&frame, &self.config.detection.band)? {
            Some(band) => (
                self.ball_detector.detect(&band)?,
                self.edge_detector.detect(&band)?,
            ),
            None => (None, Vec::new()),
        };
        let edges = render_edge_raster(
            &segments,
            frame.width,
            frame.height,
            self.config.detection.edges.stroke,
        )?;

        self.apply_detections(frame, ball, segments, edges)
    }

    /// Fold one frame's detections into tracking state and, while tracking
    /// is trusted, run the decision engine.
    pub fn apply_detections(
        &mut self,
        frame: Frame,
        ball: Option<BallState>,
        segments: Vec<LineSegment>,
        edges: EdgeRaster,
    ) -> Result<FrameContext> {
        self.metrics.frames_processed += 1;
        if ball.is_none() {
            self.metrics.ball_misses += 1;
        }

        let was_trusted = self.tracker.is_trusted();
        self.state = self.tracker.observe(ball.is_some());
        if was_trusted && self.state == LoopState::TrackSuspended {
            self.metrics.suspensions += 1;
        }

        let direction = self.direction;
        let mut verdict = None;
        let mut changed = false;

        if self.state == LoopState::Active {
            let (turned, v) = self.engine.decide_and_act(
                ball.map(|b| b.center()),
                &edges,
                &frame,
                direction,
                &mut self.actuator,
            )?;
            self.metrics.decisions += 1;
            verdict = Some(v);

            if turned {
                self.direction = direction.flipped();
                self.metrics.clicks += 1;
                changed = true;
            }
        }

        debug!(
            "Frame {}: state={} ball={:?} segments={} direction={}",
            self.frame_id,
            self.state.as_str(),
            ball,
            segments.len(),
            self.direction
        );

        let mut ctx = FrameContext::new(self.frame_id, frame, self.state, direction);
        ctx.ball = ball;
        ctx.segments = segments;
        ctx.edges = Some(edges);
        ctx.verdict = verdict;
        ctx.direction_changed = changed;
        Ok(ctx)
    }
}

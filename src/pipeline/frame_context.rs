// src/pipeline/frame_context.rs
//
// Everything one iteration produced for its frame. The overlay reads from
// here; nothing survives into the next iteration.

use crate::decision::Verdict;
use crate::pipeline::LoopState;
use crate::types::{BallState, Direction, EdgeRaster, Frame, LineSegment};

#[derive(Debug, Clone)]
pub struct FrameContext {
    pub frame_id: u64,
    pub frame: Frame,
    pub state: LoopState,
    pub direction: Direction,

    pub ball: Option<BallState>,
    pub segments: Vec<LineSegment>,
    pub edges: Option<EdgeRaster>,

    /// `None` unless the decision engine ran on this frame.
    pub verdict: Option<Verdict>,
    pub direction_changed: bool,
}

impl FrameContext {
    pub fn new(frame_id: u64, frame: Frame, state: LoopState, direction: Direction) -> Self {
        Self {
            frame_id,
            frame,
            state,
            direction,
            ball: None,
            segments: Vec::new(),
            edges: None,
            verdict: None,
            direction_changed: false,
        }
    }

    pub fn decided(&self) -> bool {
        self.verdict.is_some()
    }
}

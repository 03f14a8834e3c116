// src/pipeline/mod.rs

pub mod frame_context;
pub mod metrics;
pub mod orchestrator;
pub mod state_machine;

pub use frame_context::FrameContext;
pub use metrics::{LoopMetrics, MetricsSummary};
pub use orchestrator::{Autopilot, StopHandle};
pub use state_machine::{DropoutTracker, LoopState};

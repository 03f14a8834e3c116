// src/pipeline/state_machine.rs
//
// Loop lifecycle and ball-tracking confidence.

use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopState {
    /// Grace period after start: capture only.
    StartupDelay,
    /// Ball tracking trusted, decisions run.
    Active,
    /// Too many consecutive misses: detection continues, decisions frozen.
    TrackSuspended,
    Terminated,
}

impl LoopState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopState::StartupDelay => "STARTUP_DELAY",
            LoopState::Active => "ACTIVE",
            LoopState::TrackSuspended => "TRACK_SUSPENDED",
            LoopState::Terminated => "TERMINATED",
        }
    }
}

/// Consecutive-miss counter driving `Active` ⇄ `TrackSuspended`.
#[derive(Debug, Clone)]
pub struct DropoutTracker {
    threshold: u32,
    misses: u32,
}

impl DropoutTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            misses: 0,
        }
    }

    /// Record one detection result and return the resulting tracking state.
    pub fn observe(&mut self, detected: bool) -> LoopState {
        if detected {
            if self.misses >= self.threshold {
                info!("Ball reacquired after {} missed frame(s)", self.misses);
            }
            self.misses = 0;
        } else {
            self.misses = self.misses.saturating_add(1);
            if self.misses == self.threshold {
                warn!(
                    "Ball lost for {} consecutive frames, suspending decisions",
                    self.misses
                );
            }
        }
        self.state()
    }

    pub fn state(&self) -> LoopState {
        if self.is_trusted() {
            LoopState::Active
        } else {
            LoopState::TrackSuspended
        }
    }

    pub fn is_trusted(&self) -> bool {
        self.misses < self.threshold
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }
}

/// Whether the startup grace period is still running.
pub fn in_startup_delay(elapsed: Duration, delay: Duration) -> bool {
    elapsed < delay
}

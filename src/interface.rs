// src/interface.rs
//
// Seams to the host OS. The loop only talks to these traits; concrete
// backends live in capture.rs, actions.rs and overlay.rs.

use crate::pipeline::FrameContext;
use crate::geometry::WindowRect;
use crate::types::{Align, Frame};
use anyhow::Result;

/// Produces one RGB frame per poll from a live window.
pub trait FrameSource {
    /// Fails with `BotError::NotFound` when the window is gone.
    fn capture(&mut self) -> Result<Frame>;
}

/// Synthetic pointer input.
pub trait Actuator {
    /// Click at `at`, or at the current pointer position when `None`.
    fn click(&mut self, at: Option<(i32, i32)>) -> Result<()>;

    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;
}

/// Works out the target window rectangle for a height and alignment.
/// Returns the planned rectangle; backends that cannot move windows only
/// report it.
pub trait WindowPlacement {
    fn set_geometry(&mut self, title: &str, target_height: u32, align: Align) -> Result<WindowRect>;
}

/// Debug visualization. Never feeds anything back into the loop except the
/// quit request.
pub trait Overlay {
    /// Draw one iteration. Returns `true` when the user asked to quit.
    fn present(&mut self, ctx: &FrameContext, fps: f64) -> Result<bool>;
}

/// Used when vision is disabled.
pub struct NoOverlay;

impl Overlay for NoOverlay {
    fn present(&mut self, _ctx: &FrameContext, _fps: f64) -> Result<bool> {
        Ok(false)
    }
}

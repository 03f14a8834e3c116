// src/actions.rs
//
// Synthetic pointer input through enigo.

use crate::interface::Actuator;
use anyhow::{anyhow, Result};
use enigo::{Button, Coordinate, Direction as Press, Enigo, Mouse, Settings};
use tracing::debug;

pub struct EnigoActuator {
    enigo: Enigo,
}

impl EnigoActuator {
    pub fn new() -> Result<Self> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| anyhow!("failed to open input device: {e}"))?;
        Ok(Self { enigo })
    }
}

impl Actuator for EnigoActuator {
    fn click(&mut self, at: Option<(i32, i32)>) -> Result<()> {
        if let Some((x, y)) = at {
            self.move_to(x, y)?;
        }
        self.enigo
            .button(Button::Left, Press::Click)
            .map_err(|e| anyhow!("click failed: {e}"))?;
        debug!("Click at {:?}", at);
        Ok(())
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| anyhow!("pointer move to ({x}, {y}) failed: {e}"))
    }
}

// src/capture.rs
//
// Window capture. The xcap backend only builds with the `desktop` feature;
// buffer conversion is shared and always available.

use crate::error::BotError;
use crate::types::Frame;

/// Drop the alpha channel of a tightly packed RGBA buffer.
pub fn rgba_to_frame(raw: &[u8], width: usize, height: usize) -> Result<Frame, BotError> {
    if raw.len() != width * height * 4 {
        return Err(BotError::InvalidArgument(format!(
            "capture buffer holds {} bytes, expected {}x{}x4",
            raw.len(),
            width,
            height
        )));
    }
    let data = raw
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    Frame::new(data, width, height)
}

/// Cut window decorations off a capture: `title_bar` rows plus `border`
/// on the top, `border` on the other three sides. A window smaller than its
/// decorations yields an empty frame.
pub fn crop_decorations(frame: &Frame, title_bar: u32, border: u32) -> Frame {
    let (title_bar, border) = (title_bar as usize, border as usize);
    let x0 = border.min(frame.width);
    let x1 = frame.width.saturating_sub(border).max(x0);
    let y0 = (title_bar + border).min(frame.height);
    let y1 = frame.height.saturating_sub(border).max(y0);

    let (width, height) = (x1 - x0, y1 - y0);
    if width == 0 || height == 0 {
        return Frame::filled(0, 0, [0, 0, 0]).with_timestamp(frame.timestamp_ms);
    }

    let mut data = Vec::with_capacity(width * height * 3);
    for y in y0..y1 {
        let row = (y * frame.width + x0) * 3;
        data.extend_from_slice(&frame.data[row..row + width * 3]);
    }
    Frame {
        data,
        width,
        height,
        timestamp_ms: frame.timestamp_ms,
    }
}

#[cfg(feature = "desktop")]
pub use desktop::{PlacementAdvisor, WindowCapture};

#[cfg(feature = "desktop")]
mod desktop {
    use super::{crop_decorations, rgba_to_frame};
    use crate::error::BotError;
    use crate::geometry::{plan_window_geometry, WindowRect};
    use crate::interface::{FrameSource, WindowPlacement};
    use crate::types::{Align, Frame, WindowConfig};
    use anyhow::{anyhow, Context, Result};
    use std::time::Instant;
    use tracing::{debug, info, warn};
    use xcap::Window;

    fn find_window(title: &str) -> Result<Window> {
        let windows = Window::all().context("failed to enumerate windows")?;
        windows
            .into_iter()
            .find(|w| w.title() == title)
            .ok_or_else(|| BotError::NotFound(title.to_string()).into())
    }

    /// Captures one window, matched by exact title, with its title bar
    /// and border cropped off.
    pub struct WindowCapture {
        title: String,
        window: Window,
        title_bar_height: u32,
        border_width: u32,
        opened_at: Instant,
    }

    impl WindowCapture {
        pub fn open(config: &WindowConfig) -> Result<Self> {
            let window = find_window(&config.title)?;
            info!(
                "Capturing '{}' ({}x{} at {},{}), cropping {} px title bar and {} px border",
                config.title,
                window.width(),
                window.height(),
                window.x(),
                window.y(),
                config.title_bar_height,
                config.border_width
            );
            Ok(Self {
                title: config.title.clone(),
                window,
                title_bar_height: config.title_bar_height,
                border_width: config.border_width,
                opened_at: Instant::now(),
            })
        }
    }

    impl FrameSource for WindowCapture {
        fn capture(&mut self) -> Result<Frame> {
            let image = match self.window.capture_image() {
                Ok(image) => image,
                Err(e) => {
                    // A closed window surfaces as NotFound rather than a backend error.
                    find_window(&self.title)?;
                    return Err(anyhow!(e).context(format!("failed to capture '{}'", self.title)));
                }
            };

            let raw = rgba_to_frame(image.as_raw(), image.width() as usize, image.height() as usize)?
                .with_timestamp(self.opened_at.elapsed().as_secs_f64() * 1000.0);
            Ok(crop_decorations(&raw, self.title_bar_height, self.border_width))
        }
    }

    /// Works out where the window should go and reports it. xcap can read
    /// window geometry but has no call to move or resize a window, so the
    /// planned rectangle is returned and logged for the user to apply.
    pub struct PlacementAdvisor;

    impl WindowPlacement for PlacementAdvisor {
        fn set_geometry(&mut self, title: &str, target_height: u32, align: Align) -> Result<WindowRect> {
            let window = find_window(title)?;
            let monitor = window.current_monitor();
            let current = WindowRect {
                x: window.x(),
                y: window.y(),
                width: window.width(),
                height: window.height(),
            };

            let planned = plan_window_geometry(
                current,
                (monitor.width(), monitor.height()),
                target_height,
                align,
            );
            if planned == current {
                debug!("Window '{}' already at {:?}", title, current);
            } else {
                warn!(
                    "Move '{}' to ({}, {}) with size {}x{} ({}); this backend cannot place windows",
                    title,
                    planned.x,
                    planned.y,
                    planned.width,
                    planned.height,
                    align.as_str()
                );
            }
            Ok(planned)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_drops_alpha() {
        let raw = [10, 20, 30, 255, 40, 50, 60, 0];
        let frame = rgba_to_frame(&raw, 2, 1).unwrap();
        assert_eq!(frame.data, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(frame.pixel(1, 0), [40, 50, 60]);
    }

    #[test]
    fn test_rgba_size_mismatch_rejected() {
        let raw = [0u8; 15];
        assert!(matches!(
            rgba_to_frame(&raw, 2, 2),
            Err(BotError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_decorations_cropped() {
        let mut frame = Frame::filled(20, 50, [0, 0, 0]).with_timestamp(12.5);
        // First client pixel sits below the title bar and inside the border.
        frame.set_pixel(4, 34, [7, 8, 9]);
        frame.set_pixel(15, 45, [1, 2, 3]);

        let client = crop_decorations(&frame, 30, 4);
        assert_eq!((client.width, client.height), (12, 12));
        assert_eq!(client.data.len(), 12 * 12 * 3);
        assert_eq!(client.pixel(0, 0), [7, 8, 9]);
        assert_eq!(client.pixel(11, 11), [1, 2, 3]);
        assert_eq!(client.timestamp_ms, 12.5);
    }

    #[test]
    fn test_zero_decorations_keep_frame() {
        let frame = Frame::filled(6, 4, [5, 6, 7]);
        let same = crop_decorations(&frame, 0, 0);
        assert_eq!((same.width, same.height), (6, 4));
        assert_eq!(same.data, frame.data);
    }

    #[test]
    fn test_window_smaller_than_decorations_is_empty() {
        let frame = Frame::filled(6, 20, [5, 6, 7]);
        assert!(crop_decorations(&frame, 30, 4).is_empty());
        assert!(crop_decorations(&Frame::filled(6, 100, [0, 0, 0]), 0, 3).is_empty());
    }
}

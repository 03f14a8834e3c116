// src/geometry.rs
//
// Stateless helpers shared by the detectors, the decision engine and the
// window setup.

use crate::types::{Align, Direction, Frame, Point};

/// tan(30°), the isometric track angle.
const ISO_TAN: f64 = 0.577_350_269_189_625_8;

// ============================================================================
// BAND CROPPING
// ============================================================================

/// Crop a full-width horizontal band centered at `center_ratio * height`
/// with height `round(crop_ratio * height)`.
///
/// Returns the band and its absolute `[y_top, y_bottom)` rows. Requests
/// that reach past the frame are clipped to `[0, height]`, never wrapped.
pub fn crop_centered(frame: &Frame, center_ratio: f64, crop_ratio: f64) -> (Frame, usize, usize) {
    let (y_top, y_bottom) = band_rows(frame.height, center_ratio, crop_ratio);
    let row_bytes = frame.width * 3;

    let band = Frame {
        data: frame.data[y_top * row_bytes..y_bottom * row_bytes].to_vec(),
        width: frame.width,
        height: y_bottom - y_top,
        timestamp_ms: frame.timestamp_ms,
    };

    (band, y_top, y_bottom)
}

/// Row range of the centered band for a frame of `height` rows.
pub fn band_rows(height: usize, center_ratio: f64, crop_ratio: f64) -> (usize, usize) {
    if !center_ratio.is_finite() || !crop_ratio.is_finite() || crop_ratio <= 0.0 || height == 0 {
        return (0, 0);
    }

    let h = height as f64;
    let band = (h * crop_ratio).round() as i64;
    let mut top = (h * (center_ratio - crop_ratio / 2.0)).round() as i64;

    let in_range = center_ratio - crop_ratio / 2.0 >= 0.0 && center_ratio + crop_ratio / 2.0 <= 1.0;
    if in_range {
        // Rounding may push the band one row past the bottom edge.
        top = top.min(height as i64 - band).max(0);
    }

    let bottom = top + band;
    let top = top.clamp(0, height as i64) as usize;
    let bottom = bottom.clamp(top as i64, height as i64) as usize;
    (top, bottom)
}

// ============================================================================
// ISOMETRIC PROJECTION
// ============================================================================

/// Point ahead of `center` along the isometric track.
///
/// Shifted by `horizontal_distance / 2` in the travel direction and by
/// `horizontal_distance * tan(30°) / 2` upward. For positive distances both
/// offsets are at least one pixel.
pub fn isometric_front_point(center: Point, horizontal_distance: i32, direction: Direction) -> Point {
    let d = horizontal_distance as f64;
    let mut dx = (d / 2.0).round() as i32;
    let mut dy = (d * ISO_TAN / 2.0).round() as i32;
    if horizontal_distance > 0 {
        dx = dx.max(1);
        dy = dy.max(1);
    }

    let x = match direction {
        Direction::Left => center.x - dx,
        Direction::Right => center.x + dx,
    };
    Point::new(x, center.y - dy)
}

// ============================================================================
// BAND <-> FULL FRAME
// ============================================================================

/// Maps band-local, downscaled coordinates to full-frame pixels and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandTransform {
    pub scale: i32,
    /// First band row, in full-frame pixels.
    pub y_top: i32,
}

impl BandTransform {
    pub fn new(scale: u32, y_top: usize) -> Self {
        Self {
            scale: scale.max(1) as i32,
            y_top: y_top as i32,
        }
    }

    pub fn to_full(&self, p: Point) -> Point {
        Point::new(p.x * self.scale, p.y * self.scale + self.y_top)
    }

    pub fn to_band(&self, p: Point) -> Point {
        Point::new(
            p.x.div_euclid(self.scale),
            (p.y - self.y_top).div_euclid(self.scale),
        )
    }

    pub fn scale_len(&self, len: i32) -> i32 {
        len * self.scale
    }
}

// ============================================================================
// WINDOW GEOMETRY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Resize a window to `target_height` keeping its aspect ratio, then place
/// it according to `align` on a screen of `screen` (width, height).
pub fn plan_window_geometry(
    current: WindowRect,
    screen: (u32, u32),
    target_height: u32,
    align: Align,
) -> WindowRect {
    let aspect = if current.height == 0 {
        1.0
    } else {
        current.width as f64 / current.height as f64
    };
    let width = (target_height as f64 * aspect) as u32;
    let (screen_w, screen_h) = (screen.0 as i32, screen.1 as i32);

    let (x, y) = match align {
        Align::Left => (0, 0),
        Align::Center => (
            (screen_w - width as i32) / 2,
            (screen_h - target_height as i32) / 2,
        ),
        Align::Right => (screen_w - width as i32, 0),
        Align::None => (current.x, current.y),
    };

    WindowRect {
        x,
        y,
        width,
        height: target_height,
    }
}

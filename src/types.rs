// src/types.rs

use crate::error::BotError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub vision: VisionConfig,
    pub timing: TimingConfig,
    pub detection: DetectionConfig,
    pub decision: DecisionConfig,
    pub tracking: TrackingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Exact title of the emulator window to capture.
    pub title: String,
    /// Target client height; the window is left alone when unset.
    pub height: Option<u32>,
    pub align: Align,
    /// Rows of title bar cut from the top of every capture.
    pub title_bar_height: u32,
    /// Frame border cut from the left, right and bottom edges.
    pub border_width: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "BlueStacks App Player".to_string(),
            height: None,
            align: Align::None,
            title_bar_height: 30,
            border_width: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub enabled: bool,
    pub window_name: String,
    /// Delay handed to the highgui key poll, which also paces the loop.
    pub poll_delay_ms: i32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_name: "ZigZag Vision".to_string(),
            poll_delay_ms: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub startup_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            startup_delay_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub band: BandConfig,
    pub ball: BallConfig,
    pub edges: EdgeConfig,
}

/// Downscale and crop shared by both detectors so their coordinate
/// systems always agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    pub downscale: u32,
    pub center_ratio: f64,
    pub crop_ratio: f64,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            downscale: 2,
            center_ratio: 0.47,
            crop_ratio: 0.10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub dp: f64,
    pub min_dist_ratio: f64,
    pub min_radius_ratio: f64,
    pub max_radius_ratio: f64,
    /// Upper Canny threshold used internally by the Hough gradient method.
    pub canny_high: f64,
    pub accumulator_threshold: f64,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            dp: 1.0,
            min_dist_ratio: 0.30,
            min_radius_ratio: 0.13,
            max_radius_ratio: 0.15,
            canny_high: 20.0,
            accumulator_threshold: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub canny_low: f64,
    pub canny_high: f64,
    /// OpenCV HSV scale (H 0-180).
    pub diamond_hsv_low: [f64; 3],
    pub diamond_hsv_high: [f64; 3],
    pub diamond_dilate_iterations: i32,
    pub hough_threshold: i32,
    pub min_length_ratio: f64,
    pub max_gap: f64,
    pub stroke: i32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            canny_low: 270.0,
            canny_high: 400.0,
            diamond_hsv_low: [153.0, 96.0, 175.0],
            diamond_hsv_high: [156.0, 255.0, 255.0],
            diamond_dilate_iterations: 1,
            hough_threshold: 20,
            min_length_ratio: 0.25,
            max_gap: 10.0,
            stroke: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Look-ahead distance as a fraction of the frame height.
    pub distance_ratio: f64,
    pub probe_half_size: i32,
    pub white_half_size: i32,
    pub white_threshold: u8,
    pub initial_direction: Direction,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            distance_ratio: 0.055,
            probe_half_size: 7,
            white_half_size: 3,
            white_threshold: 255,
            initial_direction: Direction::Right,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub dropout_threshold: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            dropout_threshold: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// FRAME DATA
// ============================================================================

/// Contiguous RGB image, row-major, 3 bytes per pixel.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub timestamp_ms: f64,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> Result<Self, BotError> {
        if data.len() != width * height * 3 {
            return Err(BotError::InvalidArgument(format!(
                "frame buffer holds {} bytes, expected {}x{}x3",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp_ms: 0.0,
        })
    }

    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width * height * 3)
            .collect();
        Self {
            data,
            width,
            height,
            timestamp_ms: 0.0,
        }
    }

    pub fn with_timestamp(mut self, timestamp_ms: f64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * self.width + x) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let idx = (y * self.width + x) * 3;
        self.data[idx..idx + 3].copy_from_slice(&rgb);
    }
}

/// Binary single-channel image: 255 on path-edge pixels, 0 elsewhere.
#[derive(Debug, Clone)]
pub struct EdgeRaster {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl EdgeRaster {
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            data: vec![0; width * height],
            width,
            height,
        }
    }

    /// Any non-zero input byte becomes 255.
    pub fn from_mask(mask: &[u8], width: usize, height: usize) -> Result<Self, BotError> {
        if mask.len() != width * height {
            return Err(BotError::InvalidArgument(format!(
                "mask holds {} bytes, expected {}x{}",
                mask.len(),
                width,
                height
            )));
        }
        let data = mask.iter().map(|&v| if v > 0 { 255 } else { 0 }).collect();
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    pub fn mark(&mut self, x: usize, y: usize) {
        self.data[y * self.width + x] = 255;
    }

    pub fn edge_pixel_count(&self) -> usize {
        self.data.iter().filter(|&&v| v == 255).count()
    }

    /// True if any edge pixel lies in `[x0, x1) x [y0, y1)`, clipped to the raster.
    pub fn any_in(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> bool {
        let x0 = x0.clamp(0, self.width as i32) as usize;
        let x1 = x1.clamp(0, self.width as i32) as usize;
        let y0 = y0.clamp(0, self.height as i32) as usize;
        let y1 = y1.clamp(0, self.height as i32) as usize;

        (y0..y1).any(|y| {
            let row = &self.data[y * self.width..(y + 1) * self.width];
            row[x0..x1.max(x0)].iter().any(|&v| v == 255)
        })
    }
}

// ============================================================================
// GEOMETRY PRIMITIVES
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Detected ball, always in full-frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallState {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
}

impl BallState {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Path-edge segment, always in full-frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl LineSegment {
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }
}

// ============================================================================
// ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Horizontal sign of travel on screen.
    pub fn sign(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(BotError::InvalidArgument(format!(
                "invalid direction '{}', expected LEFT or RIGHT",
                other
            ))),
        }
    }
}

impl TryFrom<i64> for Direction {
    type Error = BotError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Left),
            1 => Ok(Direction::Right),
            other => Err(BotError::InvalidArgument(format!(
                "invalid direction {}, expected 0 (LEFT) or 1 (RIGHT)",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = BotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Direction> for String {
    fn from(value: Direction) -> Self {
        value.as_str().to_ascii_lowercase()
    }
}

/// Window alignment relative to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Align {
    Left,
    Center,
    Right,
    /// Keep the current position.
    None,
}

impl Align {
    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "LEFT",
            Align::Center => "CENTER",
            Align::Right => "RIGHT",
            Align::None => "NONE",
        }
    }
}

impl FromStr for Align {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Align::Left),
            "center" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            "none" => Ok(Align::None),
            other => Err(BotError::InvalidArgument(format!(
                "invalid alignment '{}', expected LEFT, CENTER, RIGHT or NONE",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Align {
    type Error = BotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Align> for String {
    fn from(value: Align) -> Self {
        value.as_str().to_ascii_lowercase()
    }
}

// src/detection/mod.rs

mod ball;
mod band;
mod edges;
mod raster;

// Re-export public APIs
pub use ball::BallDetector;
pub use band::DetectionBand;
pub use edges::EdgeDetector;
pub use raster::render_edge_raster;

// src/detection/raster.rs

use crate::types::{EdgeRaster, LineSegment};
use anyhow::Result;
use opencv::{
    core::{self, Mat, Point, Scalar},
    imgproc,
    prelude::*,
};

/// Draw segments as solid 255 strokes on a zeroed single-channel image of
/// the source frame's size. `LINE_8` keeps the result strictly binary.
pub fn render_edge_raster(
    segments: &[LineSegment],
    width: usize,
    height: usize,
    stroke: i32,
) -> Result<EdgeRaster> {
    if width == 0 || height == 0 || segments.is_empty() {
        return Ok(EdgeRaster::blank(width, height));
    }

    let mut canvas =
        Mat::new_rows_cols_with_default(height as i32, width as i32, core::CV_8UC1, Scalar::all(0.0))?;

    for s in segments {
        imgproc::line(
            &mut canvas,
            Point::new(s.x1, s.y1),
            Point::new(s.x2, s.y2),
            Scalar::all(255.0),
            stroke.max(1),
            imgproc::LINE_8,
            0,
        )?;
    }

    Ok(EdgeRaster::from_mask(canvas.data_bytes()?, width, height)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_matches_frame_size_and_is_binary() {
        let segments = [
            LineSegment {
                x1: 10,
                y1: 10,
                x2: 90,
                y2: 40,
            },
            LineSegment {
                x1: -20,
                y1: 50,
                x2: 150,
                y2: 50,
            },
        ];
        let raster = render_edge_raster(&segments, 100, 60, 3).unwrap();
        assert_eq!((raster.width(), raster.height()), (100, 60));
        assert!(raster.edge_pixel_count() > 0);

        for y in 0..60 {
            for x in 0..100 {
                let v = raster.get(x, y);
                assert!(v == 0 || v == 255);
            }
        }
        assert_eq!(raster.get(10, 10), 255);
        assert_eq!(raster.get(0, 50), 255);
        assert_eq!(raster.get(50, 0), 0);
    }

    #[test]
    fn test_stroke_width() {
        let segments = [LineSegment {
            x1: 0,
            y1: 20,
            x2: 39,
            y2: 20,
        }];
        let raster = render_edge_raster(&segments, 40, 40, 3).unwrap();
        assert_eq!(raster.get(20, 19), 255);
        assert_eq!(raster.get(20, 21), 255);
        assert_eq!(raster.get(20, 24), 0);
    }

    #[test]
    fn test_no_segments_gives_blank_raster() {
        let raster = render_edge_raster(&[], 32, 16, 3).unwrap();
        assert_eq!((raster.width(), raster.height()), (32, 16));
        assert!(!raster.is_empty());
        assert_eq!(raster.edge_pixel_count(), 0);
    }
}

// src/decision.rs
//
// Turn decision: probe a point straight ahead of the ball and a point
// ahead along the isometric track. Turn when a path edge shows up in both
// probes, or when both probes already sit on the white background.

use crate::geometry::isometric_front_point;
use crate::interface::Actuator;
use crate::types::{DecisionConfig, Direction, EdgeRaster, Frame, Point};
use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbePoints {
    pub front: Point,
    pub iso: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trigger {
    EdgeLines,
    WhiteBackground,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::EdgeLines => "EDGE_LINES",
            Trigger::WhiteBackground => "WHITE_BACKGROUND",
        }
    }
}

/// Outcome of one evaluation. `probes` is `None` when a guard stopped the
/// evaluation before any probe point was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Verdict {
    pub probes: Option<ProbePoints>,
    pub trigger: Option<Trigger>,
}

impl Verdict {
    pub fn act(&self) -> bool {
        self.trigger.is_some()
    }
}

pub struct DecisionEngine {
    config: DecisionConfig,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    /// Look-ahead distance for a frame of `frame_height` rows.
    pub fn horizontal_distance(&self, frame_height: usize) -> i32 {
        (frame_height as f64 * self.config.distance_ratio).round() as i32
    }

    pub fn evaluate(
        &self,
        ball: Option<Point>,
        edges: &EdgeRaster,
        frame: &Frame,
        direction: Direction,
    ) -> Verdict {
        let frame_w = frame.width as i32;

        let Some(ball) = ball else {
            return Verdict::default();
        };
        if edges.is_empty() || ball == Point::default() || ball.x < 0 || ball.x > frame_w {
            return Verdict::default();
        }

        let distance = self.horizontal_distance(frame.height);
        let front = Point::new(ball.x + direction.sign() * distance, ball.y);
        let iso = isometric_front_point(ball, distance, direction);
        let probes = ProbePoints { front, iso };

        // Ball is hugging a wall; there is nothing to turn away from.
        if front.x < 0 || front.x > frame_w {
            return Verdict {
                probes: Some(probes),
                trigger: None,
            };
        }

        let r = self.config.probe_half_size;
        let line_on_front = edges.any_in(front.x - r, front.y - r, front.x + r, front.y + r);
        let line_on_iso = edges.any_in(iso.x - r, iso.y - r, iso.x + r, iso.y + r);

        // A probe window that overruns the frame cannot be sampled; the
        // whole background check then reads as white.
        let overrun = self.window_overruns(frame, front) || self.window_overruns(frame, iso);

        let trigger = if line_on_front && line_on_iso {
            Some(Trigger::EdgeLines)
        } else if overrun
            || (self.white_background(frame, front) && self.white_background(frame, iso))
        {
            Some(Trigger::WhiteBackground)
        } else {
            None
        };

        Verdict {
            probes: Some(probes),
            trigger,
        }
    }

    /// Evaluate and, on a turn, click through `actuator`. Returns whether the
    /// ball's direction changed.
    pub fn decide_and_act<A: Actuator>(
        &self,
        ball: Option<Point>,
        edges: &EdgeRaster,
        frame: &Frame,
        direction: Direction,
        actuator: &mut A,
    ) -> Result<(bool, Verdict)> {
        let verdict = self.evaluate(ball, edges, frame, direction);

        match verdict.trigger {
            Some(trigger) => {
                actuator.click(None)?;
                info!(
                    "Turn from {} ({}) at {:?}",
                    direction,
                    trigger.as_str(),
                    verdict.probes.map(|p| p.front)
                );
                Ok((true, verdict))
            }
            None => {
                debug!("Hold {} probes={:?}", direction, verdict.probes);
                Ok((false, verdict))
            }
        }
    }

    /// Whether the edge window or the white window around `p` leaves the frame.
    fn window_overruns(&self, frame: &Frame, p: Point) -> bool {
        let half = self.config.probe_half_size.max(self.config.white_half_size);
        p.x - half < 0
            || p.y - half < 0
            || p.x + half > frame.width as i32
            || p.y + half > frame.height as i32
    }

    /// Each channel reaches the white threshold somewhere in a small window
    /// around `p`. Callers rule out overrunning windows first.
    fn white_background(&self, frame: &Frame, p: Point) -> bool {
        let ws = self.config.white_half_size;
        let (x0, y0, x1, y1) = (p.x - ws, p.y - ws, p.x + ws, p.y + ws);
        if x0 < 0 || y0 < 0 || x1 > frame.width as i32 || y1 > frame.height as i32 {
            return true;
        }

        let threshold = self.config.white_threshold;
        let mut seen = [false; 3];
        for y in y0 as usize..y1 as usize {
            for x in x0 as usize..x1 as usize {
                for (s, v) in seen.iter_mut().zip(frame.pixel(x, y)) {
                    *s |= v >= threshold;
                }
            }
        }
        seen.iter().all(|&s| s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingActuator {
        clicks: Vec<Option<(i32, i32)>>,
    }

    impl Actuator for RecordingActuator {
        fn click(&mut self, at: Option<(i32, i32)>) -> Result<()> {
            self.clicks.push(at);
            Ok(())
        }

        fn move_to(&mut self, _x: i32, _y: i32) -> Result<()> {
            Ok(())
        }
    }

    fn engine() -> DecisionEngine {
        DecisionEngine::new(DecisionConfig::default())
    }

    fn dark_frame() -> Frame {
        Frame::filled(800, 1200, [30, 30, 30])
    }

    fn mark_square(raster: &mut EdgeRaster, c: Point, half: i32) {
        for y in (c.y - half)..(c.y + half) {
            for x in (c.x - half)..(c.x + half) {
                raster.mark(x as usize, y as usize);
            }
        }
    }

    #[test]
    fn test_reference_probe_points() {
        let frame = dark_frame();
        let raster = EdgeRaster::blank(800, 1200);
        let engine = engine();
        assert_eq!(engine.horizontal_distance(1200), 66);

        let verdict = engine.evaluate(Some(Point::new(400, 600)), &raster, &frame, Direction::Right);
        let probes = verdict.probes.unwrap();
        assert_eq!(probes.front, Point::new(466, 600));
        assert_eq!(probes.iso, Point::new(433, 581));
        assert!(!verdict.act());
    }

    #[test]
    fn test_sentinel_ball_never_acts() {
        let frame = Frame::filled(800, 1200, [255, 255, 255]);
        let mut raster = EdgeRaster::blank(800, 1200);
        mark_square(&mut raster, Point::new(60, 10), 10);

        let mut actuator = RecordingActuator::default();
        for direction in [Direction::Left, Direction::Right] {
            let (changed, verdict) = engine()
                .decide_and_act(Some(Point::new(0, 0)), &raster, &frame, direction, &mut actuator)
                .unwrap();
            assert!(!changed);
            assert!(verdict.probes.is_none());

            let (changed, _) = engine()
                .decide_and_act(None, &raster, &frame, direction, &mut actuator)
                .unwrap();
            assert!(!changed);
        }
        assert!(actuator.clicks.is_empty());
    }

    #[test]
    fn test_edges_in_both_probes_click() {
        let frame = dark_frame();
        let mut raster = EdgeRaster::blank(800, 1200);
        mark_square(&mut raster, Point::new(466, 600), 7);
        mark_square(&mut raster, Point::new(433, 581), 7);

        let mut actuator = RecordingActuator::default();
        let (changed, verdict) = engine()
            .decide_and_act(Some(Point::new(400, 600)), &raster, &frame, Direction::Right, &mut actuator)
            .unwrap();
        assert!(changed);
        assert_eq!(verdict.trigger, Some(Trigger::EdgeLines));
        assert_eq!(actuator.clicks, vec![None]);
    }

    #[test]
    fn test_edge_in_one_probe_only_holds() {
        let frame = dark_frame();
        let mut raster = EdgeRaster::blank(800, 1200);
        mark_square(&mut raster, Point::new(466, 600), 7);

        let verdict = engine().evaluate(Some(Point::new(400, 600)), &raster, &frame, Direction::Right);
        assert!(!verdict.act());
    }

    #[test]
    fn test_left_probes_mirror_right() {
        let frame = dark_frame();
        let mut raster = EdgeRaster::blank(800, 1200);
        mark_square(&mut raster, Point::new(334, 600), 7);
        mark_square(&mut raster, Point::new(367, 581), 7);

        let engine = engine();
        let left = engine.evaluate(Some(Point::new(400, 600)), &raster, &frame, Direction::Left);
        assert_eq!(left.trigger, Some(Trigger::EdgeLines));
        let right = engine.evaluate(Some(Point::new(400, 600)), &raster, &frame, Direction::Right);
        assert!(!right.act());
    }

    #[test]
    fn test_off_frame_ball_never_acts() {
        let frame = Frame::filled(800, 1200, [255, 255, 255]);
        let mut raster = EdgeRaster::blank(800, 1200);
        mark_square(&mut raster, Point::new(400, 600), 100);

        let verdict = engine().evaluate(Some(Point::new(850, 600)), &raster, &frame, Direction::Left);
        assert!(!verdict.act());
        assert!(verdict.probes.is_none());
        let verdict = engine().evaluate(Some(Point::new(-3, 600)), &raster, &frame, Direction::Right);
        assert!(!verdict.act());
    }

    #[test]
    fn test_front_point_past_wall_suppresses_action() {
        // White everywhere would otherwise trigger the background rule.
        let frame = Frame::filled(800, 1200, [255, 255, 255]);
        let raster = EdgeRaster::blank(800, 1200);

        let verdict = engine().evaluate(Some(Point::new(780, 600)), &raster, &frame, Direction::Right);
        assert_eq!(verdict.probes.unwrap().front, Point::new(846, 600));
        assert!(!verdict.act());

        let verdict = engine().evaluate(Some(Point::new(20, 600)), &raster, &frame, Direction::Left);
        assert!(!verdict.act());
    }

    #[test]
    fn test_white_background_at_both_probes_clicks() {
        let mut frame = dark_frame();
        for y in 560..620 {
            for x in 420..480 {
                frame.set_pixel(x, y, [255, 255, 255]);
            }
        }
        let raster = EdgeRaster::blank(800, 1200);

        let verdict = engine().evaluate(Some(Point::new(400, 600)), &raster, &frame, Direction::Right);
        assert_eq!(verdict.trigger, Some(Trigger::WhiteBackground));
    }

    #[test]
    fn test_white_background_needs_every_channel() {
        let mut frame = dark_frame();
        for y in 560..620 {
            for x in 420..480 {
                frame.set_pixel(x, y, [255, 255, 200]);
            }
        }
        let raster = EdgeRaster::blank(800, 1200);

        let verdict = engine().evaluate(Some(Point::new(400, 600)), &raster, &frame, Direction::Right);
        assert!(!verdict.act());
    }

    #[test]
    fn test_iso_window_above_frame_clicks_on_dark_front() {
        // Front point stays dark; only the iso window leaves the frame.
        let frame = dark_frame();
        let raster = EdgeRaster::blank(800, 1200);

        let verdict = engine().evaluate(Some(Point::new(400, 10)), &raster, &frame, Direction::Right);
        let probes = verdict.probes.unwrap();
        assert_eq!(probes.front, Point::new(466, 10));
        assert!(probes.iso.y < 0);
        assert_eq!(verdict.trigger, Some(Trigger::WhiteBackground));
    }

    #[test]
    fn test_edge_window_past_right_edge_clicks() {
        // Front x = 795 is inside the frame, its 7 px window is not.
        let frame = dark_frame();
        let raster = EdgeRaster::blank(800, 1200);

        let verdict = engine().evaluate(Some(Point::new(729, 600)), &raster, &frame, Direction::Right);
        assert_eq!(verdict.probes.unwrap().front, Point::new(795, 600));
        assert_eq!(verdict.trigger, Some(Trigger::WhiteBackground));
    }

    #[test]
    fn test_edge_window_touching_border_still_samples() {
        // 793 + 7 == 800: the window fits exactly, so dark pixels hold.
        let frame = dark_frame();
        let raster = EdgeRaster::blank(800, 1200);

        let verdict = engine().evaluate(Some(Point::new(727, 600)), &raster, &frame, Direction::Right);
        assert_eq!(verdict.probes.unwrap().front, Point::new(793, 600));
        assert!(!verdict.act());
    }

    #[test]
    fn test_empty_raster_never_acts() {
        let frame = Frame::filled(800, 1200, [255, 255, 255]);
        let raster = EdgeRaster::blank(0, 0);
        let verdict = engine().evaluate(Some(Point::new(400, 600)), &raster, &frame, Direction::Right);
        assert_eq!(verdict, Verdict::default());
    }
}

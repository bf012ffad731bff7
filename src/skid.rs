// ==============================================================================
// skid.rs — SKID-MARK PRIMITIVES (HOST -> RENDERER)
// ------------------------------------------------------------------------------
// Turns the (previous, current) state pair of one tick into draw data:
// - SkidSegment: one wheel-corner line from the old pose to the new pose
// - SkidFrame: segments + stroke width + whether the floor should fade now
//
// Segments are only produced while the vehicle slides. The fade signal runs on
// its own clock, independent of sliding.
//
// This file is purely visualization scaffolding and should not touch vehicle
// state.
// ==============================================================================

use nalgebra::{Isometry2, Point2};
use serde::Serialize;
use crate::drift::{Pose, VehicleState};

pub const SLIDE_FADE_DT: f64 = 0.1;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkidSegment {
    pub from: [f64; 2],
    pub to: [f64; 2],
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SkidFrame {
    pub fade: bool,
    pub width: f64,
    pub segments: Vec<SkidSegment>,
}

#[derive(Clone, Debug)]
pub struct SkidMarks {
    pub half_length: f64,   // body box, along heading
    pub half_width: f64,    // body box, across heading
    pub width_scale: f64,   // stroke width per unit of slide intensity
    pub fade_interval: f64, // t
    pub eps: f64,
    fade_accum: f64,
}

impl Default for SkidMarks {
    fn default() -> Self {
        Self {
            half_length: 30.0,
            half_width: 20.0,
            width_scale: 0.1,
            fade_interval: SLIDE_FADE_DT,
            eps: 1e-6,
            fade_accum: 0.0,
        }
    }
}

#[inline]
fn isometry(pose: &Pose) -> Isometry2<f64> {
    Isometry2::new(pose.position, pose.heading)
}

impl SkidMarks {
    /// Body-local corners of the vehicle box.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        let (hl, hw) = (self.half_length, self.half_width);
        [
            Point2::new(-hl, -hw),
            Point2::new(hl, -hw),
            Point2::new(-hl, hw),
            Point2::new(hl, hw),
        ]
    }

    pub fn emit(&mut self, previous: &VehicleState, current: &VehicleState, dt: f64) -> SkidFrame {
        let mut frame = SkidFrame::default();

        self.fade_accum += dt;
        if self.fade_accum > self.fade_interval {
            frame.fade = true;
            self.fade_accum -= self.fade_interval;
        }

        if current.sliding > self.eps {
            let from = isometry(&previous.pose());
            let to = isometry(&current.pose());

            frame.width = current.sliding * self.width_scale;
            frame.segments = self
                .corners()
                .iter()
                .map(|c| {
                    let a = from * c;
                    let b = to * c;
                    SkidSegment { from: [a.x, a.y], to: [b.x, b.y] }
                })
                .collect();
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::Vec2;

    fn close(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9
    }

    #[test]
    fn test_no_segments_without_sliding() {
        let mut skid = SkidMarks::default();
        let prev = VehicleState::at(0.0, 0.0);
        let cur = VehicleState::at(5.0, 0.0);

        let frame = skid.emit(&prev, &cur, 0.02);
        assert!(frame.segments.is_empty());
        assert_eq!(frame.width, 0.0);
    }

    #[test]
    fn test_four_corner_segments_while_sliding() {
        let mut skid = SkidMarks::default();
        let prev = VehicleState::at(0.0, 0.0);
        let mut cur = VehicleState::at(10.0, 0.0);
        cur.sliding = 20.0;

        let frame = skid.emit(&prev, &cur, 0.02);
        assert_eq!(frame.segments.len(), 4);
        assert!((frame.width - 2.0).abs() < 1e-12);

        for (seg, c) in frame.segments.iter().zip(skid.corners()) {
            assert!(close(seg.from, [c.x, c.y]));
            assert!(close(seg.to, [c.x + 10.0, c.y]));
        }
    }

    #[test]
    fn test_segments_follow_heading() {
        let mut skid = SkidMarks::default();
        let prev = VehicleState::at(0.0, 0.0);
        let mut cur = VehicleState::at(0.0, 0.0);
        cur.position = Vec2::new(1.0, 2.0);
        cur.heading = std::f64::consts::FRAC_PI_2;
        cur.sliding = 50.0;

        let frame = skid.emit(&prev, &cur, 0.02);
        // front-left corner (30, 20) rotated a quarter turn lands at (-20, 30)
        assert!(close(frame.segments[3].to, [-19.0, 32.0]));
        assert!(close(frame.segments[3].from, [30.0, 20.0]));
    }

    #[test]
    fn test_fade_cadence() {
        let mut skid = SkidMarks::default();
        let s = VehicleState::default();

        let fades: Vec<bool> = (0..100).map(|_| skid.emit(&s, &s, 0.02).fade).collect();
        assert!(fades[..4].iter().all(|f| !f));

        let count = fades.iter().filter(|f| **f).count();
        assert!((19..=20).contains(&count), "faded {count} times");
    }
}

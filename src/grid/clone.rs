//! The transient clone that visually carries a letter during a shuffle.
//!
//! A clone is pure animation state: spawned at its source cell's position,
//! pointed at the destination slot, advanced by `tick(dt)` once per frame,
//! and discarded when the shuffle's cleanup deadline fires. It never touches
//! grid data.

use super::layout::Point;

/// Remaining distance below which the clone snaps onto its target.
/// Termination must not depend on exact float equality.
const ARRIVAL_EPSILON: f32 = 0.05;

#[derive(Debug, Clone)]
pub struct MovingClone {
    ch: char,
    pos: Point,
    size: f32,
    target: Point,
    travel_secs: f32,
    arrived: bool,
}

impl MovingClone {
    /// A clone starts life parked on its source cell; it does not move until
    /// `start_moving` arms it.
    pub fn new(ch: char, pos: Point, size: f32, travel_secs: f32) -> Self {
        MovingClone {
            ch,
            pos,
            size,
            target: pos,
            travel_secs,
            arrived: true,
        }
    }

    pub fn set_char(&mut self, ch: char) {
        self.ch = ch;
    }

    pub fn ch(&self) -> char {
        self.ch
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn arrived(&self) -> bool {
        self.arrived
    }

    pub fn start_moving(&mut self, target: Point) {
        self.target = target;
        self.arrived = self.pos.distance(target) < ARRIVAL_EPSILON;
    }

    /// Advance the move by `dt` seconds of frame time.
    ///
    /// Each step lerps toward the target by `dt · (travel + 1)`; the +1 bias
    /// keeps the tail of the ease-out visibly quick. Once the remaining
    /// distance drops under the epsilon the position snaps to the target.
    pub fn tick(&mut self, dt: f32) {
        if self.arrived {
            return;
        }
        let t = dt * (self.travel_secs + 1.0);
        self.pos = self.pos.lerp(self.target, t);
        if self.pos.distance(self.target) < ARRIVAL_EPSILON {
            self.pos = self.target;
            self.arrived = true;
        }
    }
}

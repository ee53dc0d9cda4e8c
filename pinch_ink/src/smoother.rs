//! Fingertip smoothing.
//!
//! The last `memory` raw samples are kept in a FIFO window.  Their
//! recency-weighted average (weight `i / (1 + 2 + … + n)`, newest highest) is
//! blended with the raw sample:
//!
//! ```text
//! out = raw · (1 − factor) + weighted_avg · factor
//! ```
//!
//! With fewer than two samples in the window the raw point passes through.

use std::collections::VecDeque;

use hand_landmarks::Point;

#[derive(Clone, Debug)]
pub struct PointSmoother {
    history: VecDeque<Point>,
    memory:  usize,
    factor:  f32,
}

impl PointSmoother {
    /// `memory` below 1 is treated as 1 (pure pass-through); `factor` is
    /// clamped to `[0, 1]`.
    pub fn new(memory: usize, factor: f32) -> Self {
        let memory = memory.max(1);
        PointSmoother {
            history: VecDeque::with_capacity(memory + 1),
            memory,
            factor: factor.clamp(0.0, 1.0),
        }
    }

    /// Smooth one raw sample.
    pub fn smooth(&mut self, raw: Point) -> Point {
        self.history.push_back(raw);
        while self.history.len() > self.memory {
            self.history.pop_front();
        }

        let n = self.history.len();
        if n < 2 {
            return raw;
        }

        let total = (n * (n + 1) / 2) as f32;
        let weighted = self.history.iter().enumerate().fold(Point::default(), |acc, (i, p)| {
            acc.add(p.scale((i + 1) as f32 / total))
        });

        raw.scale(1.0 - self.factor).add(weighted.scale(self.factor))
    }

    /// Empty the window; the next sample passes through.
    pub fn clear(&mut self) { self.history.clear(); }

    pub fn len(&self) -> usize { self.history.len() }

    pub fn is_empty(&self) -> bool { self.history.is_empty() }

    pub fn memory(&self) -> usize { self.memory }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

//! Stroke path and renderer.
//!
//! Each new smoothed point is joined to the previous one with a quadratic
//! segment whose control point is their midpoint.  The first point of a
//! stroke only records the pen position.

use hand_landmarks::Point;
use tracing::debug;

// ════════════════════════════════════════════════════════════════════════════
// QuadSegment
// ════════════════════════════════════════════════════════════════════════════

/// One quadratic Bézier piece of a stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadSegment {
    pub start:   Point,
    pub control: Point,
    pub end:     Point,
}

impl QuadSegment {
    /// Segment from `from` to `to` with the midpoint as control point.
    pub fn through_midpoint(from: Point, to: Point) -> Self {
        QuadSegment { start: from, control: from.midpoint(to), end: to }
    }

    /// Evaluate at `t ∈ [0, 1]`.
    pub fn point_at(&self, t: f32) -> Point {
        let a = self.start.lerp(self.control, t);
        let b = self.control.lerp(self.end, t);
        a.lerp(b, t)
    }

    /// Upper bound on the arc length (control polygon length).
    pub fn hull_length(&self) -> f32 {
        self.start.distance(self.control) + self.control.distance(self.end)
    }

    pub fn is_degenerate(&self) -> bool { self.start == self.end }
}

// ════════════════════════════════════════════════════════════════════════════
// InkSurface
// ════════════════════════════════════════════════════════════════════════════

/// A persistent drawing surface.  Content only disappears through `clear`.
pub trait InkSurface {
    fn stroke_segment(&mut self, segment: &QuadSegment);
    fn clear(&mut self);
}

/// Surface that keeps the vector segments only.  Handy for headless runs.
impl InkSurface for Vec<QuadSegment> {
    fn stroke_segment(&mut self, segment: &QuadSegment) { self.push(*segment); }
    fn clear(&mut self) { Vec::clear(self); }
}

// ════════════════════════════════════════════════════════════════════════════
// StrokePath
// ════════════════════════════════════════════════════════════════════════════

/// Append-only record of everything drawn since the last clear.
#[derive(Clone, Debug, Default)]
pub struct StrokePath {
    segments:   Vec<QuadSegment>,
    /// Bumped by every clear so observers can notice a wipe.
    generation: u64,
}

impl StrokePath {
    pub fn segments(&self) -> &[QuadSegment] { &self.segments }

    pub fn len(&self) -> usize { self.segments.len() }

    pub fn is_empty(&self) -> bool { self.segments.is_empty() }

    pub fn generation(&self) -> u64 { self.generation }

    fn push(&mut self, segment: QuadSegment) { self.segments.push(segment); }

    fn clear(&mut self) {
        self.segments.clear();
        self.generation += 1;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// StrokeRenderer
// ════════════════════════════════════════════════════════════════════════════

/// Turns smoothed points into segments on an [`InkSurface`].
#[derive(Clone, Debug, Default)]
pub struct StrokeRenderer {
    path:     StrokePath,
    previous: Option<Point>,
}

impl StrokeRenderer {
    pub fn new() -> Self { StrokeRenderer::default() }

    /// Draw towards `point`.  Returns the segment drawn, or `None` when this
    /// point starts a new stroke.
    pub fn render<S: InkSurface + ?Sized>(&mut self, point: Point, surface: &mut S) -> Option<QuadSegment> {
        let drawn = self.previous.map(|prev| {
            let segment = QuadSegment::through_midpoint(prev, point);
            surface.stroke_segment(&segment);
            self.path.push(segment);
            segment
        });
        self.previous = Some(point);
        drawn
    }

    /// End the current stroke without touching drawn content.
    pub fn lift(&mut self) { self.previous = None; }

    /// Wipe the path and the surface and forget the stroke origin.
    pub fn clear<S: InkSurface + ?Sized>(&mut self, surface: &mut S) {
        surface.clear();
        self.path.clear();
        self.previous = None;
        debug!(generation = self.path.generation(), "stroke path cleared");
    }

    pub fn path(&self) -> &StrokePath { &self.path }

    pub fn previous(&self) -> Option<Point> { self.previous }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

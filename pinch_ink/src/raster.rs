//! Software ink layer.
//!
//! An ARGB overlay the size of the canvas.  `0` is transparent; every inked
//! pixel is opaque.  Segments are flattened into short steps and stamped with
//! a round brush, so consecutive quads join without gaps.

use hand_landmarks::Point;

use crate::stroke::{InkSurface, QuadSegment};

/// Round brush.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Brush {
    /// Diameter in pixels.
    pub width: f32,
    /// Packed `0xFFRRGGBB`.
    pub color: u32,
}

impl Default for Brush {
    fn default() -> Self { Brush { width: 5.0, color: 0xFFFF3B6B } }
}

pub struct InkLayer {
    width:  usize,
    height: usize,
    pixels: Vec<u32>,
    brush:  Brush,
}

impl InkLayer {
    pub fn new(width: usize, height: usize, brush: Brush) -> Self {
        InkLayer { width, height, pixels: vec![0; width * height], brush }
    }

    pub fn width(&self)  -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn pixels(&self) -> &[u32] { &self.pixels }

    /// Pixel at `(x, y)`, `None` outside the layer.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn is_blank(&self) -> bool { self.pixels.iter().all(|&p| p == 0) }

    pub fn inked_pixels(&self) -> usize { self.pixels.iter().filter(|&&p| p != 0).count() }

    /// Copy inked pixels over `dst`, which must have the same dimensions.
    pub fn composite_onto(&self, dst: &mut [u32]) {
        for (d, &s) in dst.iter_mut().zip(&self.pixels) {
            if s != 0 { *d = s; }
        }
    }

    fn stamp(&mut self, c: Point) {
        let r  = (self.brush.width * 0.5).max(0.5);
        let r2 = r * r;
        let x0 = (c.x - r).floor().max(0.0) as usize;
        let y0 = (c.y - r).floor().max(0.0) as usize;
        let x1 = ((c.x + r).ceil().max(0.0) as usize).min(self.width);
        let y1 = ((c.y + r).ceil().max(0.0) as usize).min(self.height);

        for y in y0..y1 {
            let dy = y as f32 + 0.5 - c.y;
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - c.x;
                if dx * dx + dy * dy <= r2 {
                    self.pixels[y * self.width + x] = self.brush.color;
                }
            }
        }
    }
}

impl InkSurface for InkLayer {
    fn stroke_segment(&mut self, segment: &QuadSegment) {
        // One stamp every half-radius keeps the edge smooth.
        let spacing = (self.brush.width * 0.25).max(0.5);
        let steps   = ((segment.hull_length() / spacing).ceil() as usize).clamp(1, 4096);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.stamp(segment.point_at(t));
        }
    }

    fn clear(&mut self) { self.pixels.fill(0); }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

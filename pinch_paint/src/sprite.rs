//! The draggable image.

use std::path::Path;

use anyhow::{Context, Result};

/// Square ARGB bitmap with straight alpha.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    width:  usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Sprite {
    /// Load a PNG and fit it into a `size`×`size` box, keeping aspect ratio.
    pub fn load(path: impl AsRef<Path>, size: u32) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("loading image {}", path.display()))?
            .thumbnail(size, size)
            .to_rgba8();

        let (w, h) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
            })
            .collect();
        Ok(Sprite { width: w as usize, height: h as usize, pixels })
    }

    /// Checkerboard stand-in used when no image is configured.
    pub fn placeholder(size: usize) -> Self {
        const CELL: usize = 16;
        let pixels = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if (x / CELL + y / CELL) % 2 == 0 { 0xFF3A86FF } else { 0xFFFFBE0B }
            })
            .collect();
        Sprite { width: size, height: size, pixels }
    }

    pub fn width(&self)  -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    /// Alpha-blend the sprite onto `dst` (`dst_w` pixels wide) centred on
    /// `(cx, cy)`.  Parts outside the target are clipped.
    pub fn blit_centered(&self, dst: &mut [u32], dst_w: usize, dst_h: usize, cx: f32, cy: f32) {
        let left = cx.round() as isize - (self.width / 2) as isize;
        let top  = cy.round() as isize - (self.height / 2) as isize;

        for sy in 0..self.height {
            let dy = top + sy as isize;
            if dy < 0 || dy >= dst_h as isize { continue; }
            for sx in 0..self.width {
                let dx = left + sx as isize;
                if dx < 0 || dx >= dst_w as isize { continue; }

                let src = self.pixels[sy * self.width + sx];
                let a   = src >> 24;
                if a == 0 { continue; }
                let d = &mut dst[dy as usize * dst_w + dx as usize];
                *d = if a == 0xFF { src | 0xFF00_0000 } else { over(*d, src, a) };
            }
        }
    }
}

fn over(dst: u32, src: u32, a: u32) -> u32 {
    let mix = |shift: u32| {
        let s = (src >> shift) & 0xFF;
        let d = (dst >> shift) & 0xFF;
        ((s * a + d * (255 - a)) / 255) << shift
    };
    0xFF00_0000 | mix(16) | mix(8) | mix(0)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_opaque_square() {
        let s = Sprite::placeholder(32);
        assert_eq!((s.width(), s.height()), (32, 32));
        assert!(s.pixels.iter().all(|p| p >> 24 == 0xFF));
    }

    #[test]
    fn blit_clips_at_edges() {
        let s = Sprite::placeholder(4);
        let mut dst = vec![0u32; 10 * 10];
        // Centred on the corner: only the bottom-right quadrant lands.
        s.blit_centered(&mut dst, 10, 10, 0.0, 0.0);
        assert_eq!(dst.iter().filter(|&&p| p != 0).count(), 4);
        assert_ne!(dst[0], 0);
        assert_eq!(dst[2], 0);
    }

    #[test]
    fn half_alpha_blends() {
        let s = Sprite { width: 1, height: 1, pixels: vec![0x80FF_FFFF] };
        let mut dst = vec![0xFF00_0000];
        s.blit_centered(&mut dst, 1, 1, 0.0, 0.0);
        let r = (dst[0] >> 16) & 0xFF;
        assert!((127..=129).contains(&r), "r = {r}");
    }

    #[test]
    fn missing_file_is_error() {
        assert!(Sprite::load("/nonexistent/picture.png", 64).is_err());
    }
}

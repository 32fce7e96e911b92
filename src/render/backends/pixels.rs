//! Software RGBA8 surface.
//!
//! Pixels are stored straight (not premultiplied) and row-major. Every drawing
//! call blends source-over onto the buffer. Shapes are sampled at pixel
//! centres, images are scaled nearest-neighbour.

use crate::assets::Image;
use crate::render::backend::{Surface, SurfaceSize};
use crate::render::Color;
use anyhow::Result;
use std::any::Any;
use std::io::Write;

pub struct PixelSurface {
    size: SurfaceSize,
    pixels: Vec<u8>,
    frame_id: u64,
}

impl PixelSurface {
    pub fn new(size: SurfaceSize) -> Self {
        let len = size.width as usize * size.height as usize * 4;
        Self {
            size,
            pixels: vec![0; len],
            frame_id: 0,
        }
    }

    /// Number of frames started with `clear`.
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// RGBA at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = self.index(x, y);
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Image {
        Image {
            width: self.size.width,
            height: self.size.height,
            pixels: self.pixels.clone(),
        }
    }

    pub fn write_png<W: Write>(&self, out: W) -> Result<()> {
        self.snapshot().write_png(out)?;
        Ok(())
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.size.width as usize + x as usize) * 4
    }

    /// Blends `src` over the pixel at `(x, y)`. Coordinates must be in range.
    fn blend(&mut self, x: u32, y: u32, src: [u8; 4]) {
        let i = self.index(x, y);
        let dst = &mut self.pixels[i..i + 4];

        let sa = src[3] as f32 / 255.0;
        if sa <= 0.0 {
            return;
        }
        if sa >= 1.0 {
            dst.copy_from_slice(&src);
            return;
        }

        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for c in 0..3 {
            let s = src[c] as f32 / 255.0;
            let d = dst[c] as f32 / 255.0;
            let v = (s * sa + d * da * (1.0 - sa)) / out_a;
            dst[c] = (v * 255.0).round() as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }

    /// Pixel range covered by `[start, start + len)` on an axis of `max` pixels.
    /// A pixel is covered when its centre lies inside the span.
    fn span(start: f64, len: f64, max: u32) -> Option<(u32, u32)> {
        if len <= 0.0 {
            return None;
        }
        let first = (start - 0.5).ceil().max(0.0) as i64;
        let last = ((start + len - 0.5).ceil() as i64).min(max as i64);
        if first >= last {
            return None;
        }
        Some((first as u32, last as u32))
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self) -> Result<()> {
        self.pixels.fill(0);
        self.frame_id = self.frame_id.wrapping_add(1);
        Ok(())
    }

    fn draw_image(&mut self, image: &Image, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        if image.width == 0 || image.height == 0 {
            return Ok(());
        }
        let Some((x0, x1)) = Self::span(x, w, self.size.width) else {
            return Ok(());
        };
        let Some((y0, y1)) = Self::span(y, h, self.size.height) else {
            return Ok(());
        };

        for py in y0..y1 {
            let v = (py as f64 + 0.5 - y) / h;
            let sy = ((v * image.height as f64) as u32).min(image.height - 1);
            for px in x0..x1 {
                let u = (px as f64 + 0.5 - x) / w;
                let sx = ((u * image.width as f64) as u32).min(image.width - 1);
                self.blend(px, py, image.pixel(sx, sy));
            }
        }
        Ok(())
    }

    fn fill_circle(&mut self, x: f64, y: f64, r: f64, color: Color) -> Result<()> {
        let Some((x0, x1)) = Self::span(x - r, 2.0 * r, self.size.width) else {
            return Ok(());
        };
        let Some((y0, y1)) = Self::span(y - r, 2.0 * r, self.size.height) else {
            return Ok(());
        };

        let rgba = color.to_rgba8();
        let r2 = r * r;
        for py in y0..y1 {
            let dy = py as f64 + 0.5 - y;
            for px in x0..x1 {
                let dx = px as f64 + 0.5 - x;
                if dx * dx + dy * dy <= r2 {
                    self.blend(px, py, rgba);
                }
            }
        }
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) -> Result<()> {
        let Some((x0, x1)) = Self::span(x, w, self.size.width) else {
            return Ok(());
        };
        let Some((y0, y1)) = Self::span(y, h, self.size.height) else {
            return Ok(());
        };

        let rgba = color.to_rgba8();
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, rgba);
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

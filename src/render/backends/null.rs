use crate::assets::Image;
use crate::render::backend::{Surface, SurfaceSize};
use crate::render::Color;
use anyhow::Result;
use std::any::Any;

/// Surface that does not draw anything. It only keeps count of frames and
/// drawing calls, which is enough for headless runs.
pub struct NullSurface {
    /// Size of the surface in pixels.
    pub size: SurfaceSize,
    /// Incremented on every `clear`, so one per frame.
    frame_id: u64,
    /// Drawing calls since the last `clear`.
    ops: u64,
}

impl NullSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            frame_id: 0,
            ops: 0,
        }
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn ops_in_frame(&self) -> u64 {
        self.ops
    }
}

impl Surface for NullSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self) -> Result<()> {
        self.frame_id = self.frame_id.wrapping_add(1);
        self.ops = 0;
        Ok(())
    }

    fn draw_image(&mut self, _image: &Image, _x: f64, _y: f64, _w: f64, _h: f64) -> Result<()> {
        self.ops += 1;
        Ok(())
    }

    fn fill_circle(&mut self, _x: f64, _y: f64, _r: f64, _color: Color) -> Result<()> {
        self.ops += 1;
        Ok(())
    }

    fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, _color: Color) -> Result<()> {
        self.ops += 1;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

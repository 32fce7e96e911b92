use crate::assets::Image;
use crate::render::Color;
use std::any::Any;

/// Size of a surface in pixels. It's a simple struct to hold width and height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A 2D drawing target owned by one module.
///
/// Coordinates are in surface pixels with the origin at the top-left corner.
/// Drawing outside the surface is clipped. Calls occur on the orchestrator's
/// task, so implementations must be `Send`.
pub trait Surface: Send + Any {
    /// Size of the surface.
    fn size(&self) -> SurfaceSize;

    /// Wipe the whole surface to transparent.
    fn clear(&mut self) -> anyhow::Result<()>;

    /// Draw `image` scaled to `w × h` with its top-left corner at `(x, y)`.
    fn draw_image(&mut self, image: &Image, x: f64, y: f64, w: f64, h: f64) -> anyhow::Result<()>;

    /// Fill a disc centred at `(x, y)`.
    fn fill_circle(&mut self, x: f64, y: f64, r: f64, color: Color) -> anyhow::Result<()>;

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) -> anyhow::Result<()>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

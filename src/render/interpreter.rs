use crate::assets::ImageCache;
use crate::render::backend::Surface;
use crate::render::{Color, DecodeError, DrawBatch, DrawCommand};

/// Outcome of executing one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteReport {
    pub executed: usize,
    pub skipped: usize,
}

/// Applies `batch` to `surface` in order.
///
/// Nothing in a batch can fail the frame. Unknown commands, malformed
/// arguments, unparsable colors and images that are not loaded yet are each
/// skipped, and the remaining instructions still run.
pub fn execute(surface: &mut dyn Surface, images: &ImageCache, batch: &DrawBatch) -> ExecuteReport {
    let mut report = ExecuteReport::default();

    for op in batch {
        let cmd = match op.decode() {
            Ok(cmd) => cmd,
            Err(DecodeError::UnknownCommand(name)) => {
                log::trace!("Render: ignoring unknown command {:?}", name);
                report.skipped += 1;
                continue;
            }
            Err(e) => {
                log::warn!("Render: {}", e);
                report.skipped += 1;
                continue;
            }
        };

        let result = match cmd {
            DrawCommand::Clear => surface.clear(),
            DrawCommand::Image { path, x, y, w, h } => match images.image(path) {
                Some(image) => surface.draw_image(&image, x, y, w, h),
                None => {
                    log::debug!("Render: image {} not loaded, skipping", path);
                    report.skipped += 1;
                    continue;
                }
            },
            DrawCommand::Circle { x, y, r, color } => match parse_color(color) {
                Some(c) => surface.fill_circle(x, y, r, c),
                None => {
                    report.skipped += 1;
                    continue;
                }
            },
            DrawCommand::Rect { x, y, w, h, color } => match parse_color(color) {
                Some(c) => surface.fill_rect(x, y, w, h, c),
                None => {
                    report.skipped += 1;
                    continue;
                }
            },
        };

        match result {
            Ok(()) => report.executed += 1,
            Err(e) => {
                log::warn!("Render: {} failed: {}", op.cmd, e);
                report.skipped += 1;
            }
        }
    }

    report
}

fn parse_color(s: &str) -> Option<Color> {
    let color = Color::parse(s);
    if color.is_none() {
        log::warn!("Render: invalid color {:?}", s);
    }
    color
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::pixels::PixelSurface;
    use crate::render::{DrawOp, SurfaceSize};
    use crate::testing::{RecordingSurface, StubLoader, SurfaceCall};
    use std::sync::Arc;

    #[tokio::test]
    async fn runs_in_order() {
        let cache = ImageCache::new(Arc::new(StubLoader::new()));
        cache.load("/tree.png").await;

        let mut surface = RecordingSurface::new(SurfaceSize::new(100, 100));
        let calls = surface.calls();

        let mut batch = DrawBatch::frame();
        batch.push(DrawOp::rect(0.0, 0.0, 10.0, 10.0, "#000"));
        batch.push(DrawOp::image("/tree.png", 5.0, 6.0, 7.0, 8.0));
        batch.push(DrawOp::circle(1.0, 2.0, 3.0, "white"));

        let report = execute(&mut surface, &cache, &batch);
        assert_eq!(report, ExecuteReport { executed: 4, skipped: 0 });

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], SurfaceCall::Clear);
        assert!(matches!(calls[1], SurfaceCall::Rect { .. }));
        assert_eq!(calls[2], SurfaceCall::Image { x: 5.0, y: 6.0, w: 7.0, h: 8.0 });
        assert!(matches!(calls[3], SurfaceCall::Circle { .. }));
    }

    #[tokio::test]
    async fn bad_instructions_are_skipped() {
        let cache = ImageCache::new(Arc::new(StubLoader::new()));
        let mut surface = RecordingSurface::new(SurfaceSize::new(100, 100));
        let calls = surface.calls();

        let batch = DrawBatch::from(vec![
            DrawOp::new("sparkle", vec![1.0.into()]),
            DrawOp::new("circle", vec!["oops".into()]),
            DrawOp::circle(1.0, 1.0, 1.0, "not-a-color"),
            DrawOp::image("/never-requested.png", 0.0, 0.0, 1.0, 1.0),
            DrawOp::rect(0.0, 0.0, 1.0, 1.0, "red"),
        ]);

        let report = execute(&mut surface, &cache, &batch);
        assert_eq!(report, ExecuteReport { executed: 1, skipped: 4 });
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unloaded_image_leaves_pixels_untouched() {
        let loader = Arc::new(StubLoader::new().failing("/static/img/manzana.jpg"));
        let cache = ImageCache::new(loader);
        cache.load("/static/img/manzana.jpg").await;

        let mut surface = PixelSurface::new(SurfaceSize::new(20, 20));
        surface.fill_rect(0.0, 0.0, 20.0, 20.0, Color::from_u8(1, 2, 3, 255)).unwrap();
        let before = surface.snapshot();

        let batch = DrawBatch::from(vec![
            DrawOp::image("/static/img/manzana.jpg", 0.0, 0.0, 20.0, 20.0),
            DrawOp::image("/static/img/nube.png", 0.0, 0.0, 20.0, 20.0),
        ]);
        let report = execute(&mut surface, &cache, &batch);

        assert_eq!(report.skipped, 2);
        assert_eq!(surface.snapshot(), before);
    }
}

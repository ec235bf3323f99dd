use thiserror::Error;

use crate::physics::Vec2;

/// A drawing call that could not be completed (missing or tainted image,
/// canvas rejection). Recovered per body per frame, never fatal.
#[derive(Debug, Error)]
#[error("draw failed: {0}")]
pub struct DrawError(pub String);

/// 2D raster surface the gallery draws onto, in logical (CSS pixel)
/// coordinates. The device-pixel-ratio transform is the implementor's job.
pub trait RenderSurface {
    fn clear(&mut self, width: f32, height: f32);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, angle: f32);

    /// Draw the image registered under `url`, with its top-left at (x, y)
    /// and scaled to w × h, under the current transform.
    fn draw_image(&mut self, url: &str, x: f32, y: f32, w: f32, h: f32) -> Result<(), DrawError>;

    /// Fill a closed polygon under the current transform.
    fn fill_polygon(&mut self, points: &[Vec2], color: &str);
}

//! `RenderSurface` over a 2D canvas context.
//!
//! Decoded image elements live here, at the platform edge; the core only
//! tracks load state. All drawing happens in logical (CSS pixel)
//! coordinates under the device-pixel-ratio transform.

use std::collections::HashMap;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement, ImageSmoothingQuality};

use crate::gallery::{DrawError, RenderSurface};
use crate::physics::Vec2;

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self {
            ctx,
            images: HashMap::new(),
        }
    }

    /// Scale drawing so logical coordinates land on device pixels, and keep
    /// image smoothing on for crisp scaling on retina displays.
    pub fn apply_device_transform(&self, dpr: f64) -> Result<(), JsValue> {
        self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
        self.ctx.set_image_smoothing_enabled(true);
        self.ctx
            .set_image_smoothing_quality(ImageSmoothingQuality::High);
        Ok(())
    }

    /// Make a decoded image available to `draw_image`.
    pub fn register_image(&mut self, url: String, image: HtmlImageElement) {
        self.images.insert(url, image);
    }

    pub fn clear_images(&mut self) {
        self.images.clear();
    }
}

impl RenderSurface for CanvasSurface {
    fn clear(&mut self, width: f32, height: f32) {
        self.ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f32, y: f32) {
        let _ = self.ctx.translate(x as f64, y as f64);
    }

    fn rotate(&mut self, angle: f32) {
        let _ = self.ctx.rotate(angle as f64);
    }

    fn draw_image(&mut self, url: &str, x: f32, y: f32, w: f32, h: f32) -> Result<(), DrawError> {
        let image = self
            .images
            .get(url)
            .ok_or_else(|| DrawError(format!("no decoded image for {url}")))?;
        if !image.complete() || image.natural_width() == 0 {
            return Err(DrawError(format!("image not ready: {url}")));
        }
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(
                image, x as f64, y as f64, w as f64, h as f64,
            )
            .map_err(|err| DrawError(format!("drawImage rejected: {err:?}")))
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: &str) {
        if points.is_empty() {
            return;
        }
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        self.ctx.move_to(points[0].x as f64, points[0].y as f64);
        for p in &points[1..] {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.ctx.close_path();
        self.ctx.fill();
    }
}

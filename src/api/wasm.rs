//! `wasm_bindgen` facade for the page.
//!
//! Constructing a `Gallery` activates everything: the DPR-sized canvas
//! buffer, the boundary walls, the fixed-step interval, the render loop and
//! feed polling. `deactivate` drops every handle, so the step scheduler,
//! the poll interval and the pending animation frame all stop
//! deterministically instead of leaking across teardown/recreate cycles.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Interval;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{console, CanvasRenderingContext2d, HtmlCanvasElement};

use crate::gallery::GalleryCore;

use super::input;
use super::loader;
use super::net;
use super::surface::CanvasSurface;

/// Fixed simulation timestep, independent of the display refresh rate.
const STEP_MS: u32 = 16;
/// Remote feed poll period.
const POLL_MS: u32 = 10_000;

/// Shared state behind the facade. Every mutation goes through a short
/// `borrow_mut` scope on `core`, which keeps the step interval, render
/// frames, load completions and input events serialized.
pub(crate) struct GalleryHost {
    pub(crate) core: RefCell<GalleryCore>,
    pub(crate) surface: RefCell<CanvasSurface>,
    pub(crate) canvas: HtmlCanvasElement,
    pub(crate) listeners: RefCell<Vec<EventListener>>,
    endpoint: String,
    step_interval: RefCell<Option<Interval>>,
    poll_interval: RefCell<Option<Interval>>,
    frame_handle: RefCell<Option<AnimationFrame>>,
}

impl GalleryHost {
    fn start_stepping(self: &Rc<Self>) {
        let host = Rc::clone(self);
        let interval = Interval::new(STEP_MS, move || {
            host.core.borrow_mut().step(STEP_MS as f32 / 1000.0);
        });
        *self.step_interval.borrow_mut() = Some(interval);
    }

    /// Continuous render loop with a stored, cancellable frame handle.
    fn schedule_frame(self: &Rc<Self>) {
        if !self.core.borrow().is_active() {
            return;
        }
        let host = Rc::clone(self);
        let handle = request_animation_frame(move |_timestamp| {
            host.frame_handle.borrow_mut().take();
            loader::start_pending(&host);
            {
                let mut core = host.core.borrow_mut();
                let mut surface = host.surface.borrow_mut();
                core.render_frame(&mut *surface);
            }
            host.schedule_frame();
        });
        *self.frame_handle.borrow_mut() = Some(handle);
    }

    fn start_polling(self: &Rc<Self>) {
        self.poll_feed();
        let host = Rc::clone(self);
        let interval = Interval::new(POLL_MS, move || host.poll_feed());
        *self.poll_interval.borrow_mut() = Some(interval);
    }

    /// One poll cycle. Failures are logged and skipped; the next interval
    /// is the retry.
    fn poll_feed(self: &Rc<Self>) {
        let host = Rc::clone(self);
        let endpoint = self.endpoint.clone();
        spawn_local(async move {
            match net::fetch_feed(&endpoint).await {
                Ok(entries) => {
                    let added = host.core.borrow_mut().sync_feed(&entries);
                    if added > 0 {
                        loader::start_pending(&host);
                        console::log_1(
                            &format!("🍪 gallery feed: {added} new cookies").into(),
                        );
                    }
                }
                Err(err) => {
                    console::warn_1(&format!("gallery feed fetch failed: {err}").into());
                }
            }
        });
    }

    fn deactivate(&self) {
        self.step_interval.borrow_mut().take();
        self.poll_interval.borrow_mut().take();
        self.frame_handle.borrow_mut().take();
        self.listeners.borrow_mut().clear();
        self.surface.borrow_mut().clear_images();
        self.core.borrow_mut().deactivate();
    }
}

/// The physics cookie gallery, bound to one canvas.
#[wasm_bindgen]
pub struct Gallery {
    host: Rc<GalleryHost>,
}

#[wasm_bindgen]
impl Gallery {
    /// Activate the gallery on `canvas`, polling `endpoint` for images.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, endpoint: String) -> Result<Gallery, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let dpr = device_pixel_ratio();
        let width = canvas.client_width() as f32;
        let height = canvas.client_height() as f32;
        size_backing_store(&canvas, width, height, dpr);

        let surface = CanvasSurface::new(ctx);
        surface.apply_device_transform(dpr)?;

        let host = Rc::new(GalleryHost {
            core: RefCell::new(GalleryCore::new(width, height)),
            surface: RefCell::new(surface),
            canvas,
            listeners: RefCell::new(Vec::new()),
            endpoint,
            step_interval: RefCell::new(None),
            poll_interval: RefCell::new(None),
            frame_handle: RefCell::new(None),
        });

        input::install(&host);
        host.start_stepping();
        host.schedule_frame();
        host.start_polling();

        Ok(Gallery { host })
    }

    /// Drop a new cookie into the world. Returns false when the URL is
    /// already present or the gallery is deactivated.
    #[wasm_bindgen(js_name = addImage)]
    pub fn add_image(&self, url: String, submitted_by_user: bool) -> bool {
        let added = self
            .host
            .core
            .borrow_mut()
            .add_image(&url, submitted_by_user);
        if added {
            loader::start_pending(&self.host);
        }
        added
    }

    /// New logical size for the canvas. Existing bodies keep their
    /// simulation coordinates.
    pub fn resize(&self, width: f32, height: f32) -> Result<(), JsValue> {
        let dpr = device_pixel_ratio();
        size_backing_store(&self.host.canvas, width, height, dpr);
        self.host.surface.borrow().apply_device_transform(dpr)?;
        self.host.core.borrow_mut().resize(width, height);
        Ok(())
    }

    #[wasm_bindgen(getter, js_name = cookieCount)]
    pub fn cookie_count(&self) -> usize {
        self.host.core.borrow().cookie_count()
    }

    /// Upload a photo; resolves to the processed image URL, which is also
    /// dropped into the world as a user cookie. Rejects on any network,
    /// status or payload failure.
    #[wasm_bindgen(js_name = submitPhoto)]
    pub fn submit_photo(&self, image_base64: String) -> js_sys::Promise {
        let host = Rc::clone(&self.host);
        let endpoint = self.host.endpoint.clone();
        future_to_promise(async move {
            match net::submit_photo(&endpoint, &image_base64).await {
                Ok(url) => {
                    if host.core.borrow_mut().add_image(&url, true) {
                        loader::start_pending(&host);
                    }
                    Ok(JsValue::from_str(&url))
                }
                Err(err) => Err(JsValue::from_str(&err.to_string())),
            }
        })
    }

    /// Stop stepping, polling and rendering, and clear all state. Safe to
    /// call more than once.
    pub fn deactivate(&self) {
        self.host.deactivate();
    }
}

impl Drop for Gallery {
    /// Freeing the handle from JS tears the gallery down too, so a dropped
    /// gallery cannot keep its render loop or intervals alive.
    fn drop(&mut self) {
        self.host.deactivate();
    }
}

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
}

/// Internal buffer = logical size x device pixel ratio.
fn size_backing_store(canvas: &HtmlCanvasElement, width: f32, height: f32, dpr: f64) {
    canvas.set_width((width as f64 * dpr).floor() as u32);
    canvas.set_height((height as f64 * dpr).floor() as u32);
}

//! Asynchronous image loading through `HtmlImageElement`.
//!
//! Loads are fire-and-forget: the render loop never waits on one. Each
//! completion carries the cache generation it was started under, so a load
//! that lands after the gallery was torn down is dropped on the floor.

use std::rc::Rc;

use gloo::events::EventListener;
use web_sys::{console, HtmlImageElement};

use super::wasm::GalleryHost;

/// Start platform loads for every URL the core has queued.
pub(crate) fn start_pending(host: &Rc<GalleryHost>) {
    let (pending, generation) = {
        let mut core = host.core.borrow_mut();
        (core.take_pending_loads(), core.cache_generation())
    };
    for url in pending {
        start_load(host, url, generation);
    }
}

fn start_load(host: &Rc<GalleryHost>, url: String, generation: u64) {
    let Ok(image) = HtmlImageElement::new() else {
        host.core.borrow_mut().image_failed(generation, &url);
        return;
    };

    let on_load = EventListener::once(&image, "load", {
        let host = Rc::clone(host);
        let image = image.clone();
        let url = url.clone();
        move |_event| {
            let accepted = host.core.borrow_mut().image_loaded(
                generation,
                &url,
                image.natural_width(),
                image.natural_height(),
            );
            if accepted {
                host.surface.borrow_mut().register_image(url, image);
            }
        }
    });
    // One-shot listeners on a throwaway element; letting gloo drop them here
    // would cancel the load.
    on_load.forget();

    let on_error = EventListener::once(&image, "error", {
        let host = Rc::clone(host);
        let url = url.clone();
        move |_event| {
            console::warn_1(&format!("failed to load image: {url}").into());
            host.core.borrow_mut().image_failed(generation, &url);
        }
    });
    on_error.forget();

    image.set_src(&url);
}

//! Galleta Engine - physics cookie gallery in WASM
//!
//! - physics/   - 2D rigid body simulation (polygon bodies, walls, dragging)
//! - gallery/   - gallery controller, image cache, remote feed sync
//! - api/       - public wasm-bindgen API for the page

pub mod physics;
pub mod gallery;
pub mod api;

use wasm_bindgen::prelude::*;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    web_sys::console::log_1(&"🍪 Galleta WASM Engine initialized!".into());
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Re-export main types
pub use api::wasm::Gallery;
pub use gallery::{AssetState, GalleryCore, ImageCache, RenderSurface};
pub use physics::{Body, PhysicsWorld, Vec2};

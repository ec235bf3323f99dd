//! Platform layer: the `wasm_bindgen` facade, canvas surface, input
//! listeners, image loader and fetch client.

mod input;
mod loader;
mod net;
mod surface;
pub mod wasm;

pub use surface::CanvasSurface;
pub use wasm::Gallery;

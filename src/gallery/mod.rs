//! The cookie gallery: controller, image cache, feed wire types, the
//! silhouette outline and the render surface boundary.

mod controller;
mod feed;
mod images;
pub mod silhouette;
mod surface;

pub use controller::{Cookie, GalleryCore, MAX_COOKIES};
pub use feed::{parse_feed, parse_submission_reply, FeedEntry, FeedError, SubmissionRequest};
pub use images::{AssetState, ImageCache};
pub use surface::{DrawError, RenderSurface};

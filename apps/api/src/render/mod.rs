// Rasterizer/exporter: placed layout → pixels → PNG, resized copies and data URLs.

pub mod color;
pub mod export;
pub mod rasterizer;

pub use color::Rgb;
pub use export::{data_url, encode_png, save_png, thumbnail, ResizeFilter, DEFAULT_THUMBNAIL_SIZE};
pub use rasterizer::rasterize;

//! Word cloud generation: text → filtered terms → ranked frequencies → placed glyphs → PNG.
//!
//! The HTTP binary in `main.rs` is a thin adapter over [`generation::WordCloudSession`].

pub mod config;
pub mod errors;
pub mod generation;
pub mod layout;
pub mod render;
pub mod routes;
pub mod state;
pub mod text;

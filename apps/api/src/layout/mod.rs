// Layout engine: glyph sources, masks, occupancy, spiral search and placement.
// run_layout is CPU-bound; async callers must go through tokio::task::spawn_blocking.

pub mod engine;
pub mod font_metrics;
pub mod glyph;
pub mod occupancy;
pub mod outline;
pub mod scaling;
pub mod spiral;

// Re-export the public API consumed by other modules (generator, renderer, handlers).
pub use engine::{run_layout, Layout, LayoutConfig, LayoutExhausted, PlacedWord};
pub use font_metrics::{BlockFace, GlyphSource, WordOutline};
pub use glyph::{GlyphMask, Orientation};
pub use outline::{load_glyph_source, BlockFaceSource, OutlineFace};

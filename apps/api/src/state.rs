use std::sync::Arc;

use crate::config::Config;
use crate::generation::WordCloudSession;
use crate::layout::GlyphSource;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable glyph backend. Default: system sans-serif via fontdb, else the block face.
    pub glyphs: Arc<dyn GlyphSource>,
    /// Custom stopwords and the current artifact, shared by every request.
    pub session: Arc<WordCloudSession>,
}

impl AppState {
    pub fn new(config: Config, glyphs: Arc<dyn GlyphSource>) -> Self {
        Self {
            config,
            glyphs,
            session: Arc::new(WordCloudSession::new()),
        }
    }
}

//! Word cloud generation: orchestrates the full pipeline for one request.
//!
//! Flow: extract_terms → FrequencyTable (bounds) → run_layout → rasterize → encode_png.
//!
//! Synchronous and CPU-bound. Uses the stopword snapshot it is given and touches no
//! shared state, so concurrent calls are independent.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::{run_layout, GlyphSource, LayoutConfig, LayoutExhausted, PlacedWord};
use crate::render::{encode_png, rasterize, Rgb};
use crate::text::{
    extract_terms, FrequencyBounds, FrequencyEntry, FrequencyTable, StopwordSnapshot, DEFAULT_TOP_K,
};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Per-request generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub max_words: usize,
    pub min_font_size: u32,
    pub max_font_size: u32,
    pub min_freq: Option<u32>,
    pub max_freq: Option<u32>,
    pub top_k: usize,
    pub font_step: u32,
    pub spiral_step: u32,
    pub margin: u32,
    pub allow_vertical: bool,
}

/// 600×400 on white, up to 100 words between 10px and 100px, top 10 reported.
pub fn default_cloud_config() -> CloudConfig {
    let layout = LayoutConfig::default();
    CloudConfig {
        width: layout.width,
        height: layout.height,
        background: layout.background,
        max_words: layout.max_words,
        min_font_size: layout.min_font_size,
        max_font_size: layout.max_font_size,
        min_freq: None,
        max_freq: None,
        top_k: DEFAULT_TOP_K,
        font_step: layout.font_step,
        spiral_step: layout.spiral_step,
        margin: layout.margin,
        allow_vertical: layout.allow_vertical,
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        default_cloud_config()
    }
}

impl CloudConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        self.layout_config().validate()?;
        self.bounds()?;
        if self.top_k == 0 {
            return Err(AppError::Validation("top_k must be at least 1".into()));
        }
        Ok(())
    }

    pub fn bounds(&self) -> Result<FrequencyBounds, AppError> {
        FrequencyBounds::new(self.min_freq, self.max_freq)
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            width: self.width,
            height: self.height,
            background: self.background,
            max_words: self.max_words,
            min_font_size: self.min_font_size,
            max_font_size: self.max_font_size,
            font_step: self.font_step,
            spiral_step: self.spiral_step,
            margin: self.margin,
            allow_vertical: self.allow_vertical,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Artifact
// ────────────────────────────────────────────────────────────────────────────

/// The product of one generation run. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedArtifact {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub png: Bytes,
    /// Highest-ranked terms, at most `top_k`.
    pub top_terms: Vec<FrequencyEntry>,
    pub words: Vec<PlacedWord>,
    pub dropped: Vec<LayoutExhausted>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the whole pipeline on `text` with a fixed stopword snapshot.
///
/// Fails before layout on blank input (`EmptyInput`), on an invalid config
/// (`Validation`) and when filtering leaves no terms (`EmptyAfterFilter`).
/// Terms that find no room are reported in `dropped`, not as errors.
pub fn generate(
    text: &str,
    stopwords: &StopwordSnapshot,
    config: &CloudConfig,
    glyphs: &dyn GlyphSource,
) -> Result<GeneratedArtifact, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::EmptyInput);
    }
    config.validate()?;

    let terms = extract_terms(text, stopwords);
    let table = FrequencyTable::from_terms(&terms, config.bounds()?)?;

    let layout = run_layout(table.ranked(), &config.layout_config(), glyphs);
    let pixmap = rasterize(&layout, glyphs)?;
    let png = encode_png(&pixmap)?;

    let artifact = GeneratedArtifact {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        width: layout.width,
        height: layout.height,
        png,
        top_terms: table.top_k(config.top_k),
        words: layout.words,
        dropped: layout.dropped,
    };

    info!(
        artifact_id = %artifact.id,
        terms = terms.len(),
        distinct = table.len(),
        placed = artifact.words.len(),
        dropped = artifact.dropped.len(),
        stopwords_version = stopwords.version(),
        "Word cloud generated"
    );

    Ok(artifact)
}

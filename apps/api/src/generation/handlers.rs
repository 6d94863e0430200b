//! Axum route handlers for the word cloud and stopword APIs.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::CloudConfig;
use crate::layout::LayoutExhausted;
use crate::render::{data_url, Rgb, ResizeFilter, DEFAULT_THUMBNAIL_SIZE};
use crate::state::AppState;
use crate::text::frequency::parse_bound;
use crate::text::FrequencyEntry;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// A frequency bound as typed by a user: a number, or text such as `""` or `"∞"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BoundInput {
    Number(u32),
    Text(String),
}

impl BoundInput {
    fn resolve(&self, field: &str) -> Result<Option<u32>, AppError> {
        match self {
            BoundInput::Number(n) => Ok(Some(*n)),
            BoundInput::Text(raw) => parse_bound(raw, field),
        }
    }
}

/// Omitted fields fall back to the server defaults.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub text: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub background: Option<Rgb>,
    pub max_words: Option<usize>,
    pub min_font_size: Option<u32>,
    pub max_font_size: Option<u32>,
    pub min_freq: Option<BoundInput>,
    pub max_freq: Option<BoundInput>,
    pub top_k: Option<usize>,
    pub allow_vertical: Option<bool>,
}

impl GenerateRequest {
    fn apply_to(&self, mut config: CloudConfig) -> Result<CloudConfig, AppError> {
        if let Some(v) = self.width {
            config.width = v;
        }
        if let Some(v) = self.height {
            config.height = v;
        }
        if let Some(v) = self.background {
            config.background = v;
        }
        if let Some(v) = self.max_words {
            config.max_words = v;
        }
        if let Some(v) = self.min_font_size {
            config.min_font_size = v;
        }
        if let Some(v) = self.max_font_size {
            config.max_font_size = v;
        }
        if let Some(bound) = &self.min_freq {
            config.min_freq = bound.resolve("min_freq")?;
        }
        if let Some(bound) = &self.max_freq {
            config.max_freq = bound.resolve("max_freq")?;
        }
        if let Some(v) = self.top_k {
            config.top_k = v;
        }
        if let Some(v) = self.allow_vertical {
            config.allow_vertical = v;
        }
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    /// `data:image/png;base64,…`
    pub image: String,
    pub top_terms: Vec<FrequencyEntry>,
    /// `term: count` lines, as shown in the front end's frequency table.
    pub top_terms_display: Vec<String>,
    pub placed: usize,
    pub dropped: Vec<LayoutExhausted>,
}

#[derive(Debug, Deserialize)]
pub struct ThumbnailParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StopwordRequest {
    pub term: String,
}

#[derive(Debug, Serialize)]
pub struct StopwordsResponse {
    pub terms: Vec<String>,
    pub version: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// Word cloud handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/wordcloud/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let config = req.apply_to(state.config.cloud_defaults())?;

    // Layout and rasterization are CPU-bound; keep them off the async executor.
    let session = state.session.clone();
    let glyphs = state.glyphs.clone();
    let text = req.text;
    let artifact = tokio::task::spawn_blocking(move || {
        session.generate_and_publish(&text, &config, glyphs.as_ref())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in generation: {e}")))??;

    Ok(Json(GenerateResponse {
        id: artifact.id,
        created_at: artifact.created_at,
        width: artifact.width,
        height: artifact.height,
        image: data_url(&artifact.png),
        top_terms_display: artifact.top_terms.iter().map(ToString::to_string).collect(),
        top_terms: artifact.top_terms.clone(),
        placed: artifact.words.len(),
        dropped: artifact.dropped.clone(),
    }))
}

/// GET /api/v1/wordcloud/image
pub async fn handle_export_image(State(state): State<AppState>) -> Result<Response, AppError> {
    let png = state.session.export_current_artifact()?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"wordcloud.png\""),
        ],
        png,
    )
        .into_response())
}

/// GET /api/v1/wordcloud/thumbnail?width=&height=&filter=
pub async fn handle_thumbnail(
    State(state): State<AppState>,
    Query(params): Query<ThumbnailParams>,
) -> Result<Response, AppError> {
    let (default_w, default_h) = DEFAULT_THUMBNAIL_SIZE;
    let width = params.width.unwrap_or(default_w);
    let height = params.height.unwrap_or(default_h);
    let filter: ResizeFilter = params.filter.as_deref().unwrap_or_default().parse()?;

    let session = state.session.clone();
    let png = tokio::task::spawn_blocking(move || session.current_thumbnail(width, height, filter))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in thumbnail: {e}")))??;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Stopword and session handlers
// ────────────────────────────────────────────────────────────────────────────

fn stopwords_response(state: &AppState, version: u64) -> Json<StopwordsResponse> {
    Json(StopwordsResponse {
        terms: state.session.custom_stopwords(),
        version,
    })
}

/// GET /api/v1/stopwords
pub async fn handle_list_stopwords(State(state): State<AppState>) -> Json<StopwordsResponse> {
    let version = state.session.snapshot().version();
    stopwords_response(&state, version)
}

/// POST /api/v1/stopwords
pub async fn handle_add_stopword(
    State(state): State<AppState>,
    Json(req): Json<StopwordRequest>,
) -> Result<Json<StopwordsResponse>, AppError> {
    let snapshot = state.session.add_custom_stopword(&req.term)?;
    Ok(stopwords_response(&state, snapshot.version()))
}

/// POST /api/v1/stopwords/remove
pub async fn handle_remove_stopword(
    State(state): State<AppState>,
    Json(req): Json<StopwordRequest>,
) -> Result<Json<StopwordsResponse>, AppError> {
    let snapshot = state.session.remove_custom_stopword(&req.term)?;
    Ok(stopwords_response(&state, snapshot.version()))
}

/// POST /api/v1/stopwords/reset
pub async fn handle_reset_stopwords(State(state): State<AppState>) -> Json<StopwordsResponse> {
    let snapshot = state.session.reset_custom_stopwords();
    stopwords_response(&state, snapshot.version())
}

/// POST /api/v1/session/reset
pub async fn handle_reset_session(State(state): State<AppState>) -> Json<StopwordsResponse> {
    state.session.reset_session();
    let version = state.session.snapshot().version();
    stopwords_response(&state, version)
}

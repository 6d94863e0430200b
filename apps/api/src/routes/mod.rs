pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Word cloud API
        .route(
            "/api/v1/wordcloud/generate",
            post(handlers::handle_generate),
        )
        .route("/api/v1/wordcloud/image", get(handlers::handle_export_image))
        .route(
            "/api/v1/wordcloud/thumbnail",
            get(handlers::handle_thumbnail),
        )
        // Stopword API
        .route(
            "/api/v1/stopwords",
            get(handlers::handle_list_stopwords).post(handlers::handle_add_stopword),
        )
        .route(
            "/api/v1/stopwords/remove",
            post(handlers::handle_remove_stopword),
        )
        .route(
            "/api/v1/stopwords/reset",
            post(handlers::handle_reset_stopwords),
        )
        // Session API
        .route("/api/v1/session/reset", post(handlers::handle_reset_session))
        .with_state(state)
}

//! API routes for the RAG server

pub mod ingest;
pub mod query;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(info))
        .route("/health", get(health))
        // Ingestion - with larger body limit for file uploads
        .route(
            "/ingest",
            post(ingest::ingest_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/retrieve", post(query::retrieve))
        .route("/generate", post(query::generate))
        .route("/stats", get(query::stats))
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// GET / - API info
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "bilingual-rag",
        "message": "Bilingual (English/Japanese) knowledge assistant API",
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "embedder": state.embedder().name(),
        "index": state.index().stats(),
        "endpoints": {
            "POST /ingest": "Upload .txt documents (multipart, optional ?chunk_size=)",
            "POST /retrieve": "Ranked chunks for a query",
            "POST /generate": "Answer in English or Japanese from retrieved context",
            "GET /stats": "Vector index statistics",
            "GET /health": "Liveness check"
        }
    }))
}

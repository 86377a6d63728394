//! Retrieval and answer generation endpoints

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{GenerateRequest, GenerateResponse, IndexStats, RetrieveRequest, RetrieveResponse};

/// POST /retrieve - Ranked chunks for a query
pub async fn retrieve(
    State(state): State<AppState>,
    Json(request): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>> {
    let generation = &state.config().generation;
    let k = request.validate(generation.default_top_k, generation.max_top_k)?;

    let results = state.retriever().retrieve(&request.query, k).await?;
    tracing::info!("Retrieve: {} results (k={})", results.len(), k);

    Ok(Json(RetrieveResponse::new(request.query, &results)))
}

/// POST /generate - Answer a query from retrieved context
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let generation = &state.config().generation;
    let k = request.validate(generation.default_top_k, generation.max_top_k)?;

    let response = state
        .orchestrator()
        .generate(&request.query, request.output_language.as_deref(), k)
        .await?;

    Ok(Json(response))
}

/// GET /stats - Vector index statistics
pub async fn stats(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.index().stats())
}

//! Document ingestion endpoint

use axum::{
    extract::{Multipart, Query, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{IngestOptions, IngestReport};

/// POST /ingest - Upload plain-text files
///
/// Every multipart field carrying a file name is treated as an upload.
/// `?chunk_size=` overrides the configured chunk size for this request.
pub async fn ingest_files(
    State(state): State<AppState>,
    Query(options): Query<IngestOptions>,
    mut multipart: Multipart,
) -> Result<Json<IngestReport>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::invalid_argument(format!("Failed to read multipart field: {}", e)))?
    {
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        let data = field.bytes().await.map_err(|e| {
            Error::invalid_argument(format!("Failed to read {}: {}", filename, e))
        })?;

        tracing::info!("Received file: {} ({} bytes)", filename, data.len());
        files.push((filename, data.to_vec()));
    }

    let report = state
        .pipeline()
        .ingest_files(files, options.chunk_size)
        .await?;

    tracing::info!(
        "Ingest request done: {} ingested, {} errors, index size {}",
        report.ingested,
        report.errors.as_ref().map_or(0, Vec::len),
        report.total_documents_in_index
    );

    Ok(Json(report))
}

//! RAG Server binary
//!
//! Run with: cargo run -p bilingual-rag --bin bilingual-rag-server
//! Set `RAG_CONFIG` to a TOML file to override the defaults.

use bilingual_rag::{config::RagConfig, server::RagServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bilingual_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var_os("RAG_CONFIG").map(PathBuf::from);
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding backend: {:?}", config.embeddings.backend);
    tracing::info!("  - Embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Index directory: {}", config.index.storage_dir.display());
    tracing::info!("  - Translation enabled: {}", config.translation.enabled);

    let server = RagServer::new(config).await?;

    let embedder = server.state().embedder();
    if !embedder.health_check().await.unwrap_or(false) {
        tracing::warn!(
            "Embedding backend '{}' is not reachable; ingestion and queries will fail until it is",
            embedder.name()
        );
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /ingest     - Upload .txt documents");
    println!("  POST /retrieve   - Ranked chunks for a query");
    println!("  POST /generate   - Answer in English or Japanese");
    println!("  GET  /stats      - Index statistics");
    println!();

    server.start().await?;

    Ok(())
}

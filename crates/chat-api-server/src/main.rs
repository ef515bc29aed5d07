use anyhow::Result;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use chat_api_server::build_router;
use chat_api_server::config::Settings;
use chat_api_server::database::{DbPool, Repository};
use chat_api_server::document::DocumentStore;
use chat_api_server::services::ChatService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,chat_api_server=debug".to_string()),
        )
        .with_target(true)
        .json()
        .init();

    info!("🚀 Starting Support Chat API Server...");

    // Load configuration
    let settings = Settings::load()?;
    info!("✅ Configuration loaded");

    // Initialize database pool
    let db_pool = DbPool::new(&settings.database).await?;
    info!("✅ Database connection established");

    // Initialize repository and schema
    let repository = Arc::new(Repository::new(db_pool));
    repository.migrate().await?;

    // Load the document corpus. A missing or malformed corpus is fatal; the
    // server must not start serving without its knowledge source.
    let document_store = Arc::new(DocumentStore::load(Path::new(&settings.documents.path))?);
    info!("✅ Document corpus loaded ({} entries)", document_store.len());

    let chat_service = Arc::new(ChatService::new(
        repository.clone(),
        document_store,
        settings.chat.clone(),
    ));

    // Build router
    let app = build_router(chat_service, repository);

    // Server address
    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

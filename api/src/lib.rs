mod core;
mod error_handler;
mod routes;

pub use crate::core::app_state::{AppState, ServerConfig};
pub use error_handler::AppError;

use std::{io::IsTerminal, sync::Arc};

use advisor::{Advisor, AdvisorConfig, ConversationStore, InMemoryHistory};
use ai_llm_service::{
    LlmServiceProfiles,
    config::default_config::{config_embedding, config_openai_chat},
};
use axum::{Router, routing::get};
use doc_store::{
    DocStore, EmbedError, EmbeddingsProvider, FastEmbedder, IndicatifProgress, LlmEmbedder,
    NoopProgress, Progress, StoreConfig,
};
use messenger::{MessengerClient, MessengerConfig};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::routes::{
    health::health_route::health,
    root_route::hello,
    webhook::{event_route::event, method_not_allowed, verify_route::verify},
};

/// Builds the HTTP router over an already constructed state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/health", get(health))
        .route(
            "/webhook",
            get(verify).post(event).fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wires every component from the environment, then serves until Ctrl+C.
///
/// Startup fails fast: a missing secret, an unreadable or empty brochure, or
/// an empty index aborts before the listener is bound.
pub async fn start() -> Result<(), AppError> {
    let server = ServerConfig::from_env()?;
    let store_cfg = StoreConfig::from_env()?;
    let advisor_cfg = AdvisorConfig::from_env()?;

    let llm = Arc::new(LlmServiceProfiles::new(
        config_openai_chat()?,
        config_embedding()?,
        None,
    )?);

    let embedder: Arc<dyn EmbeddingsProvider> = if llm.embedding_model().is_some() {
        Arc::new(LlmEmbedder::new(llm.clone())?)
    } else {
        let cache_dir = store_cfg.model_cache_dir.clone();
        let local = tokio::task::spawn_blocking(move || FastEmbedder::new(cache_dir))
            .await
            .map_err(|e| EmbedError(e.to_string()))??;
        Arc::new(local)
    };
    info!(model = embedder.model_id(), "embedding provider ready");

    let progress: Box<dyn Progress> = if std::io::stderr().is_terminal() {
        Box::new(IndicatifProgress::bar())
    } else {
        Box::new(NoopProgress)
    };
    let store = DocStore::open_or_build(&store_cfg, embedder, progress.as_ref()).await?;
    info!(segments = store.count(), doc = %store_cfg.doc_path.display(), "document index ready");

    let history: Option<Arc<dyn ConversationStore>> = if advisor_cfg.history_enabled {
        Some(Arc::new(InMemoryHistory::new(advisor_cfg.history_turns)))
    } else {
        None
    };
    let advisor = Advisor::new(store.retriever()?, llm.clone(), history, advisor_cfg);

    let delivery = MessengerClient::new(MessengerConfig::from_env()?)?;

    let state = Arc::new(AppState {
        verify_token: server.verify_token,
        advisor: Arc::new(advisor),
        delivery: Arc::new(delivery),
        index: store.index(),
        llm: Some(llm),
    });

    let listener = tokio::net::TcpListener::bind(&server.api_address)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %server.api_address, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use log_intel::config::Config;
use log_intel::router::build_router;
use log_intel::AppState;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // .env is optional
    let _ = dotenvy::dotenv();

    // Load configuration first
    let config = Config::load()?;

    // Initialize logging
    let log_filter = tracing_subscriber::EnvFilter::new(&config.logging.level);

    let registry = tracing_subscriber::registry().with(log_filter);

    // Held until shutdown so buffered file logs are flushed
    let mut _log_guard = None;

    if let Some(log_file) = &config.logging.file {
        let log_path = std::path::Path::new(log_file);
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let log_dir = log_path.parent().and_then(|p| p.to_str()).unwrap_or("logs");
        let file_name = log_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("log-intel.log");
        // Rolling appender adds a date suffix
        let file_prefix = file_name.strip_suffix(".log").unwrap_or(file_name);

        let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        _log_guard = Some(guard);
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    tracing::info!("Log Intel starting up");
    tracing::info!("Configuration loaded successfully");

    let app_state = AppState::from_config(config.llm.clone())?;
    if config.llm.enabled && config.llm.has_api_key() {
        tracing::info!(
            "LLM analysis enabled: model={}, api_base={}",
            config.llm.model_name,
            config.llm.api_base
        );
    } else {
        tracing::warn!("LLM analysis unavailable, serving rule-based results only");
    }

    let app = build_router(Arc::new(app_state));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API documentation available at http://{}/api-docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

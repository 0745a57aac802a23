use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use textlens::api::{create_router, AppState};
use textlens::config::Config;

#[derive(Parser)]
#[command(name = "textlens", version)]
#[command(about = "Self-hostable image-to-text service with translation, speech and TXT/DOCX export")]
struct Args {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "textlens=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Initializing OCR provider: {}...", config.ocr.model);
    match &config.translation {
        Some(translation) => {
            tracing::info!("Initializing translation provider: {}...", translation.model)
        }
        None => tracing::info!("TRANSLATION_MODEL is not set - translation disabled"),
    }
    tracing::info!("Initializing speech provider: {}...", config.speech.model);

    let state = AppState::from_config(config.clone());

    if !state.pipeline.ocr().is_available() {
        tracing::warn!("OCR unavailable - extraction requests will fail with 503");
    }
    if !state.pipeline.speech().is_available() {
        tracing::warn!("Text-to-speech unavailable - audio requests will be reported as warnings");
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Textlens starting on http://{}", addr);
    tracing::info!("  Upload form:  http://{}/", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI document: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests...");
}

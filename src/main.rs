// This is the entry point of the docs assistant backend.
//
// **Architecture Overview:**
// - `core/` = Business logic (no HTTP, no Google specifics)
// - `infra/` = Implementations of core traits (Gemini, Drive, Sheets, OAuth)
// - `api/` = HTTP adapter (router, CORS, error mapping)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Serve the single endpoint

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "api/api_layer.rs"]
mod api;
mod config;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::api::{build_router, AppState};
use crate::config::AppConfig;
use crate::core::ai::AiService;
use crate::core::assistant::AssistantService;
use crate::infra::ai::GeminiClient;
use crate::infra::google::{GoogleDriveClient, GoogleOAuthClient, GoogleSheetsClient};
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Every client is built once here and only read afterwards. Per-request
    // credentials are passed into each call, never stored.

    let ai_service = AiService::new(
        GeminiClient::new(config.gemini_api_key.clone()),
        config.ai_config(),
    );

    let assistant = AssistantService::new(
        ai_service,
        GoogleDriveClient::new(),
        GoogleSheetsClient::new(config.spreadsheet_id.clone()),
        GoogleOAuthClient::new(
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
        ),
        config.assistant_settings(),
    );

    let state = AppState {
        assistant: Arc::new(assistant),
    };
    let app = build_router(state, &config.cors_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        %addr,
        model = %config.gemini_model,
        folder = %config.folder_name,
        "Docs assistant is listening"
    );

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

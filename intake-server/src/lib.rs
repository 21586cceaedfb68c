// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

pub mod api;
pub mod config;
pub mod llm;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{gemini_completion, get_record, list_records, register_record, AppState};
use config::ServerConfig;
use intake_core::RecordStore;
use llm::{CompletionProxy, GeminiProvider};

/// Build the HTTP router over the given state
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    Router::new()
        .route("/api/register", post(register_record))
        .route("/api/data", get(list_records))
        .route("/api/data/:index", get(get_record))
        .route("/api/gemini", post(gemini_completion))
        .with_state(state)
        .layer(if enable_cors {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            CorsLayer::new()
        })
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    // Initialize tracing; a subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intake_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    tracing::info!("Starting Intake Server");
    tracing::info!("Configuration: {:#?}", config);

    // Missing credentials stop the process here, before any socket is bound
    config.validate()?;
    let api_key = config.gemini_api_key()?.to_string();

    let provider = GeminiProvider::new(api_key, &config.llm)?;
    tracing::info!(
        "Completion provider initialized: model={}, timeout={}s",
        config.llm.gemini_model,
        config.llm.request_timeout_secs
    );

    let state = AppState::new(
        RecordStore::new(),
        CompletionProxy::new(Arc::new(provider)),
    );

    if config.server.enable_cors {
        tracing::info!("CORS: Allowing all origins");
    }
    let app = build_router(state, config.server.enable_cors);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

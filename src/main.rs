mod client_ip;
mod config;
mod error;
mod handlers;
mod metrics;
mod models;
mod rate_limit;
mod relay;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Args;
use handlers::{chat_handler, health_handler, metrics_handler};
use rate_limit::RateLimiter;
use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // parse cli arguments
    let args = Args::parse();

    // creating shared state
    let state = Arc::new(AppState {
        client: reqwest::Client::new(),
        upstream_url: args.upstream_url.clone(),
        rate_limiter: RateLimiter::new(args.rate_limit, Duration::from_secs(args.rate_window)),
        history_limit: args.history_limit,
        default_model: args.default_model.clone(),
    });

    // Browser clients call this cross-origin with credentials, so the layer
    // mirrors the request origin instead of sending a wildcard
    let cors = CorsLayer::very_permissive();

    let app = Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(cors)
        .with_state(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    info!("Gateway running on http://localhost:{}", args.port);
    info!("Forwarding to upstream at {}", args.upstream_url);
    info!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit, args.rate_window
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

//! HTTP server setup and configuration.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::config::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub http_client: Client,
    pub config: Arc<Config>,
}

/// Insert the CORS grant headers the browser client relies on.
fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}

/// CORS middleware wrapping the whole router.
///
/// Runs before any routing so every response carries the grant headers, and
/// answers preflight OPTIONS directly with an empty 200.
async fn cors(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::OK.into_response();
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

/// Create the axum router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/chat",
            post(handlers::chat).fallback(handlers::method_not_allowed),
        )
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(middleware::from_fn(cors))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let listen_addr = config.server.listen.clone();

    // No overall request timeout: generation can be slow and the contract is
    // a single pass-through attempt. Connection establishment still fails fast.
    let http_client = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let state = AppState {
        http_client,
        config: Arc::new(config),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "Starting gemrelay proxy server");

    axum::serve(listener, app).await?;

    Ok(())
}

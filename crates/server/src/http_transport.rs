//! HTTP transport for the detector push endpoint and the materials API.
//!
//! ## Security Features
//!
//! - **Bearer Token Auth**: Validates `Authorization: Bearer <token>` header with constant-time comparison
//! - **CORS**: Configurable Cross-Origin Resource Sharing for browser clients

mod api;

pub use api::{router, AppState};

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use std::net::SocketAddr;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tower_http::cors::{Any, CorsLayer};

/// Configuration for HTTP transport security.
///
/// Note: `Debug` is manually implemented to prevent auth_token from being logged.
#[derive(Clone, Default)]
pub struct HttpSecurityConfig {
    /// Bearer token for authentication (None = no auth).
    pub auth_token: Option<String>,
    /// Allowed CORS origins (empty = no CORS).
    pub cors_origins: Vec<String>,
}

impl std::fmt::Debug for HttpSecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSecurityConfig")
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl HttpSecurityConfig {
    /// Returns true if auth is required.
    pub fn has_auth(&self) -> bool {
        self.auth_token.is_some()
    }
}

/// Bearer token authentication middleware.
async fn auth_middleware(
    expected_token: Arc<String>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> impl IntoResponse {
    let uri = req.uri().path().to_string();

    let provided = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match provided {
        Some(token) => {
            let provided = token.as_bytes();
            let expected = expected_token.as_bytes();
            if provided.len() == expected.len() && bool::from(provided.ct_eq(expected)) {
                return next.run(req).await;
            }
            tracing::debug!(target: "dipia::http::auth", uri = %uri, "Auth failed: invalid token");
        }
        None => {
            tracing::debug!(
                target: "dipia::http::auth",
                uri = %uri,
                "Auth failed: missing or malformed Authorization header"
            );
        }
    }

    (
        StatusCode::UNAUTHORIZED,
        "Invalid or missing authorization token",
    )
        .into_response()
}

/// Builds CORS layer from allowed origins.
///
/// Invalid origins are logged and skipped.
fn build_cors_layer(origins: &[String], has_auth: bool) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if origins.is_empty() {
        return CorsLayer::new();
    }

    if origins.iter().any(|o| o == "*") {
        if has_auth {
            tracing::warn!(
                target: "dipia::http::cors",
                "Using wildcard CORS ('*') with authentication enabled; consider explicit origins"
            );
        }
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    }

    let mut valid_origins = Vec::with_capacity(origins.len());
    for origin in origins {
        match origin.parse::<HeaderValue>() {
            Ok(header) => valid_origins.push(header),
            Err(e) => {
                tracing::warn!(
                    target: "dipia::http::cors",
                    origin,
                    error = %e,
                    "Failed to parse CORS origin; it will be ignored"
                );
            }
        }
    }

    CorsLayer::new()
        .allow_origin(valid_origins)
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// The full application: API routes plus CORS and optional bearer auth.
pub fn build_app(state: AppState, security: &HttpSecurityConfig) -> axum::Router {
    let cors_layer = build_cors_layer(&security.cors_origins, security.has_auth());
    let app = router(state).layer(cors_layer);

    match &security.auth_token {
        Some(token) => {
            let token = Arc::new(token.clone());
            app.layer(axum::middleware::from_fn(move |req, next| {
                let token = token.clone();
                auth_middleware(token, req, next)
            }))
        }
        None => app,
    }
}

/// Serve the API on `bind_addr` until Ctrl-C.
pub async fn serve_http(
    state: AppState,
    bind_addr: &str,
    security: HttpSecurityConfig,
) -> Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .with_context(|| format!("invalid bind address: {bind_addr}"))?;

    tracing::info!(
        target: "dipia::http",
        bind = %addr,
        auth = if security.has_auth() { "enabled" } else { "disabled" },
        cors_origins = security.cors_origins.len(),
        "Starting dipia API"
    );

    let app = build_app(state, &security);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!(target: "dipia::http", bind = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!(target: "dipia::http", "HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(target: "dipia::http", error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

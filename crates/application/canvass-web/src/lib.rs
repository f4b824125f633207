//! # Canvass Web
//!
//! REST API for surveys, responses, dashboard statistics and AI summaries.
//!
//! ```text
//!   request ──> request-id ──> trace ──> cors ──> cookies ──> route
//!                                                               │
//!                               require_auth (protected only) ──┤
//!                                                               ▼
//!                                                  services ──> repositories
//! ```
//!
//! Every response body is an envelope: `{message, data, meta?}` on success and
//! `{message, data: null, errors?}` on failure.

pub mod auth;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;


use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::Router;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use auth::{AuthService, LoginResult, TokenCodec, UserProfile};
pub use error::ApiError;
pub use state::AppState;

/// Create the main router with all routes nested under the API prefix.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.frontend_origin.clone())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let api = Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router(state.clone()))
        .merge(routes::surveys::router(state.clone()))
        .merge(routes::responses::router(state.clone()))
        .merge(routes::ai::router(state.clone()));

    let app = if state.api_prefix.is_empty() {
        api
    } else {
        Router::new().nest(&state.api_prefix, api)
    };

    app.fallback(middleware::fallback::route_not_found)
        .layer(axum::middleware::map_response(
            middleware::fallback::method_not_allowed,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get("x-request-id")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("-");
                        tracing::info_span!(
                            "http",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id,
                        )
                    }),
                )
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors)
                .layer(CookieManagerLayer::new()),
        )
        .with_state(state)
}

/// Start the web server
pub async fn serve(state: Arc<AppState>, addr: &str) -> std::io::Result<()> {
    let prefix = state.api_prefix.clone();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("canvass API listening on http://{}{}", addr, prefix);

    axum::serve(listener, app).await
}

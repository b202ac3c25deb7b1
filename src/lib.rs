//! Cafe API Library
//!
//! CRUD backend for cafes and the employees assigned to them.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod identifiers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;
pub mod validation;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Smallest request body limit, whatever the logo limit is
const MIN_BODY_LIMIT: usize = 1024 * 1024;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone(), services::ServiceSettings::from(&config));
        Self {
            db,
            config,
            services,
        }
    }
}

/// Cafe and employee endpoints
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::cafes::cafe_routes())
        .merge(handlers::employees::employee_routes())
}

/// Complete application: API, health, docs and the request id / tracing layers.
///
/// CORS is left to the caller since it depends on deployment settings.
pub fn app_router(state: AppState) -> Router {
    // Base64 inflates JSON logos by a third, multipart adds framing.
    let body_limit = state
        .config
        .max_logo_bytes
        .saturating_mul(2)
        .max(MIN_BODY_LIMIT);

    Router::new()
        .route("/", get(|| async { "cafe-api up" }))
        .merge(api_routes())
        .nest("/health", health::health_routes())
        .merge(openapi::swagger_ui())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(request_logging_middleware))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

async fn request_logging_middleware(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    ::tracing::debug!(method = %method, uri = %uri, "Incoming request");

    let response = next.run(request).await;

    let status = response.status();
    ::tracing::info!(
        method = %method,
        uri = %uri,
        status = status.as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}

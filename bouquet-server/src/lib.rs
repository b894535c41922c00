//! # Digibouquet Server Library
//!
//! Stores shared bouquets and serves them back for read-only viewing.
//! This library is used by both the binary and integration tests.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use bouquet_core::FlowerCatalog;
use bouquet_export::BouquetExporter;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod config;
pub mod health;
pub mod metrics;
pub mod routes;
pub mod store;
pub mod validation;

pub use config::{ServerArgs, ServerConfig};
pub use store::{BouquetStore, StoreError, StoredBouquet};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Shared bouquet records.
    pub store: BouquetStore,
    /// Flower catalog used to build layouts.
    pub catalog: Arc<FlowerCatalog>,
    /// Card renderer for image requests.
    pub exporter: Arc<BouquetExporter>,
}

impl AppState {
    /// Create state from its parts.
    #[must_use]
    pub fn new(store: BouquetStore, catalog: FlowerCatalog, exporter: BouquetExporter) -> Self {
        Self {
            store,
            catalog: Arc::new(catalog),
            exporter: Arc::new(exporter),
        }
    }
}

/// Build the API router with health probes, request ids and tracing.
///
/// `/metrics` and CORS are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check endpoints (Kubernetes probes)
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health", get(health::readiness))
        .route("/api/bouquets", post(routes::create_bouquet))
        .route("/api/bouquets/{id}", get(routes::get_bouquet))
        .route("/api/bouquets/{id}/image.png", get(routes::bouquet_image))
        .route("/api/garden", get(routes::garden))
        .route("/api/catalog", get(routes::catalog))
        // Request ID for distributed tracing correlation
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        // Structured request tracing with timing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

//! # Digibouquet Server
//!
//! Persistence service for shared bouquets.

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Router,
};
use bouquet_core::FlowerCatalog;
use bouquet_export::{BouquetExporter, ExportConfig};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bouquet_server::{metrics, router, AppState, BouquetStore, ServerArgs, ServerConfig};

/// Build a CORS layer that allows the local front end dev servers.
fn build_cors_layer(port: u16) -> CorsLayer {
    let localhost_origins = [
        format!("http://localhost:{port}"),
        format!("http://127.0.0.1:{port}"),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(), // Vite
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ];

    let origins: Vec<HeaderValue> = localhost_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,bouquet_server=debug,tower_http=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output (recommended for production).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bouquet_server=debug,tower_http=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn load_catalog(config: &ServerConfig) -> anyhow::Result<FlowerCatalog> {
    let Some(path) = &config.catalog else {
        return Ok(FlowerCatalog::builtin());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read catalog {}: {e}", path.display()))?;
    let catalog = FlowerCatalog::from_json(&json)?;
    tracing::info!("Loaded {} flowers from {}", catalog.len(), path.display());
    Ok(catalog)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::from(ServerArgs::parse());

    let metrics_handle = metrics::init_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to initialize Prometheus metrics: {}", e))?;
    tracing::info!("Prometheus metrics initialized");

    let catalog = load_catalog(&config)?;

    let store = match &config.data_dir {
        Some(dir) => BouquetStore::with_data_dir(dir)?,
        None => {
            tracing::warn!("No data directory configured; shared bouquets are kept in memory");
            BouquetStore::new()
        }
    };
    metrics::set_stored_bouquets(store.len());

    let exporter = BouquetExporter::new(ExportConfig {
        asset_root: config.asset_root.clone(),
        ..ExportConfig::default()
    });
    if let Some(root) = &config.asset_root {
        tracing::info!("Rendering cards with assets from {}", root.display());
    }

    let state = AppState::new(store, catalog, exporter);

    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let app = router(state)
        .merge(metrics_router)
        .layer(build_cors_layer(config.addr.port()));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!("Digibouquet server listening on http://{}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Digibouquet server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Prometheus metrics endpoint.
#[tracing::instrument(name = "metrics", skip(handle))]
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

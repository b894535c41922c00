//! HTTP API for shared bouquets.

use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bouquet_core::{BouquetLayout, Composition, FlowerCatalog, Language, SharePayload};
use bouquet_export::{ExportError, ExportFormat};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::metrics;
use crate::store::{StoreError, StoredBouquet};
use crate::validation::{validate_composition, validate_share_id, ValidationError};
use crate::AppState;

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body or path failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No bouquet with this id.
    #[error("bouquet not found: {0}")]
    NotFound(String),
    /// The store could not save the record.
    #[error("storage failed: {0}")]
    Store(#[from] StoreError),
    /// The card could not be rendered.
    #[error("rendering failed: {0}")]
    Render(#[from] ExportError),
    /// A blocking task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Store(StoreError::Invalid(_)) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Render(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Body of `POST /api/bouquets`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBouquetRequest {
    /// The composition to share. Its mode may already carry a language marker.
    pub composition: Composition,
    /// Sharing language code; overrides any marker in the mode.
    #[serde(default)]
    pub lang: Option<String>,
}

/// Body returned after a bouquet is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedBouquet {
    /// Identifier for the share link.
    pub id: String,
}

/// A shared bouquet prepared for read-only viewing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BouquetView {
    /// Share identifier.
    pub id: String,
    /// Composition with a clean palette mode.
    pub composition: Composition,
    /// Language the bouquet was shared in.
    pub lang: Language,
    /// Server insertion time, milliseconds since the Unix epoch.
    pub stored_at: u64,
    /// Render plan for the card.
    pub layout: BouquetLayout,
}

/// One entry of the public garden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GardenEntry {
    /// Share identifier.
    pub id: String,
    /// Composition with a clean palette mode.
    pub composition: Composition,
    /// Language the bouquet was shared in.
    pub lang: Language,
    /// Server insertion time, milliseconds since the Unix epoch.
    pub stored_at: u64,
}

impl From<StoredBouquet> for GardenEntry {
    fn from(stored: StoredBouquet) -> Self {
        let shared = stored.payload.resolve();
        Self {
            id: stored.id.to_string(),
            composition: shared.composition,
            lang: shared.language,
            stored_at: stored.stored_at,
        }
    }
}

/// Store a new shared bouquet.
///
/// The record is saved with its language folded into the mode, e.g.
/// `"color&lang=ar"`.
#[tracing::instrument(name = "create_bouquet", skip(state, request))]
pub async fn create_bouquet(
    State(state): State<AppState>,
    Json(request): Json<CreateBouquetRequest>,
) -> ApiResult<(StatusCode, Json<CreatedBouquet>)> {
    let shared = SharePayload::from_stored(request.composition).resolve();
    let language = request
        .lang
        .as_deref()
        .map_or(shared.language, Language::from_code);

    if let Err(e) = validate_composition(&shared.composition) {
        metrics::record_validation_failure(e.kind());
        metrics::record_share(language.code(), false);
        return Err(e.into());
    }

    let payload = SharePayload::new(&shared.composition, language);
    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || store.insert(payload))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    metrics::record_share(language.code(), result.is_ok());
    let stored = result?;

    metrics::set_stored_bouquets(state.store.len());
    tracing::info!(id = %stored.id, lang = %language, "Bouquet shared");
    Ok((
        StatusCode::CREATED,
        Json(CreatedBouquet {
            id: stored.id.to_string(),
        }),
    ))
}

/// Fetch a shared bouquet with its render plan.
#[tracing::instrument(name = "get_bouquet", skip(state))]
pub async fn get_bouquet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BouquetView>> {
    let stored = lookup(&state, &id)?;
    let shared = stored.payload.resolve();
    let layout = BouquetLayout::compose(&shared.composition, &state.catalog, shared.language);
    Ok(Json(BouquetView {
        id: stored.id.to_string(),
        composition: shared.composition,
        lang: shared.language,
        stored_at: stored.stored_at,
        layout,
    }))
}

/// Render a shared bouquet's card as PNG.
#[tracing::instrument(name = "bouquet_image", skip(state))]
pub async fn bouquet_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let stored = lookup(&state, &id)?;
    let shared = stored.payload.resolve();
    let layout = BouquetLayout::compose(&shared.composition, &state.catalog, shared.language);

    let exporter = state.exporter.clone();
    let started = Instant::now();
    let bytes = tokio::task::spawn_blocking(move || exporter.render_to_png(&layout))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    metrics::record_image_rendered(
        ExportFormat::Png.extension(),
        started.elapsed().as_secs_f64(),
    );

    Ok((
        [
            (header::CONTENT_TYPE, ExportFormat::Png.mime_type()),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        bytes,
    )
        .into_response())
}

/// List every shared bouquet, newest first.
#[tracing::instrument(name = "garden", skip(state))]
pub async fn garden(State(state): State<AppState>) -> Json<Vec<GardenEntry>> {
    Json(
        state
            .store
            .list_newest_first()
            .into_iter()
            .map(GardenEntry::from)
            .collect(),
    )
}

/// The flower catalog used for layouts.
#[tracing::instrument(name = "catalog", skip(state))]
pub async fn catalog(State(state): State<AppState>) -> Json<FlowerCatalog> {
    Json(state.catalog.as_ref().clone())
}

fn lookup(state: &AppState, raw_id: &str) -> ApiResult<StoredBouquet> {
    let id = validate_share_id(raw_id).inspect_err(|e| {
        metrics::record_validation_failure(e.kind());
    })?;
    state
        .store
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(id.to_string()))
}

//! HTTP surface: routing and request handlers.

use std::path::Path;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderName, HeaderValue};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::ApiError;
use crate::models::CompressionRecord;
use crate::store::{StatsRecorder, StatsStore};

/// Maximum number of records returned by the stats listing.
const STATS_LIMIT: i64 = 100;

/// Multipart field name the upload is read from.
const UPLOAD_FIELD: &str = "file";

/// Fallback filename stem when the client sent no filename.
const DEFAULT_FILENAME: &str = "upload";

/// Shared per-process state. The store is the only shared mutable
/// collaborator; the production Mongo client inside it is pool-backed
/// and Sync.
pub struct AppState<S = StatsStore> {
    pub store: S,
}

/// Build the full application router: the `/api` surface plus CORS.
pub fn app<S: StatsRecorder>(state: Arc<AppState<S>>, config: &Config) -> Router {
    Router::new()
        .nest("/api", api_router(state))
        .layer(cors_layer(config))
}

/// The `/api`-prefixed routes.
pub fn api_router<S: StatsRecorder>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/compress", post(compress::<S>))
        .route("/stats", get(stats::<S>))
        .with_state(state)
}

/// CORS policy: every method and header; origins from the configured
/// allow-list, or any origin when none is configured.
fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(
            config
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        ))
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Image Compression API" }))
}

/// Convert an uploaded image to WebP, record the stats, and return the
/// encoded bytes as a downloadable attachment.
#[instrument(skip_all)]
async fn compress<S: StatsRecorder>(
    State(state): State<Arc<AppState<S>>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (filename, bytes) = read_upload(&mut multipart).await?;
    let original_size = bytes.len() as u64;

    // Decode/normalize/encode is CPU-bound; keep it off the async runtime.
    let transcoded = tokio::task::spawn_blocking(move || webpress_core::transcode_to_webp(&bytes))
        .await
        .map_err(|e| ApiError::Encoding(e.to_string()))??;
    let compressed_size = transcoded.webp.len() as u64;

    // Stats are written only after a successful transcode, so a failed
    // conversion never leaves a partial record behind.
    let record = state
        .store
        .record(
            &filename,
            original_size,
            compressed_size,
            transcoded.original_format,
        )
        .await
        .map_err(|e| ApiError::Persistence(e.to_string()))?;

    info!(
        filename = %record.original_filename,
        original_size,
        compressed_size,
        ratio = record.compression_ratio,
        "compressed image"
    );

    let disposition = format!("attachment; filename=\"{}.webp\"", file_stem(&filename));
    let headers = [
        (header::CONTENT_TYPE, "image/webp".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
        (
            HeaderName::from_static("x-original-size"),
            original_size.to_string(),
        ),
        (
            HeaderName::from_static("x-compressed-size"),
            compressed_size.to_string(),
        ),
        (
            HeaderName::from_static("x-compression-ratio"),
            format_ratio(record.compression_ratio),
        ),
        (
            HeaderName::from_static("x-original-format"),
            record.original_format.clone(),
        ),
    ];

    Ok((headers, transcoded.webp))
}

/// List the most recent conversions, newest first.
#[instrument(skip_all)]
async fn stats<S: StatsRecorder>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CompressionRecord>>, ApiError> {
    let records = state
        .store
        .list(STATS_LIMIT)
        .await
        .map_err(|e| ApiError::StatsUnavailable(e.to_string()))?;
    Ok(Json(records))
}

/// Pull the upload out of the multipart body's `file` field. Fields with
/// other names are skipped.
async fn read_upload(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .unwrap_or(DEFAULT_FILENAME)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ApiError::InvalidInput("empty upload".to_string()));
        }
        return Ok((filename, bytes));
    }
    Err(ApiError::InvalidInput("missing file field".to_string()))
}

/// Filename without its final extension, for the attachment name.
fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(DEFAULT_FILENAME)
}

/// Ratio header value with at least one decimal place, so an integral
/// ratio reads "50.0" rather than "50".
fn format_ratio(ratio: f64) -> String {
    format!("{ratio:?}")
}

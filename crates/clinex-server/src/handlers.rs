//! HTTP request handlers for the extraction service.
//!
//! Implements the health probe and the document upload endpoint using axum.

use crate::config::{ConfigError, ServerConfig};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clinex_domain::traits::LlmProvider;
use clinex_domain::ClinicalRecord;
use clinex_extractor::{DocumentUpload, Extractor, ExtractorError};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info_span, warn, Instrument};
use uuid::Uuid;

/// Multipart field carrying the uploaded document
pub const FILE_FIELD: &str = "file";

/// Shared application state
pub struct AppState<L: LlmProvider> {
    /// Extraction pipeline shared by all requests
    pub extractor: Arc<Extractor<L>>,
}

impl<L: LlmProvider> AppState<L> {
    /// Wrap an extractor for sharing across handlers
    pub fn new(extractor: Extractor<L>) -> Self {
        Self {
            extractor: Arc::new(extractor),
        }
    }
}

impl<L: LlmProvider> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            extractor: Arc::clone(&self.extractor),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests
    pub status: String,
    /// Routes served by this process
    pub endpoints: Vec<String>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable reason
    pub detail: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Pipeline failure
    Extraction(ExtractorError),
    /// No `file` field in the multipart body
    MissingFile,
    /// Malformed or oversized multipart body
    Multipart {
        /// Status chosen by axum for the failure
        status: StatusCode,
        /// Reason text
        message: String,
    },
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            AppError::Extraction(e) => match e {
                ExtractorError::EmptyUpload | ExtractorError::EmptyText => {
                    (StatusCode::BAD_REQUEST, e.to_string())
                }
                ExtractorError::InvalidJson { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Extraction failed: {}", e),
                ),
            },
            AppError::MissingFile => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Missing multipart field '{}'.", FILE_FIELD),
            ),
            AppError::Multipart { status, message } => {
                (*status, format!("Invalid multipart upload: {}", message))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();

        if status.is_server_error() {
            error!("Request failed ({}): {}", status, detail);
        } else {
            warn!("Rejected upload ({}): {}", status, detail);
        }

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

impl From<ExtractorError> for AppError {
    fn from(e: ExtractorError) -> Self {
        AppError::Extraction(e)
    }
}

impl From<MultipartRejection> for AppError {
    fn from(e: MultipartRejection) -> Self {
        AppError::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

/// GET / - Health probe
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        endpoints: vec!["/".to_string(), "/extract".to_string()],
    })
}

/// POST /extract - Extract a clinical record from an uploaded note
async fn extract_document<L>(
    State(state): State<AppState<L>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClinicalRecord>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let span = info_span!("extract", request_id = %Uuid::now_v7());

    async move {
        let mut multipart = multipart?;
        let upload = read_file_field(&mut multipart).await?;
        let record = state.extractor.extract_document(upload).await?;
        Ok::<_, AppError>(Json(record))
    }
    .instrument(span)
    .await
}

/// Pull the `file` field out of a multipart body, skipping any others
async fn read_file_field(multipart: &mut Multipart) -> Result<DocumentUpload, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        return Ok(DocumentUpload {
            bytes: bytes.to_vec(),
            filename,
            content_type,
        });
    }

    Err(AppError::MissingFile)
}

/// Create the axum router with all routes
pub fn create_router<L>(state: AppState<L>) -> Router
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    Router::new()
        .route("/", get(health))
        .route("/extract", post(extract_document::<L>))
        .with_state(state)
}

/// Cross-origin policy: listed origins only, any method and header, no credentials
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| ConfigError::Invalid(format!("invalid origin: {}", origin)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Create the router with CORS and the upload size limit applied
pub fn build_app<L>(state: AppState<L>, config: &ServerConfig) -> Result<Router, ConfigError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    Ok(create_router(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(&config.allowed_origins)?))
}

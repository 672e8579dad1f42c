//! HTTP JSON API and single-page client.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/` | Single-page client (Home, Documents, Chat, Health) |
//! | `GET`    | `/api/health` | Backend / storage / LLM status; 503 if any is unhealthy |
//! | `POST`   | `/api/documents/upload` | Multipart upload, field `file`, `.txt` only |
//! | `GET`    | `/api/documents` | List `{id, name, uploadedAt}` |
//! | `DELETE` | `/api/documents/{id}` | Delete a document |
//! | `POST`   | `/api/ask` | `{question, documentIds?}` → answer plus sources |
//!
//! # Error Contract
//!
//! Every failure is a JSON body `{"error": "<message>"}` with status 400,
//! 404, 413, or 500 (see [`AppError`]).
//!
//! # CORS
//!
//! The allowed origin is `server.frontend_url` (or `FRONTEND_URL`); any
//! origin when unset.

use axum::{
    extract::{
        multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, Multipart, Path,
        State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::Html,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::ask::{answer_question, AskRequest, AskResponse};
use crate::config::Config;
use crate::error::AppError;
use crate::health::{check_health, HealthReport};
use crate::ingest::is_text_file;
use crate::llm::{create_provider_or_disabled, CompletionProvider};
use crate::models::DocumentSummary;
use crate::store::{sanitize_name, DocumentStore};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<DocumentStore>,
    pub provider: Arc<dyn CompletionProvider>,
}

impl AppState {
    pub async fn new(config: &Config, provider: Arc<dyn CompletionProvider>) -> anyhow::Result<Self> {
        let store = DocumentStore::open(config).await?;
        Ok(Self {
            config: Arc::new(config.clone()),
            store: Arc::new(store),
            provider,
        })
    }
}

/// Starts the HTTP server with the provider named in `[llm]`.
///
/// Binds to `[server].bind` and runs until the process is terminated. A
/// provider that cannot be built (missing API key) is replaced by the
/// disabled provider so uploads and listing keep working.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let provider = create_provider_or_disabled(&config.llm);
    run_server_with_provider(config, provider).await
}

/// Like [`run_server`], but with a caller-supplied completion provider.
pub async fn run_server_with_provider(
    config: &Config,
    provider: Arc<dyn CompletionProvider>,
) -> anyhow::Result<()> {
    let state = AppState::new(config, provider).await?;
    let documents = state.store.len().await;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        documents,
        "server listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the full router: API under `/api`, client page at `/`.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handle_health))
        .route("/documents", get(handle_list))
        .route("/documents/upload", post(handle_upload))
        .route("/documents/{id}", delete(handle_delete))
        .route("/ask", post(handle_ask));

    Router::new()
        .route("/", get(handle_index))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
        .layer(cors_layer(state.config.server.frontend_url.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let origin = match frontend_url.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(_)) => {
            tracing::warn!("invalid frontend_url, allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct UploadResponse {
    message: String,
    document: DocumentSummary,
}

// ============ GET / ============

async fn handle_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

// ============ GET /api/health ============

async fn handle_health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = check_health(state.store.documents_file(), state.provider.as_ref()).await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

// ============ POST /api/documents/upload ============

/// Accepts a single `file` field holding UTF-8 text with a `.txt` name.
async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let limit = state.config.server.max_upload_bytes;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, limit))?
    {
        if field.name() != Some("file") {
            continue;
        }
        // a `file` field without a filename is a plain form value, not an upload
        let Some(name) = field
            .file_name()
            .filter(|n| !n.trim().is_empty())
            .map(sanitize_name)
        else {
            continue;
        };
        let bytes = field.bytes().await.map_err(|e| upload_error(e, limit))?;
        upload = Some((name, bytes));
        break;
    }

    let (name, bytes) = upload.ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;
    if !is_text_file(&name) {
        return Err(AppError::BadRequest("Only .txt files are allowed!".into()));
    }
    let content = String::from_utf8(bytes.to_vec())
        .map_err(|_| AppError::BadRequest("File must be UTF-8 text".into()))?;

    let filename = state
        .store
        .save_upload(&name, &bytes)
        .await
        .map_err(|e| AppError::from_store(e, "Failed to upload document"))?;

    let document = state
        .store
        .add(&name, &filename, content)
        .await
        .map_err(|e| AppError::from_store(e, "Failed to upload document"))?;

    Ok(Json(UploadResponse {
        message: "Document uploaded successfully".to_string(),
        document,
    }))
}

fn upload_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("File too large (limit {} bytes)", limit))
    } else {
        AppError::BadRequest(format!("Invalid upload: {}", err.body_text()))
    }
}

// ============ GET /api/documents ============

async fn handle_list(State(state): State<AppState>) -> Json<Vec<DocumentSummary>> {
    Json(state.store.list().await)
}

// ============ DELETE /api/documents/{id} ============

async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .store
        .remove(&id)
        .await
        .map_err(|e| AppError::from_store(e, "Failed to delete document"))?;

    Ok(Json(MessageResponse {
        message: "Document deleted successfully".to_string(),
    }))
}

// ============ POST /api/ask ============

async fn handle_ask(
    State(state): State<AppState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let response = answer_question(
        &state.store,
        state.provider.as_ref(),
        &request,
        state.config.retrieval.max_sources,
    )
    .await?;

    Ok(Json(response))
}

//! HTTP surface for DocuMind.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /api/upload` – Accept a multipart `file` field holding a PDF, extract and store its
//!   text, and return `{ "summary": string }`.
//! - `POST /api/ask` – Accept a `question` form field (urlencoded or multipart) and return
//!   `{ "answer": string }` grounded in the stored document.
//! - `GET /api/metrics` – Observe ingestion and question counters.
//! - `GET /api/commands` – Machine-readable command catalog for quick discovery by tools.
//!
//! When `FRONTEND_DIST_DIR` is configured, every other path is served from that directory with
//! `index.html` as the fallback. Errors are returned as `{ "detail": string }`.

use crate::config::{AllowedOrigin, Config};
use crate::metrics::MetricsSnapshot;
use crate::processing::{DocumentApi, ProcessingError};
use crate::store::SessionId;
use async_trait::async_trait;
use axum::{
    Form, Json, Router,
    extract::{
        DefaultBodyLimit, FromRequest, Multipart, Request, State, multipart::MultipartError,
    },
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use uuid::Uuid;

const UPLOAD_TOO_LARGE_MESSAGE: &str = "Request body exceeds the upload size limit";

/// Build the HTTP router exposing the upload/ask API surface.
pub fn create_router<S>(service: Arc<S>, config: &Config) -> Router
where
    S: DocumentApi + 'static,
{
    let api = Router::new()
        .route("/api/upload", post(upload_document::<S>))
        .route("/api/ask", post(ask_question::<S>))
        .route("/api/metrics", get(get_metrics::<S>))
        .route("/api/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(service);

    let router = match config.frontend_dist_dir.as_deref() {
        Some(dir) => {
            let index = Path::new(dir).join("index.html");
            api.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => api,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origin))
}

/// Cross-origin policy for the configured frontend origin.
///
/// Credentials are only allowed with an explicit origin; wildcard origins cannot carry them.
fn cors_layer(origin: &AllowedOrigin) -> CorsLayer {
    match origin {
        AllowedOrigin::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        AllowedOrigin::Exact(value) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(value.clone()))
            .allow_credentials(true)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request()),
    }
}

/// Success response for `POST /api/upload`.
#[derive(Serialize)]
struct UploadResponse {
    summary: String,
}

/// Extract, store, and summarize an uploaded PDF.
async fn upload_document<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError>
where
    S: DocumentApi,
{
    let request_id = Uuid::new_v4();
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await?.to_vec();
            upload = Some((filename, data));
        } else {
            field.bytes().await?;
        }
    }

    let (filename, data) = upload.ok_or(AppError::MissingField("file"))?;
    tracing::info!(%request_id, filename = %filename, bytes = data.len(), "Upload received");

    let outcome = service
        .ingest(&SessionId::shared(), data, &filename)
        .await
        .inspect_err(|error| tracing::warn!(%request_id, error = %error, "Upload failed"))?;

    tracing::info!(%request_id, "Upload request completed");
    Ok(Json(UploadResponse {
        summary: outcome.summary,
    }))
}

/// Success response for `POST /api/ask`.
#[derive(Serialize)]
struct AskResponse {
    answer: String,
}

/// Answer a question grounded in the stored document.
async fn ask_question<S>(
    State(service): State<Arc<S>>,
    QuestionForm { question }: QuestionForm,
) -> Result<Json<AskResponse>, AppError>
where
    S: DocumentApi,
{
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, question_chars = question.chars().count(), "Question received");

    let outcome = service
        .ask(&SessionId::shared(), &question)
        .await
        .inspect_err(|error| tracing::warn!(%request_id, error = %error, "Question failed"))?;

    tracing::info!(%request_id, "Ask request completed");
    Ok(Json(AskResponse {
        answer: outcome.answer,
    }))
}

#[derive(Deserialize)]
struct QuestionFields {
    #[serde(default)]
    question: Option<String>,
}

/// `question` form field accepted as either urlencoded or multipart form data.
struct QuestionForm {
    question: String,
}

#[async_trait]
impl<S> FromRequest<S> for QuestionForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        let question = if is_multipart {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| AppError::Rejected {
                    status: rejection.status(),
                    message: rejection.body_text(),
                })?;
            let mut question = None;
            while let Some(field) = multipart.next_field().await? {
                if field.name() == Some("question") {
                    question = Some(field.text().await?);
                } else {
                    field.bytes().await?;
                }
            }
            question
        } else {
            let Form(fields) = Form::<QuestionFields>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::Rejected {
                    status: rejection.status(),
                    message: rejection.body_text(),
                })?;
            fields.question
        };

        question
            .filter(|question| !question.is_empty())
            .map(|question| Self { question })
            .ok_or(AppError::MissingField("question"))
    }
}

/// Return the service counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: DocumentApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    input: &'static str,
}

/// Response body for `GET /api/commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery by tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "upload",
                method: "POST",
                path: "/api/upload",
                description: "Upload a PDF, replace the stored document, and return { \"summary\": string } with 3-5 bullet points.",
                input: "multipart/form-data with a `file` field",
            },
            CommandDescriptor {
                name: "ask",
                method: "POST",
                path: "/api/ask",
                description: "Answer a question using only the most recently uploaded document. Returns { \"answer\": string }.",
                input: "form field `question` (urlencoded or multipart)",
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/api/metrics",
                description: "Return ingestion and question counters.",
                input: "none",
            },
        ],
    })
}

/// Error type converted into `{ "detail": string }` responses.
enum AppError {
    Processing(ProcessingError),
    Rejected { status: StatusCode, message: String },
    MissingField(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Processing(error) if error.is_client_error() => {
                (StatusCode::BAD_REQUEST, error.to_string())
            }
            Self::Processing(error) => (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
            Self::Rejected { status, message } => (status, message),
            Self::MissingField(name) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Missing form field: {name}"),
            ),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<ProcessingError> for AppError {
    fn from(inner: ProcessingError) -> Self {
        Self::Processing(inner)
    }
}

impl From<MultipartError> for AppError {
    fn from(error: MultipartError) -> Self {
        let status = error.status();
        let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
            UPLOAD_TOO_LARGE_MESSAGE.to_string()
        } else {
            error.body_text()
        };
        Self::Rejected { status, message }
    }
}

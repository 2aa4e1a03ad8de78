use std::env;
use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use duplex_bus::consumer::{Disposition, run_consumer};
use duplex_core::models::artifact::ArtifactKind;
use duplex_core::models::messages::{GeneratorReply, RenderCallback, RenderJob};
use duplex_generator::error::GeneratorServiceError;
use duplex_generator::records::FileRecord;
use duplex_generator::render::{KindRenderer, PdfRenderer, SheetRenderer};
use duplex_generator::service::FileService;

/// Process configuration, read once at startup. The same binary serves both
/// kinds; `GENERATOR_KIND` picks which one this instance renders.
#[derive(Debug, Clone)]
struct GeneratorConfig {
    kind: ArtifactKind,
    listen_addr: String,
    bucket: String,
    submission_queue_url: String,
    callback_queue_url: String,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl GeneratorConfig {
    fn from_env() -> eyre::Result<Self> {
        let kind = ArtifactKind::from_str(&var_or("GENERATOR_KIND", "pdf"))
            .map_err(|e| eyre::eyre!("GENERATOR_KIND: {e}"))?;
        Ok(Self {
            kind,
            listen_addr: var_or("GENERATOR_LISTEN_ADDR", "0.0.0.0:9999"),
            bucket: var_or("GENERATOR_BUCKET", "duplex-files"),
            submission_queue_url: var_or("GENERATOR_SUBMISSION_QUEUE_URL", ""),
            callback_queue_url: var_or("GENERATOR_CALLBACK_QUEUE_URL", ""),
        })
    }
}

#[derive(Clone)]
struct AppState {
    service: FileService<KindRenderer>,
}

#[derive(Debug)]
enum GenApiError {
    NotFound(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for GenApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            GenApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            GenApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<GeneratorServiceError> for GenApiError {
    fn from(e: GeneratorServiceError) -> Self {
        match e {
            GeneratorServiceError::FileNotFound { .. } => GenApiError::NotFound(e.to_string()),
            other => GenApiError::Internal(other.to_string()),
        }
    }
}

/// Blocking render RPC. Always answers 200; render failures are carried in
/// the reply's `failed` flag so the caller can reconcile them.
async fn render(
    State(state): State<AppState>,
    Json(job): Json<RenderJob>,
) -> Json<GeneratorReply> {
    let result = state.service.create(&job).await;
    Json(state.service.reply(&job, &result))
}

async fn delete_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<FileRecord>, GenApiError> {
    let record = state.service.delete(&file_id).await?;
    Ok(Json(record))
}

async fn file_content(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse, GenApiError> {
    let body = state.service.content(&file_id).await?;
    Ok((
        [(header::CONTENT_TYPE, state.service.kind().content_type())],
        body,
    ))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Background consumer for the submission queue: render each job and post
/// the callback. A callback that cannot be sent leaves the job for
/// redelivery; the orchestrator's terminal guard absorbs the re-render.
fn spawn_submission_consumer(
    sqs: aws_sdk_sqs::Client,
    config: GeneratorConfig,
    service: FileService<KindRenderer>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let queue_url = config.submission_queue_url.clone();
    tokio::spawn(run_consumer::<RenderJob, _, _>(
        sqs.clone(),
        queue_url,
        shutdown,
        move |job: RenderJob| {
            let sqs = sqs.clone();
            let service = service.clone();
            let config = config.clone();
            async move {
                let result = service.create(&job).await;
                let reply = service.reply(&job, &result);
                let callback = RenderCallback::from_reply(config.kind, reply);

                match duplex_bus::queue::send_message(&sqs, &config.callback_queue_url, &callback)
                    .await
                {
                    Ok(()) => Disposition::Handled,
                    Err(err) => {
                        tracing::error!(
                            error = %err,
                            request_id = %job.request_id,
                            "failed to send render callback, leaving job for redelivery"
                        );
                        Disposition::Retry
                    }
                }
            }
        },
    ))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = GeneratorConfig::from_env()?;

    let s3 = duplex_storage::client::build_client().await;
    let sqs = duplex_bus::client::build_sqs_client().await;

    let renderer = match config.kind {
        ArtifactKind::Pdf => KindRenderer::Pdf(PdfRenderer),
        ArtifactKind::Spreadsheet => KindRenderer::Sheet(SheetRenderer),
    };
    let service = FileService::new(s3, config.bucket.clone(), config.kind, renderer);

    let shutdown = CancellationToken::new();
    let consumer_handle = spawn_submission_consumer(
        sqs,
        config.clone(),
        service.clone(),
        shutdown.clone(),
    );

    let seg = config.kind.path_segment();
    let app = Router::new()
        .route("/health", get(health_check))
        .route(&format!("/{seg}"), post(render))
        .route(&format!("/{seg}/{{file_id}}"), delete(delete_file))
        .route(&format!("/{seg}/{{file_id}}/content"), get(file_content))
        .with_state(AppState { service });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, kind = %config.kind, "generator listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    shutdown.cancel();
    let _ = consumer_handle.await;

    Ok(())
}

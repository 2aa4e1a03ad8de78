use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use duplex_orchestrator::config::OrchestratorConfig;
use duplex_orchestrator::content::{BlobFetcher, PerKindFetcher, RpcFetcher};
use duplex_orchestrator::generators::{GeneratorEndpoints, HttpGeneratorClient};
use duplex_orchestrator::notify::EmailQueueNotifier;
use duplex_orchestrator::pool::WorkerPool;
use duplex_orchestrator::publish::SnsPublisher;
use duplex_orchestrator::service::ReportService;
use duplex_store::s3::S3RequestStore;

mod config;
mod consumer;
mod error;
mod routes;
mod state;

use config::ApiConfig;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ApiConfig::from_env();

    // Every dependency is built exactly once here and injected; nothing
    // below constructs its own client.
    let s3 = duplex_storage::client::build_client().await;
    let sns = duplex_bus::client::build_sns_client().await;
    let sqs = duplex_bus::client::build_sqs_client().await;
    let http = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(2))
        .build()?;

    let store = S3RequestStore::new(s3.clone(), &config.bucket);
    let generators = HttpGeneratorClient::new(
        http,
        GeneratorEndpoints {
            pdf: config.pdf_url.clone(),
            spreadsheet: config.spreadsheet_url.clone(),
        },
        config.rpc_timeout,
    );
    let notifier = EmailQueueNotifier::new(
        sqs.clone(),
        &config.email_queue_url,
        &config.email_recipient,
    );
    let content = PerKindFetcher::new(
        BlobFetcher::new(s3),
        RpcFetcher::new(generators.clone()),
    );
    let publisher = SnsPublisher::new(sns, &config.submission_topic_arn);
    let pool = Arc::new(WorkerPool::new(config.pool_workers, config.pool_queue_depth));

    let service = ReportService::new(
        store,
        generators,
        notifier,
        content,
        publisher,
        Arc::clone(&pool),
        OrchestratorConfig {
            join_timeout: config.join_timeout,
        },
    );

    let shutdown = CancellationToken::new();
    let consumer_handle = consumer::spawn_callback_consumer(
        sqs,
        config.callback_queue_url.clone(),
        service.clone(),
        shutdown.clone(),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/reports", get(routes::reports::list_reports))
        .route("/reports/sync", post(routes::reports::submit_sync))
        .route("/reports/async", post(routes::reports::submit_async))
        .route(
            "/reports/{id}/files/{kind}",
            get(routes::reports::download_file),
        )
        .route("/reports/{id}", delete(routes::reports::delete_report))
        .layer(cors)
        .with_state(AppState { service });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "orchestrator listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    // Stop the consumer and let the pool drain what it already accepted.
    shutdown.cancel();
    pool.shutdown();
    let _ = consumer_handle.await;

    Ok(())
}

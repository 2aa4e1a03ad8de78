use duplex_orchestrator::content::{BlobFetcher, PerKindFetcher, RpcFetcher};
use duplex_orchestrator::generators::HttpGeneratorClient;
use duplex_orchestrator::notify::EmailQueueNotifier;
use duplex_orchestrator::publish::SnsPublisher;
use duplex_orchestrator::service::ReportService;
use duplex_store::s3::S3RequestStore;

/// The fully wired orchestrator: S3-backed store, HTTP generator client,
/// blob/RPC content fetchers, SNS submission publisher, SQS email notifier.
pub type Orchestrator = ReportService<
    S3RequestStore,
    HttpGeneratorClient,
    EmailQueueNotifier,
    PerKindFetcher<BlobFetcher, RpcFetcher<HttpGeneratorClient>>,
    SnsPublisher,
>;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub service: Orchestrator,
}

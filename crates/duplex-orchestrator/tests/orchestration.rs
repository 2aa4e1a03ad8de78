//! End-to-end orchestration behavior over the in-memory store and stub
//! collaborators: fan-out/join, deadline expiry, callback-order
//! independence, idempotent reconciliation, and the delete/callback race.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;

use duplex_bus::error::BusError;
use duplex_core::models::artifact::{ArtifactKind, ArtifactStatus};
use duplex_core::models::messages::{
    FileDescriptor, GeneratorReply, ReconcileOutcome, RenderJob,
};
use duplex_core::models::request::{ReportRequest, RequestId, RequestStatus};
use duplex_orchestrator::config::OrchestratorConfig;
use duplex_orchestrator::content::{PerKindFetcher, RpcFetcher};
use duplex_orchestrator::error::{GeneratorError, OrchestratorError};
use duplex_orchestrator::generators::GeneratorClient;
use duplex_orchestrator::notify::Notifier;
use duplex_orchestrator::pool::WorkerPool;
use duplex_orchestrator::publish::SubmissionPublisher;
use duplex_orchestrator::service::{NewReport, ReconcileStatus, ReportService};
use duplex_store::RequestStore;
use duplex_store::memory::MemoryStore;

#[derive(Clone)]
enum Behavior {
    Succeed,
    Fail,
    Error,
    /// Sleep before succeeding — drives the join past its deadline.
    Delay(Duration),
}

#[derive(Clone)]
struct StubGenerators {
    behaviors: Arc<Mutex<HashMap<ArtifactKind, Behavior>>>,
    content: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    deleted: Arc<Mutex<Vec<(ArtifactKind, String)>>>,
    renders: Arc<AtomicUsize>,
}

impl StubGenerators {
    fn new() -> Self {
        Self {
            behaviors: Arc::new(Mutex::new(HashMap::new())),
            content: Arc::new(Mutex::new(HashMap::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            renders: Arc::new(AtomicUsize::new(0)),
        }
    }

    async fn set(&self, kind: ArtifactKind, behavior: Behavior) {
        self.behaviors.lock().await.insert(kind, behavior);
    }

    async fn put_content(&self, file_id: &str, bytes: &[u8]) {
        self.content
            .lock()
            .await
            .insert(file_id.to_string(), bytes.to_vec());
    }

    fn file_id(kind: ArtifactKind, request_id: &RequestId) -> String {
        format!("File-{kind}-{request_id}")
    }

    fn success_reply(kind: ArtifactKind, request_id: RequestId) -> GeneratorReply {
        let file_id = Self::file_id(kind, &request_id);
        GeneratorReply::success(
            request_id,
            FileDescriptor {
                file_location: format!("bucket1/{file_id}"),
                file_size: 100,
                file_id,
            },
        )
    }
}

impl GeneratorClient for StubGenerators {
    async fn render(
        &self,
        kind: ArtifactKind,
        job: &RenderJob,
    ) -> Result<GeneratorReply, GeneratorError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        let behavior = self
            .behaviors
            .lock()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or(Behavior::Succeed);
        match behavior {
            Behavior::Succeed => Ok(Self::success_reply(kind, job.request_id.clone())),
            Behavior::Fail => Ok(GeneratorReply::failure(job.request_id.clone())),
            Behavior::Error => Err(GeneratorError::Http("connection refused".to_string())),
            Behavior::Delay(delay) => {
                tokio::time::sleep(delay).await;
                Ok(Self::success_reply(kind, job.request_id.clone()))
            }
        }
    }

    async fn delete(&self, kind: ArtifactKind, file_id: &str) -> Result<(), GeneratorError> {
        self.deleted.lock().await.push((kind, file_id.to_string()));
        Ok(())
    }

    async fn fetch_content(
        &self,
        _kind: ArtifactKind,
        file_id: &str,
    ) -> Result<Vec<u8>, GeneratorError> {
        self.content
            .lock()
            .await
            .get(file_id)
            .cloned()
            .ok_or(GeneratorError::Status {
                status: 404,
                body: String::new(),
            })
    }
}

#[derive(Clone)]
struct CountingNotifier {
    sent: Arc<AtomicUsize>,
}

impl CountingNotifier {
    fn new() -> Self {
        Self {
            sent: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

impl Notifier for CountingNotifier {
    async fn artifact_reconciled(
        &self,
        _request: &ReportRequest,
        _kind: ArtifactKind,
    ) -> Result<(), BusError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone)]
struct StubPublisher {
    published: Arc<Mutex<Vec<RenderJob>>>,
}

impl StubPublisher {
    fn new() -> Self {
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl SubmissionPublisher for StubPublisher {
    async fn publish(&self, job: &RenderJob) -> Result<(), BusError> {
        self.published.lock().await.push(job.clone());
        Ok(())
    }
}

type TestService = ReportService<
    MemoryStore,
    StubGenerators,
    CountingNotifier,
    PerKindFetcher<RpcFetcher<StubGenerators>, RpcFetcher<StubGenerators>>,
    StubPublisher,
>;

struct Harness {
    service: TestService,
    store: MemoryStore,
    generators: StubGenerators,
    notifier: CountingNotifier,
    publisher: StubPublisher,
}

fn harness_with(config: OrchestratorConfig) -> Harness {
    let store = MemoryStore::new();
    let generators = StubGenerators::new();
    let notifier = CountingNotifier::new();
    let publisher = StubPublisher::new();
    let content = PerKindFetcher::new(
        RpcFetcher::new(generators.clone()),
        RpcFetcher::new(generators.clone()),
    );
    let pool = Arc::new(WorkerPool::new(4, 16));
    let service = ReportService::new(
        store.clone(),
        generators.clone(),
        notifier.clone(),
        content,
        publisher.clone(),
        pool,
        config,
    );
    Harness {
        service,
        store,
        generators,
        notifier,
        publisher,
    }
}

fn harness() -> Harness {
    harness_with(OrchestratorConfig {
        join_timeout: Duration::from_secs(5),
    })
}

fn new_report(submitter: &str) -> NewReport {
    NewReport {
        submitter: submitter.to_string(),
        description: "quarterly numbers".to_string(),
    }
}

fn success_outcome(file_id: &str) -> ReconcileOutcome {
    ReconcileOutcome::Success(FileDescriptor {
        file_id: file_id.to_string(),
        file_location: format!("bucket1/{file_id}"),
        file_size: 100,
    })
}

#[tokio::test]
async fn sync_submission_completes_both_artifacts() {
    let h = harness();
    let view = h.service.submit_sync(new_report("alice")).await.unwrap();

    assert_eq!(view.status, RequestStatus::Completed);
    for artifact in &view.artifacts {
        assert_eq!(artifact.status, ArtifactStatus::Completed);
        assert_eq!(artifact.file_size, Some(100));
        assert!(artifact.file_location.as_deref().unwrap().starts_with("bucket1/"));
    }
    // One reconciliation notification per artifact.
    assert_eq!(h.notifier.count(), 2);
}

#[tokio::test]
async fn sync_submission_never_leaves_a_pending_artifact() {
    let h = harness();
    h.generators.set(ArtifactKind::Pdf, Behavior::Error).await;
    h.generators.set(ArtifactKind::Spreadsheet, Behavior::Fail).await;

    let view = h.service.submit_sync(new_report("alice")).await.unwrap();

    assert_eq!(view.status, RequestStatus::Failed);
    for artifact in &view.artifacts {
        assert_eq!(artifact.status, ArtifactStatus::Failed);
        assert!(artifact.file_id.is_none());
    }
}

#[tokio::test]
async fn generator_failure_does_not_discard_the_other_success() {
    let h = harness();
    h.generators.set(ArtifactKind::Spreadsheet, Behavior::Error).await;

    let view = h.service.submit_sync(new_report("alice")).await.unwrap();

    assert_eq!(view.status, RequestStatus::Failed);
    let pdf = view
        .artifacts
        .iter()
        .find(|a| a.kind == ArtifactKind::Pdf)
        .unwrap();
    assert_eq!(pdf.status, ArtifactStatus::Completed);
    assert_eq!(pdf.file_size, Some(100));
    let sheet = view
        .artifacts
        .iter()
        .find(|a| a.kind == ArtifactKind::Spreadsheet)
        .unwrap();
    assert_eq!(sheet.status, ArtifactStatus::Failed);
}

#[tokio::test]
async fn join_deadline_fails_the_slow_artifact_and_still_returns() {
    let h = harness_with(OrchestratorConfig {
        join_timeout: Duration::from_millis(100),
    });
    h.generators
        .set(ArtifactKind::Spreadsheet, Behavior::Delay(Duration::from_millis(500)))
        .await;

    let view = h.service.submit_sync(new_report("alice")).await.unwrap();

    assert_eq!(view.status, RequestStatus::Failed);
    let pdf = view
        .artifacts
        .iter()
        .find(|a| a.kind == ArtifactKind::Pdf)
        .unwrap();
    assert_eq!(pdf.status, ArtifactStatus::Completed);
    let sheet = view
        .artifacts
        .iter()
        .find(|a| a.kind == ArtifactKind::Spreadsheet)
        .unwrap();
    assert_eq!(sheet.status, ArtifactStatus::Failed);

    // The in-flight render eventually reconciles its success, which the
    // terminal guard must suppress.
    tokio::time::sleep(Duration::from_millis(600)).await;
    let stored = h.store.get(&view.request_id).await.unwrap().request;
    assert_eq!(
        stored.artifact(ArtifactKind::Spreadsheet).status,
        ArtifactStatus::Failed
    );
}

#[tokio::test]
async fn async_submission_returns_pending_and_publishes_once() {
    let h = harness();
    let view = h.service.submit_async(new_report("alice")).await.unwrap();

    assert_eq!(view.status, RequestStatus::Pending);
    for artifact in &view.artifacts {
        assert_eq!(artifact.status, ArtifactStatus::Pending);
    }
    // No render RPC on the async path.
    assert_eq!(h.generators.renders.load(Ordering::SeqCst), 0);

    let published = h.publisher.published.lock().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].request_id, view.request_id);
    assert_eq!(published[0].submitter, "alice");
}

#[tokio::test]
async fn callbacks_complete_the_request_in_either_order() {
    for flip in [false, true] {
        let h = harness();
        let view = h.service.submit_async(new_report("alice")).await.unwrap();

        let mut order = [ArtifactKind::Pdf, ArtifactKind::Spreadsheet];
        if flip {
            order.reverse();
        }
        for (i, kind) in order.into_iter().enumerate() {
            let status = h
                .service
                .reconcile(&view.request_id, kind, success_outcome(&format!("F{i}")))
                .await
                .unwrap();
            assert_eq!(status, ReconcileStatus::Applied);
        }

        let stored = h.store.get(&view.request_id).await.unwrap().request;
        assert_eq!(stored.status(), RequestStatus::Completed);
    }
}

#[tokio::test]
async fn duplicate_callback_is_a_noop_and_sends_one_email() {
    let h = harness();
    let view = h.service.submit_async(new_report("alice")).await.unwrap();

    let first = h
        .service
        .reconcile(&view.request_id, ArtifactKind::Pdf, success_outcome("F1"))
        .await
        .unwrap();
    let second = h
        .service
        .reconcile(&view.request_id, ArtifactKind::Pdf, success_outcome("F1"))
        .await
        .unwrap();

    assert_eq!(first, ReconcileStatus::Applied);
    assert_eq!(second, ReconcileStatus::AlreadyTerminal);
    assert_eq!(h.notifier.count(), 1);
}

#[tokio::test]
async fn conflicting_callback_keeps_the_stored_descriptor() {
    let h = harness();
    let view = h.service.submit_async(new_report("alice")).await.unwrap();

    h.service
        .reconcile(&view.request_id, ArtifactKind::Pdf, success_outcome("F1"))
        .await
        .unwrap();
    let status = h
        .service
        .reconcile(&view.request_id, ArtifactKind::Pdf, ReconcileOutcome::Failure)
        .await
        .unwrap();

    assert_eq!(status, ReconcileStatus::AlreadyTerminal);
    let stored = h.store.get(&view.request_id).await.unwrap().request;
    let pdf = stored.artifact(ArtifactKind::Pdf);
    assert_eq!(pdf.status, ArtifactStatus::Completed);
    assert_eq!(pdf.file_id.as_deref(), Some("F1"));
}

#[tokio::test]
async fn retrieval_before_completion_is_not_ready() {
    let h = harness();
    let view = h.service.submit_async(new_report("alice")).await.unwrap();

    let err = h
        .service
        .file_body(&view.request_id, ArtifactKind::Pdf)
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::ArtifactNotReady { .. }));
}

#[tokio::test]
async fn retrieval_after_completion_returns_the_stored_bytes() {
    let h = harness();
    let view = h.service.submit_async(new_report("alice")).await.unwrap();

    h.generators.put_content("F1", b"%PDF-1.4 report").await;
    h.service
        .reconcile(&view.request_id, ArtifactKind::Pdf, success_outcome("F1"))
        .await
        .unwrap();

    let body = h
        .service
        .file_body(&view.request_id, ArtifactKind::Pdf)
        .await
        .unwrap();
    assert_eq!(body, b"%PDF-1.4 report");
}

#[tokio::test]
async fn retrieval_of_unknown_request_is_not_found() {
    let h = harness();
    let err = h
        .service
        .file_body(&"Req-missing".into(), ArtifactKind::Pdf)
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::RequestNotFound { .. }));
}

#[tokio::test]
async fn delete_releases_generator_copies_and_drops_the_record() {
    let h = harness();
    let view = h.service.submit_sync(new_report("alice")).await.unwrap();

    h.service.delete(&view.request_id).await.unwrap();

    assert!(matches!(
        h.store.get(&view.request_id).await,
        Err(duplex_store::error::StoreError::NotFound { .. })
    ));

    // Remote deletes are fire-and-forget through the pool; give them a beat.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let deleted = h.generators.deleted.lock().await;
    assert_eq!(deleted.len(), 2);
}

#[tokio::test]
async fn late_callback_after_delete_is_a_safe_noop() {
    let h = harness();
    let view = h.service.submit_async(new_report("alice")).await.unwrap();

    h.service.delete(&view.request_id).await.unwrap();

    let status = h
        .service
        .reconcile(&view.request_id, ArtifactKind::Pdf, success_outcome("F1"))
        .await
        .unwrap();
    assert_eq!(status, ReconcileStatus::RequestGone);
    assert_eq!(h.notifier.count(), 0);
}

#[tokio::test]
async fn deleting_an_unknown_request_is_not_found() {
    let h = harness();
    let err = h.service.delete(&"Req-missing".into()).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::RequestNotFound { .. }));
}

#[tokio::test]
async fn list_reflects_every_request() {
    let h = harness();
    h.service.submit_async(new_report("alice")).await.unwrap();
    h.service.submit_sync(new_report("bob")).await.unwrap();

    let views = h.service.list().await.unwrap();
    assert_eq!(views.len(), 2);
}

#[tokio::test]
async fn saturated_pool_runs_jobs_on_the_caller_without_dropping_any() {
    let pool = Arc::new(WorkerPool::new(1, 1));
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..20 {
        let counter = Arc::clone(&counter);
        pool.dispatch(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await;
    }

    // Whatever ran on the caller is already counted; wait out the queued rest.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 20);
}

//! The report orchestrator.
//!
//! Owns submission (both execution modes), reconciliation, retrieval,
//! deletion, and listing. All dependencies are constructed once at startup
//! and injected; all request mutation flows through the store's
//! compare-and-swap boundary.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::oneshot;
use tokio::time::{Instant, timeout_at};

use duplex_core::models::artifact::{ArtifactKind, ArtifactStatus, Transition};
use duplex_core::models::messages::{ReconcileOutcome, RenderJob};
use duplex_core::models::request::{ReportRequest, RequestId};
use duplex_store::error::StoreError;
use duplex_store::RequestStore;

use crate::config::OrchestratorConfig;
use crate::content::ContentFetcher;
use crate::error::OrchestratorError;
use crate::generators::GeneratorClient;
use crate::notify::Notifier;
use crate::pool::WorkerPool;
use crate::publish::SubmissionPublisher;
use crate::views::ReportView;

/// Caller-supplied submission fields.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReport {
    pub submitter: String,
    pub description: String,
}

/// What a reconciliation call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStatus {
    /// The artifact moved to a terminal state and the write committed.
    Applied,
    /// The artifact was already terminal; nothing written, no notification.
    AlreadyTerminal,
    /// The request no longer exists — deletion raced a late callback. A
    /// benign no-op, never an error.
    RequestGone,
}

/// Upper bound on compare-and-swap retries inside one reconciliation. Every
/// conflict means some other writer committed, so hitting this means the
/// record is churning far beyond anything two artifacts can produce.
const RECONCILE_MAX_ATTEMPTS: usize = 10;

pub struct ReportService<S, G, N, C, P> {
    inner: Arc<Inner<S, G, N, C, P>>,
    pool: Arc<WorkerPool>,
}

impl<S, G, N, C, P> Clone for ReportService<S, G, N, C, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            pool: Arc::clone(&self.pool),
        }
    }
}

struct Inner<S, G, N, C, P> {
    store: S,
    generators: G,
    notifier: N,
    content: C,
    publisher: P,
    config: OrchestratorConfig,
}

impl<S, G, N, C, P> ReportService<S, G, N, C, P>
where
    S: RequestStore,
    G: GeneratorClient,
    N: Notifier,
    C: ContentFetcher,
    P: SubmissionPublisher,
{
    pub fn new(
        store: S,
        generators: G,
        notifier: N,
        content: C,
        publisher: P,
        pool: Arc<WorkerPool>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                generators,
                notifier,
                content,
                publisher,
                config,
            }),
            pool,
        }
    }

    /// Synchronous submission: persist pending, fan out both render calls
    /// through the worker pool, join under the configured deadline, return
    /// the post-reconciliation view. Generator failures never fail this
    /// call — they surface as failed artifacts.
    pub async fn submit_sync(&self, new: NewReport) -> Result<ReportView, OrchestratorError> {
        let request = self.persist_new(&new).await?;
        let job = RenderJob::from(&request);
        tracing::info!(request_id = %request.id, "dispatching synchronous render calls");

        let mut joins = Vec::with_capacity(ArtifactKind::ALL.len());
        for kind in ArtifactKind::ALL {
            let (done_tx, done_rx) = oneshot::channel::<()>();
            let inner = Arc::clone(&self.inner);
            let job = job.clone();
            self.pool
                .dispatch(async move {
                    inner.render_and_reconcile(kind, &job).await;
                    let _ = done_tx.send(());
                })
                .await;
            joins.push((kind, done_rx));
        }

        let deadline = Instant::now() + self.inner.config.join_timeout;
        for (kind, done_rx) in joins {
            match timeout_at(deadline, done_rx).await {
                Ok(Ok(())) => {}
                // Completion signal lost or deadline expired: the artifact
                // may still be pending, so force a failure outcome. If the
                // in-flight call reconciles first (or later), the terminal
                // guard makes whichever write comes second a no-op.
                Ok(Err(_)) | Err(_) => {
                    tracing::warn!(%kind, request_id = %request.id, "render call missed the join deadline");
                    if let Err(err) = self
                        .inner
                        .reconcile(&request.id, kind, ReconcileOutcome::Failure)
                        .await
                    {
                        tracing::error!(error = %err, %kind, "deadline reconciliation failed");
                    }
                }
            }
        }

        let current = self.load(&request.id).await?;
        Ok(ReportView::from(&current))
    }

    /// Asynchronous submission: persist pending, publish one render job to
    /// the submission topic, return immediately. Completion arrives later
    /// through the callback queue.
    pub async fn submit_async(&self, new: NewReport) -> Result<ReportView, OrchestratorError> {
        let request = self.persist_new(&new).await?;
        let job = RenderJob::from(&request);
        self.inner.publisher.publish(&job).await?;
        tracing::info!(request_id = %request.id, "published render job to submission topic");
        Ok(ReportView::from(&request))
    }

    /// Record a generator outcome against one artifact. See
    /// [`ReconcileStatus`] for the three possible results; only `Applied`
    /// writes and notifies.
    pub async fn reconcile(
        &self,
        id: &RequestId,
        kind: ArtifactKind,
        outcome: ReconcileOutcome,
    ) -> Result<ReconcileStatus, OrchestratorError> {
        self.inner.reconcile(id, kind, outcome).await
    }

    /// Byte stream of a completed artifact. `RequestNotFound` on a lookup
    /// miss, `ArtifactNotReady` before completion.
    pub async fn file_body(
        &self,
        id: &RequestId,
        kind: ArtifactKind,
    ) -> Result<Vec<u8>, OrchestratorError> {
        let request = self.load(id).await?;
        let artifact = request.artifact(kind);
        if artifact.status != ArtifactStatus::Completed {
            return Err(OrchestratorError::ArtifactNotReady {
                id: id.clone(),
                kind,
            });
        }
        self.inner.content.fetch(artifact).await
    }

    /// Delete a request: fire-and-forget remote deletes through the pool,
    /// then drop the local record unconditionally. Remote failures are
    /// logged, retried a bounded number of times inside the client, and
    /// never surfaced — local deletion always wins.
    pub async fn delete(&self, id: &RequestId) -> Result<(), OrchestratorError> {
        let request = self.load(id).await?;

        for kind in ArtifactKind::ALL {
            let Some(file_id) = request.artifact(kind).file_id.clone() else {
                continue;
            };
            let inner = Arc::clone(&self.inner);
            let request_id = id.clone();
            self.pool
                .dispatch(async move {
                    tracing::info!(%kind, file_id, request_id = %request_id, "releasing generator copy");
                    if let Err(err) = inner.generators.delete(kind, &file_id).await {
                        tracing::error!(error = %err, %kind, file_id, "generator deletion failed");
                    }
                })
                .await;
        }

        self.inner.store.delete(id).await?;
        tracing::info!(request_id = %id, "request deleted");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<ReportView>, OrchestratorError> {
        let mut requests = self.inner.store.list().await?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests.iter().map(ReportView::from).collect())
    }

    async fn persist_new(&self, new: &NewReport) -> Result<ReportRequest, OrchestratorError> {
        let request = ReportRequest::new(new.submitter.clone(), new.description.clone());
        self.inner.store.create(&request).await?;
        tracing::info!(request_id = %request.id, submitter = %request.submitter, "request persisted");
        Ok(request)
    }

    async fn load(&self, id: &RequestId) -> Result<ReportRequest, OrchestratorError> {
        match self.inner.store.get(id).await {
            Ok(versioned) => Ok(versioned.request),
            Err(StoreError::NotFound { .. }) => {
                Err(OrchestratorError::RequestNotFound { id: id.clone() })
            }
            Err(other) => Err(other.into()),
        }
    }
}

impl<S, G, N, C, P> Inner<S, G, N, C, P>
where
    S: RequestStore,
    G: GeneratorClient,
    N: Notifier,
    C: ContentFetcher,
    P: SubmissionPublisher,
{
    /// One dispatched render call. The reconciliation write runs no matter
    /// how the RPC ends — success, transport error, timeout, or a malformed
    /// reply all fold into an outcome before anything can return early.
    async fn render_and_reconcile(&self, kind: ArtifactKind, job: &RenderJob) {
        let outcome = match self.generators.render(kind, job).await {
            Ok(reply) if reply.failed => ReconcileOutcome::Failure,
            Ok(reply) => match reply.descriptor() {
                Some(descriptor) => ReconcileOutcome::Success(descriptor),
                None => {
                    tracing::warn!(%kind, request_id = %job.request_id, "generator reply lacked a descriptor");
                    ReconcileOutcome::Failure
                }
            },
            Err(err) => {
                tracing::error!(error = %err, %kind, request_id = %job.request_id, "render call failed");
                ReconcileOutcome::Failure
            }
        };

        match self.reconcile(&job.request_id, kind, outcome).await {
            Ok(status) => {
                tracing::debug!(%kind, request_id = %job.request_id, ?status, "render call reconciled");
            }
            Err(err) => {
                tracing::error!(error = %err, %kind, request_id = %job.request_id, "reconciliation failed");
            }
        }
    }

    /// Compare-and-swap reconciliation loop. Concurrent reconciliations for
    /// the same artifact serialize on the store's version token: the loser
    /// reloads, sees the terminal state, and no-ops.
    async fn reconcile(
        &self,
        id: &RequestId,
        kind: ArtifactKind,
        outcome: ReconcileOutcome,
    ) -> Result<ReconcileStatus, OrchestratorError> {
        for _ in 0..RECONCILE_MAX_ATTEMPTS {
            let versioned = match self.store.get(id).await {
                Ok(versioned) => versioned,
                Err(StoreError::NotFound { .. }) => {
                    tracing::info!(request_id = %id, %kind, "late reconciliation for a deleted request, ignoring");
                    return Ok(ReconcileStatus::RequestGone);
                }
                Err(other) => return Err(other.into()),
            };

            let mut request = versioned.request;
            let now = jiff::Timestamp::now();

            match request.artifact_mut(kind).reconcile(&outcome, now) {
                Transition::AlreadyTerminal { conflicting } => {
                    if conflicting {
                        tracing::warn!(
                            request_id = %id,
                            %kind,
                            "conflicting outcome for terminal artifact ignored"
                        );
                    }
                    return Ok(ReconcileStatus::AlreadyTerminal);
                }
                Transition::Applied => {
                    request.updated_at = now;
                    match self.store.put_if_match(&request, &versioned.etag).await {
                        Ok(_) => {
                            // Best-effort side effect, strictly after commit.
                            if let Err(err) = self.notifier.artifact_reconciled(&request, kind).await
                            {
                                tracing::warn!(error = %err, request_id = %id, "notification failed after reconcile");
                            }
                            return Ok(ReconcileStatus::Applied);
                        }
                        Err(StoreError::Conflict { .. }) => continue,
                        Err(other) => return Err(other.into()),
                    }
                }
            }
        }

        Err(OrchestratorError::Store(StoreError::Conflict {
            id: id.clone(),
        }))
    }
}

//! Callback-queue consumer: feeds generator callbacks into reconciliation.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use duplex_bus::consumer::{Disposition, run_consumer};
use duplex_core::models::messages::RenderCallback;

use crate::state::Orchestrator;

/// Spawn the background consumer for the callback queue.
///
/// `RequestGone` and `AlreadyTerminal` both count as handled — deletion
/// races and at-least-once redelivery are normal operation, not failures.
pub fn spawn_callback_consumer(
    sqs: aws_sdk_sqs::Client,
    queue_url: String,
    service: Orchestrator,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_consumer::<RenderCallback, _, _>(
        sqs,
        queue_url,
        shutdown,
        move |callback: RenderCallback| {
            let service = service.clone();
            async move {
                let outcome = callback.outcome();
                match service
                    .reconcile(&callback.request_id, callback.kind, outcome)
                    .await
                {
                    Ok(status) => {
                        tracing::debug!(
                            request_id = %callback.request_id,
                            kind = %callback.kind,
                            ?status,
                            "callback reconciled"
                        );
                        Disposition::Handled
                    }
                    Err(err) => {
                        tracing::error!(
                            error = %err,
                            request_id = %callback.request_id,
                            kind = %callback.kind,
                            "callback reconciliation failed, leaving for redelivery"
                        );
                        Disposition::Retry
                    }
                }
            }
        },
    ))
}

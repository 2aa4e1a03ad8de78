use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::BusError;
use crate::queue;

const RECEIVE_BATCH: i32 = 10;
const LONG_POLL_SECS: i32 = 10;
const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_secs(2);

/// What a handler decided about a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Durably handled (including benign no-ops); delete the message.
    Handled,
    /// Transient failure; leave the message for redelivery.
    Retry,
}

/// Poll a queue until cancelled, decoding each message as `T` and handing it
/// to `handler`.
///
/// Messages are deleted only after the handler reports them handled, so the
/// at-least-once contract holds across crashes. Bodies that fail to decode
/// are logged and deleted — redelivering a poison message cannot help.
pub async fn run_consumer<T, H, F>(
    client: aws_sdk_sqs::Client,
    queue_url: String,
    shutdown: CancellationToken,
    handler: H,
) where
    T: DeserializeOwned,
    H: Fn(T) -> F,
    F: Future<Output = Disposition>,
{
    tracing::info!(queue_url = %queue_url, "consumer started");

    loop {
        let received = tokio::select! {
            _ = shutdown.cancelled() => break,
            r = queue::receive_messages(&client, &queue_url, RECEIVE_BATCH, LONG_POLL_SECS) => r,
        };

        let messages = match received {
            Ok(messages) => messages,
            Err(err) => {
                tracing::error!(error = %err, queue_url = %queue_url, "receive failed");
                tokio::time::sleep(RECEIVE_ERROR_BACKOFF).await;
                continue;
            }
        };

        for message in messages {
            let disposition = match serde_json::from_str::<T>(&message.body) {
                Ok(decoded) => handler(decoded).await,
                Err(err) => {
                    tracing::warn!(error = %err, "dropping undecodable message");
                    Disposition::Handled
                }
            };

            if disposition == Disposition::Handled
                && let Err(err) =
                    queue::delete_message(&client, &queue_url, &message.receipt_handle).await
            {
                // The message will come back; the handler's idempotency
                // absorbs the redelivery.
                log_delete_failure(&err);
            }
        }
    }

    tracing::info!(queue_url = %queue_url, "consumer stopped");
}

fn log_delete_failure(err: &BusError) {
    tracing::warn!(error = %err, "failed to delete handled message");
}

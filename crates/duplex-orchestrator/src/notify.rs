//! Post-reconciliation notification.
//!
//! Issued strictly after the status write commits; a failure here is logged
//! and swallowed, never allowed to undo the write. Real email delivery is
//! out of scope — the boundary is the message on the email queue.

use duplex_core::models::artifact::{ArtifactKind, ArtifactStatus};
use duplex_core::models::messages::EmailNotification;
use duplex_core::models::request::ReportRequest;
use duplex_bus::error::BusError;

pub trait Notifier: Send + Sync + 'static {
    fn artifact_reconciled(
        &self,
        request: &ReportRequest,
        kind: ArtifactKind,
    ) -> impl Future<Output = Result<(), BusError>> + Send;
}

/// Enqueues an [`EmailNotification`] on the email queue.
#[derive(Clone)]
pub struct EmailQueueNotifier {
    sqs: aws_sdk_sqs::Client,
    queue_url: String,
    recipient: String,
}

impl EmailQueueNotifier {
    pub fn new(
        sqs: aws_sdk_sqs::Client,
        queue_url: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            sqs,
            queue_url: queue_url.into(),
            recipient: recipient.into(),
        }
    }
}

impl Notifier for EmailQueueNotifier {
    async fn artifact_reconciled(
        &self,
        request: &ReportRequest,
        kind: ArtifactKind,
    ) -> Result<(), BusError> {
        let notification = EmailNotification {
            to: self.recipient.clone(),
            submitter: request.submitter.clone(),
            request_id: request.id.clone(),
            kind,
            completed: request.artifact(kind).status == ArtifactStatus::Completed,
        };
        duplex_bus::queue::send_message(&self.sqs, &self.queue_url, &notification).await
    }
}

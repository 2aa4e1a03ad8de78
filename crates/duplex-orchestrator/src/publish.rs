//! Async-path submission publishing.

use duplex_bus::error::BusError;
use duplex_core::models::messages::RenderJob;

pub trait SubmissionPublisher: Send + Sync + 'static {
    fn publish(&self, job: &RenderJob) -> impl Future<Output = Result<(), BusError>> + Send;
}

/// Publishes render jobs to the SNS submission topic, fanned out to the
/// generator services' queues by the bus.
#[derive(Clone)]
pub struct SnsPublisher {
    sns: aws_sdk_sns::Client,
    topic_arn: String,
}

impl SnsPublisher {
    pub fn new(sns: aws_sdk_sns::Client, topic_arn: impl Into<String>) -> Self {
        Self {
            sns,
            topic_arn: topic_arn.into(),
        }
    }
}

impl SubmissionPublisher for SnsPublisher {
    async fn publish(&self, job: &RenderJob) -> Result<(), BusError> {
        duplex_bus::topic::publish(&self.sns, &self.topic_arn, job).await
    }
}

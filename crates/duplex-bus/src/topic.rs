use serde::Serialize;

use crate::error::BusError;

/// Publish a JSON message to an SNS topic.
pub async fn publish<T: Serialize>(
    client: &aws_sdk_sns::Client,
    topic_arn: &str,
    message: &T,
) -> Result<(), BusError> {
    let body = serde_json::to_string(message)?;

    client
        .publish()
        .topic_arn(topic_arn)
        .message(body)
        .send()
        .await
        .map_err(|e| BusError::Publish(e.into_service_error().to_string()))?;

    Ok(())
}

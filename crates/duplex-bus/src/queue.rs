use serde::Serialize;

use crate::error::BusError;

/// A received message body plus the receipt handle needed to delete it.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub body: String,
    pub receipt_handle: String,
}

/// Send a JSON message to an SQS queue.
pub async fn send_message<T: Serialize>(
    client: &aws_sdk_sqs::Client,
    queue_url: &str,
    message: &T,
) -> Result<(), BusError> {
    let body = serde_json::to_string(message)?;

    client
        .send_message()
        .queue_url(queue_url)
        .message_body(body)
        .send()
        .await
        .map_err(|e| BusError::Send(e.into_service_error().to_string()))?;

    Ok(())
}

/// Receive up to `max` messages with long polling.
pub async fn receive_messages(
    client: &aws_sdk_sqs::Client,
    queue_url: &str,
    max: i32,
    wait_secs: i32,
) -> Result<Vec<IncomingMessage>, BusError> {
    let resp = client
        .receive_message()
        .queue_url(queue_url)
        .max_number_of_messages(max)
        .wait_time_seconds(wait_secs)
        .send()
        .await
        .map_err(|e| BusError::Receive(e.into_service_error().to_string()))?;

    let messages = resp
        .messages
        .unwrap_or_default()
        .into_iter()
        .filter_map(|m| {
            Some(IncomingMessage {
                body: m.body?,
                receipt_handle: m.receipt_handle?,
            })
        })
        .collect();

    Ok(messages)
}

/// Delete a handled message.
pub async fn delete_message(
    client: &aws_sdk_sqs::Client,
    queue_url: &str,
    receipt_handle: &str,
) -> Result<(), BusError> {
    client
        .delete_message()
        .queue_url(queue_url)
        .receipt_handle(receipt_handle)
        .send()
        .await
        .map_err(|e| BusError::Delete(e.into_service_error().to_string()))?;

    Ok(())
}

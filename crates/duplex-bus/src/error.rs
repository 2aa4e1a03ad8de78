use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SNS Publish error: {0}")]
    Publish(String),

    #[error("SQS SendMessage error: {0}")]
    Send(String),

    #[error("SQS ReceiveMessage error: {0}")]
    Receive(String),

    #[error("SQS DeleteMessage error: {0}")]
    Delete(String),
}

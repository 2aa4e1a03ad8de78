//! duplex-bus
//!
//! Notification bus operations: SNS publish for the async submission path,
//! SQS send/receive for callbacks and the email queue. Delivery is
//! at-least-once, so every consumer handler must be idempotent.

pub mod client;
pub mod consumer;
pub mod error;
pub mod queue;
pub mod topic;

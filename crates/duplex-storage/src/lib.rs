//! duplex-storage
//!
//! Blob store operations. Thin wrapper around the AWS S3 SDK.

pub mod client;
pub mod documents;
pub mod error;
pub mod objects;

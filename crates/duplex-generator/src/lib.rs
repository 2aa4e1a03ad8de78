//! duplex-generator
//!
//! Generator-service side of the system: renders one artifact kind, uploads
//! the result to the blob store, keeps a per-file record, and serves
//! delete/content requests. The binary in `main.rs` exposes the RPC surface
//! and the submission-queue consumer.

pub mod error;
pub mod records;
pub mod render;
pub mod service;

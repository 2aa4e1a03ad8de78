//! duplex-orchestrator
//!
//! The orchestration core: drives a report request's two render calls to
//! completion under both execution modes (blocking fan-out/join and
//! bus-driven callbacks), keeps the per-artifact status record consistent
//! through partial failures, and serves retrieval and deletion.

pub mod config;
pub mod content;
pub mod error;
pub mod generators;
pub mod notify;
pub mod pool;
pub mod publish;
pub mod service;
pub mod views;

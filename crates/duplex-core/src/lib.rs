//! duplex-core
//!
//! Pure domain types, wire messages, and object-key conventions.
//! No AWS SDK dependency — this is the shared vocabulary of the Duplex system.

pub mod blob;
pub mod error;
pub mod keys;
pub mod models;

//! duplex-store
//!
//! The Report Request Store: the single source of truth for request and
//! artifact records. All mutation goes through a compare-and-swap save, which
//! is the per-request mutual-exclusion boundary reconciliation relies on.

pub mod error;
pub mod memory;
pub mod s3;

use duplex_core::models::request::{ReportRequest, RequestId};

use crate::error::StoreError;

/// A request record plus the opaque version token guarding its next write.
#[derive(Debug, Clone)]
pub struct VersionedRequest {
    pub request: ReportRequest,
    pub etag: String,
}

pub trait RequestStore: Send + Sync + 'static {
    /// Look up a request. `StoreError::NotFound` on a miss.
    fn get(
        &self,
        id: &RequestId,
    ) -> impl Future<Output = Result<VersionedRequest, StoreError>> + Send;

    /// Atomically create a request and its two pending artifacts.
    fn create(&self, request: &ReportRequest)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Save a mutated request only if the version token still matches.
    /// `StoreError::Conflict` means another writer committed first; reload
    /// and reapply.
    fn put_if_match(
        &self,
        request: &ReportRequest,
        etag: &str,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Delete a request and both artifacts together.
    fn delete(&self, id: &RequestId) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn list(&self) -> impl Future<Output = Result<Vec<ReportRequest>, StoreError>> + Send;
}

//! In-memory request store with the same versioning semantics as the S3
//! store. Test double for the orchestration paths.

use std::collections::HashMap;
use std::sync::Arc;

use duplex_core::models::request::{ReportRequest, RequestId};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::{RequestStore, VersionedRequest};

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<RequestId, (ReportRequest, u64)>,
    next_version: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestStore for MemoryStore {
    async fn get(&self, id: &RequestId) -> Result<VersionedRequest, StoreError> {
        let inner = self.inner.lock().await;
        let (request, version) = inner
            .records
            .get(id)
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
        Ok(VersionedRequest {
            request: request.clone(),
            etag: version.to_string(),
        })
    }

    async fn create(&self, request: &ReportRequest) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_version += 1;
        let version = inner.next_version;
        inner
            .records
            .insert(request.id.clone(), (request.clone(), version));
        Ok(())
    }

    async fn put_if_match(
        &self,
        request: &ReportRequest,
        etag: &str,
    ) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().await;
        let current = inner
            .records
            .get(&request.id)
            .ok_or_else(|| StoreError::NotFound {
                id: request.id.clone(),
            })?
            .1;
        if current.to_string() != etag {
            return Err(StoreError::Conflict {
                id: request.id.clone(),
            });
        }
        inner.next_version += 1;
        let version = inner.next_version;
        inner
            .records
            .insert(request.id.clone(), (request.clone(), version));
        Ok(version.to_string())
    }

    async fn delete(&self, id: &RequestId) -> Result<(), StoreError> {
        self.inner.lock().await.records.remove(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ReportRequest>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .records
            .values()
            .map(|(request, _)| request.clone())
            .collect())
    }
}

//! S3-backed request store: one JSON document per request, ETag
//! compare-and-swap for writes.

use aws_sdk_s3::Client;
use duplex_core::keys;
use duplex_core::models::request::{ReportRequest, RequestId};
use duplex_storage::documents;
use duplex_storage::error::StorageError;

use crate::error::StoreError;
use crate::{RequestStore, VersionedRequest};

#[derive(Clone)]
pub struct S3RequestStore {
    client: Client,
    bucket: String,
}

impl S3RequestStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

impl RequestStore for S3RequestStore {
    async fn get(&self, id: &RequestId) -> Result<VersionedRequest, StoreError> {
        let key = keys::request(id);
        let (request, etag) =
            documents::load_document::<ReportRequest>(&self.client, &self.bucket, &key)
                .await
                .map_err(|e| match e {
                    StorageError::NotFound { .. } => StoreError::NotFound { id: id.clone() },
                    other => other.into(),
                })?;
        Ok(VersionedRequest { request, etag })
    }

    async fn create(&self, request: &ReportRequest) -> Result<(), StoreError> {
        // Request ids are freshly generated UUIDs, so an unconditional put
        // cannot clobber an existing record.
        let key = keys::request(&request.id);
        documents::save_document(&self.client, &self.bucket, &key, request).await?;
        Ok(())
    }

    async fn put_if_match(
        &self,
        request: &ReportRequest,
        etag: &str,
    ) -> Result<String, StoreError> {
        let key = keys::request(&request.id);
        documents::save_document_if_match(&self.client, &self.bucket, &key, request, etag)
            .await
            .map_err(|e| match e {
                StorageError::PreconditionFailed { .. } => StoreError::Conflict {
                    id: request.id.clone(),
                },
                other => other.into(),
            })
    }

    async fn delete(&self, id: &RequestId) -> Result<(), StoreError> {
        let key = keys::request(id);
        duplex_storage::objects::delete_object(&self.client, &self.bucket, &key).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ReportRequest>, StoreError> {
        let keys =
            duplex_storage::objects::list_objects(&self.client, &self.bucket, keys::REQUESTS_PREFIX)
                .await?;

        let mut requests = Vec::with_capacity(keys.len());
        for key in keys {
            match documents::load_document::<ReportRequest>(&self.client, &self.bucket, &key).await
            {
                Ok((request, _)) => requests.push(request),
                // Deleted between list and load; skip.
                Err(StorageError::NotFound { .. }) => continue,
                Err(other) => return Err(other.into()),
            }
        }
        Ok(requests)
    }
}

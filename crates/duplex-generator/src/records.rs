//! Per-file records, one JSON document each at `files/<id>.json`.

use aws_sdk_s3::Client;
use serde::{Deserialize, Serialize};

use duplex_core::keys;
use duplex_core::models::artifact::ArtifactKind;
use duplex_storage::documents;
use duplex_storage::error::StorageError;

use crate::error::GeneratorServiceError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub kind: ArtifactKind,
    pub submitter: String,
    pub description: String,
    /// `"<bucket>/<key>"` address of the uploaded bytes.
    pub file_location: String,
    pub file_size: i64,
    pub generated_at: jiff::Timestamp,
}

pub async fn save(
    client: &Client,
    bucket: &str,
    record: &FileRecord,
) -> Result<(), GeneratorServiceError> {
    let key = keys::file_record(&record.id);
    documents::save_document(client, bucket, &key, record).await?;
    Ok(())
}

pub async fn load(
    client: &Client,
    bucket: &str,
    file_id: &str,
) -> Result<FileRecord, GeneratorServiceError> {
    let key = keys::file_record(file_id);
    match documents::load_document::<FileRecord>(client, bucket, &key).await {
        Ok((record, _)) => Ok(record),
        Err(StorageError::NotFound { .. }) => Err(GeneratorServiceError::FileNotFound {
            file_id: file_id.to_string(),
        }),
        Err(other) => Err(other.into()),
    }
}

pub async fn delete(
    client: &Client,
    bucket: &str,
    file_id: &str,
) -> Result<(), GeneratorServiceError> {
    let key = keys::file_record(file_id);
    duplex_storage::objects::delete_object(client, bucket, &key).await?;
    Ok(())
}

//! Render → upload → record glue.

use aws_sdk_s3::Client;
use uuid::Uuid;

use duplex_core::blob::BlobAddress;
use duplex_core::models::artifact::ArtifactKind;
use duplex_core::models::messages::{GeneratorReply, RenderJob};
use duplex_storage::objects;

use crate::error::GeneratorServiceError;
use crate::records::{self, FileRecord};
use crate::render::Renderer;

#[derive(Clone)]
pub struct FileService<R> {
    s3: Client,
    bucket: String,
    kind: ArtifactKind,
    renderer: R,
}

impl<R: Renderer> FileService<R> {
    pub fn new(s3: Client, bucket: impl Into<String>, kind: ArtifactKind, renderer: R) -> Self {
        Self {
            s3,
            bucket: bucket.into(),
            kind,
            renderer,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Render a job, upload the bytes under a fresh key, persist the file
    /// record, and drop the local temporary copy.
    pub async fn create(&self, job: &RenderJob) -> Result<FileRecord, GeneratorServiceError> {
        let file_id = format!("File-{}", Uuid::new_v4());
        let staged_path = std::env::temp_dir().join(&file_id);

        let rendered = self.renderer.render(job, &staged_path)?;
        tracing::debug!(file_id, path = %rendered.path.display(), "staged render output");

        let bytes = tokio::fs::read(&rendered.path).await?;
        objects::put_object(
            &self.s3,
            &self.bucket,
            &file_id,
            bytes,
            Some(self.kind.content_type()),
        )
        .await?;

        if let Err(err) = tokio::fs::remove_file(&rendered.path).await {
            tracing::warn!(error = %err, path = %rendered.path.display(), "failed to remove staged copy");
        }

        let record = FileRecord {
            file_location: format!("{}/{file_id}", self.bucket),
            id: file_id,
            kind: self.kind,
            submitter: job.submitter.clone(),
            description: job.description.clone(),
            file_size: rendered.size,
            generated_at: jiff::Timestamp::now(),
        };
        records::save(&self.s3, &self.bucket, &record).await?;

        tracing::info!(file_id = %record.id, request_id = %job.request_id, "file generated");
        Ok(record)
    }

    /// Remove the blob and the record. `FileNotFound` when the record is
    /// already gone; a blob-delete failure is logged, the record still goes.
    pub async fn delete(&self, file_id: &str) -> Result<FileRecord, GeneratorServiceError> {
        let record = records::load(&self.s3, &self.bucket, file_id).await?;

        match BlobAddress::parse(&record.file_location) {
            Ok(address) => {
                if let Err(err) =
                    objects::delete_object(&self.s3, &address.bucket, &address.key).await
                {
                    tracing::error!(error = %err, file_id, "blob deletion failed");
                }
            }
            Err(err) => {
                tracing::error!(error = %err, file_id, "stored file location is malformed");
            }
        }

        records::delete(&self.s3, &self.bucket, file_id).await?;
        tracing::info!(file_id, "file deleted");
        Ok(record)
    }

    /// The stored bytes of a generated file.
    pub async fn content(&self, file_id: &str) -> Result<Vec<u8>, GeneratorServiceError> {
        let record = records::load(&self.s3, &self.bucket, file_id).await?;
        let address = BlobAddress::parse(&record.file_location)?;
        let output = objects::get_object(&self.s3, &address.bucket, &address.key).await?;
        Ok(output.body)
    }

    /// Fold a create result into the RPC/callback descriptor shape.
    pub fn reply(
        &self,
        job: &RenderJob,
        result: &Result<FileRecord, GeneratorServiceError>,
    ) -> GeneratorReply {
        match result {
            Ok(record) => GeneratorReply::success(
                job.request_id.clone(),
                duplex_core::models::messages::FileDescriptor {
                    file_id: record.id.clone(),
                    file_location: record.file_location.clone(),
                    file_size: record.file_size,
                },
            ),
            Err(err) => {
                tracing::error!(error = %err, request_id = %job.request_id, "render request failed");
                GeneratorReply::failure(job.request_id.clone())
            }
        }
    }
}

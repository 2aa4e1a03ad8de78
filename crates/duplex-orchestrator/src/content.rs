//! Unified artifact content retrieval.
//!
//! One capability — fetch the bytes of a completed artifact — with per-kind
//! implementations behind it: the PDF path streams straight from the blob
//! store by decomposed address, the spreadsheet path goes through the
//! generator's content RPC by file id. Call sites only see [`ContentFetcher`].

use duplex_core::blob::BlobAddress;
use duplex_core::models::artifact::{Artifact, ArtifactKind};

use crate::error::OrchestratorError;
use crate::generators::GeneratorClient;

pub trait ContentFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        artifact: &Artifact,
    ) -> impl Future<Output = Result<Vec<u8>, OrchestratorError>> + Send;
}

/// Reads artifact bytes from the blob store via the stored
/// `"<bucket>/<key>"` address.
#[derive(Clone)]
pub struct BlobFetcher {
    client: aws_sdk_s3::Client,
}

impl BlobFetcher {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

impl ContentFetcher for BlobFetcher {
    async fn fetch(&self, artifact: &Artifact) -> Result<Vec<u8>, OrchestratorError> {
        let location = artifact.file_location.as_deref().ok_or_else(|| missing(artifact))?;
        let address = BlobAddress::parse(location)?;
        let output =
            duplex_storage::objects::get_object(&self.client, &address.bucket, &address.key)
                .await?;
        Ok(output.body)
    }
}

/// Fetches artifact bytes through the owning generator's content RPC.
#[derive(Clone)]
pub struct RpcFetcher<G> {
    generators: G,
}

impl<G: GeneratorClient> RpcFetcher<G> {
    pub fn new(generators: G) -> Self {
        Self { generators }
    }
}

impl<G: GeneratorClient> ContentFetcher for RpcFetcher<G> {
    async fn fetch(&self, artifact: &Artifact) -> Result<Vec<u8>, OrchestratorError> {
        let file_id = artifact.file_id.as_deref().ok_or_else(|| missing(artifact))?;
        Ok(self.generators.fetch_content(artifact.kind, file_id).await?)
    }
}

/// Routes each artifact kind to its fetcher.
#[derive(Clone)]
pub struct PerKindFetcher<P, S> {
    pdf: P,
    spreadsheet: S,
}

impl<P: ContentFetcher, S: ContentFetcher> PerKindFetcher<P, S> {
    pub fn new(pdf: P, spreadsheet: S) -> Self {
        Self { pdf, spreadsheet }
    }
}

impl<P: ContentFetcher, S: ContentFetcher> ContentFetcher for PerKindFetcher<P, S> {
    async fn fetch(&self, artifact: &Artifact) -> Result<Vec<u8>, OrchestratorError> {
        match artifact.kind {
            ArtifactKind::Pdf => self.pdf.fetch(artifact).await,
            ArtifactKind::Spreadsheet => self.spreadsheet.fetch(artifact).await,
        }
    }
}

fn missing(artifact: &Artifact) -> OrchestratorError {
    OrchestratorError::MissingDescriptor {
        kind: artifact.kind,
    }
}

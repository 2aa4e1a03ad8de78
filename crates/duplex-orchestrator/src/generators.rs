//! Generator RPC client.
//!
//! One client fronts both generator services; the artifact kind selects the
//! base URL and the path segment. The HTTP implementation carries explicit
//! timeouts and bounded retries for deletes.

use std::time::Duration;

use duplex_core::models::artifact::ArtifactKind;
use duplex_core::models::messages::{GeneratorReply, RenderJob};

use crate::error::GeneratorError;

pub trait GeneratorClient: Send + Sync + 'static {
    /// Blocking render RPC: `POST {base}/{kind}`.
    fn render(
        &self,
        kind: ArtifactKind,
        job: &RenderJob,
    ) -> impl Future<Output = Result<GeneratorReply, GeneratorError>> + Send;

    /// Release the generator's copy of a file: `DELETE {base}/{kind}/{file_id}`.
    fn delete(
        &self,
        kind: ArtifactKind,
        file_id: &str,
    ) -> impl Future<Output = Result<(), GeneratorError>> + Send;

    /// Synchronous content fetch: `GET {base}/{kind}/{file_id}/content`.
    fn fetch_content(
        &self,
        kind: ArtifactKind,
        file_id: &str,
    ) -> impl Future<Output = Result<Vec<u8>, GeneratorError>> + Send;
}

/// Base URLs of the two generator services.
#[derive(Debug, Clone)]
pub struct GeneratorEndpoints {
    pub pdf: String,
    pub spreadsheet: String,
}

impl GeneratorEndpoints {
    fn base(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Pdf => &self.pdf,
            ArtifactKind::Spreadsheet => &self.spreadsheet,
        }
    }
}

const DELETE_MAX_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct HttpGeneratorClient {
    http: reqwest::Client,
    endpoints: GeneratorEndpoints,
    request_timeout: Duration,
}

impl HttpGeneratorClient {
    /// Takes the process-wide `reqwest::Client`; never builds its own.
    pub fn new(
        http: reqwest::Client,
        endpoints: GeneratorEndpoints,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoints,
            request_timeout,
        }
    }

    fn url(&self, kind: ArtifactKind, tail: &str) -> String {
        let base = self.endpoints.base(kind).trim_end_matches('/');
        format!("{base}/{}{tail}", kind.path_segment())
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, GeneratorError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(GeneratorError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl GeneratorClient for HttpGeneratorClient {
    async fn render(
        &self,
        kind: ArtifactKind,
        job: &RenderJob,
    ) -> Result<GeneratorReply, GeneratorError> {
        let resp = self
            .http
            .post(self.url(kind, ""))
            .json(job)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let reply = Self::check(resp)
            .await?
            .json::<GeneratorReply>()
            .await
            .map_err(|e| GeneratorError::Decode(e.to_string()))?;
        Ok(reply)
    }

    async fn delete(&self, kind: ArtifactKind, file_id: &str) -> Result<(), GeneratorError> {
        let url = self.url(kind, &format!("/{file_id}"));
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = self
                .http
                .delete(&url)
                .timeout(self.request_timeout)
                .send()
                .await;

            let err = match result {
                Ok(resp) => match Self::check(resp).await {
                    Ok(_) => return Ok(()),
                    // The generator no longer knows the file; nothing left
                    // to release.
                    Err(GeneratorError::Status { status: 404, .. }) => return Ok(()),
                    Err(err) => err,
                },
                Err(err) => err.into(),
            };

            if attempt >= DELETE_MAX_ATTEMPTS {
                return Err(err);
            }
            let backoff_ms = 50_u64.saturating_mul(1 << (attempt - 1)).min(500);
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        }
    }

    async fn fetch_content(
        &self,
        kind: ArtifactKind,
        file_id: &str,
    ) -> Result<Vec<u8>, GeneratorError> {
        let resp = self
            .http
            .get(self.url(kind, &format!("/{file_id}/content")))
            .timeout(self.request_timeout)
            .send()
            .await?;
        let bytes = Self::check(resp).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

use serde::Serialize;

use duplex_core::models::artifact::{Artifact, ArtifactKind, ArtifactStatus};
use duplex_core::models::request::{ReportRequest, RequestId, RequestStatus};

/// Client-facing view of one request: the two artifact records plus the
/// derived aggregate status.
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub request_id: RequestId,
    pub submitter: String,
    pub description: String,
    pub status: RequestStatus,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
    pub artifacts: Vec<ArtifactView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactView {
    pub kind: ArtifactKind,
    pub status: ArtifactStatus,
    pub file_id: Option<String>,
    pub file_location: Option<String>,
    pub file_size: Option<i64>,
    pub updated_at: jiff::Timestamp,
}

impl From<&Artifact> for ArtifactView {
    fn from(artifact: &Artifact) -> Self {
        Self {
            kind: artifact.kind,
            status: artifact.status,
            file_id: artifact.file_id.clone(),
            file_location: artifact.file_location.clone(),
            file_size: artifact.file_size,
            updated_at: artifact.updated_at,
        }
    }
}

impl From<&ReportRequest> for ReportView {
    fn from(request: &ReportRequest) -> Self {
        Self {
            request_id: request.id.clone(),
            submitter: request.submitter.clone(),
            description: request.description.clone(),
            status: request.status(),
            created_at: request.created_at,
            updated_at: request.updated_at,
            artifacts: request.artifacts().into_iter().map(ArtifactView::from).collect(),
        }
    }
}

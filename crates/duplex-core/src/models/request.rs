use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::artifact::{Artifact, ArtifactKind, ArtifactStatus};

/// Opaque request token, generated at creation and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(format!("Req-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Aggregate status, derived from the two artifacts and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Completed,
    Failed,
}

/// A report request and its two owned artifact records.
///
/// Created atomically with both artifacts pending; the artifacts are mutated
/// exactly once each by reconciliation, and the whole aggregate is destroyed
/// together on delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub id: RequestId,
    pub submitter: String,
    pub description: String,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
    pdf: Artifact,
    spreadsheet: Artifact,
}

impl ReportRequest {
    pub fn new(submitter: impl Into<String>, description: impl Into<String>) -> Self {
        let now = jiff::Timestamp::now();
        Self {
            id: RequestId::generate(),
            submitter: submitter.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
            pdf: Artifact::pending(ArtifactKind::Pdf, now),
            spreadsheet: Artifact::pending(ArtifactKind::Spreadsheet, now),
        }
    }

    pub fn artifact(&self, kind: ArtifactKind) -> &Artifact {
        match kind {
            ArtifactKind::Pdf => &self.pdf,
            ArtifactKind::Spreadsheet => &self.spreadsheet,
        }
    }

    pub fn artifact_mut(&mut self, kind: ArtifactKind) -> &mut Artifact {
        match kind {
            ArtifactKind::Pdf => &mut self.pdf,
            ArtifactKind::Spreadsheet => &mut self.spreadsheet,
        }
    }

    pub fn artifacts(&self) -> [&Artifact; 2] {
        [&self.pdf, &self.spreadsheet]
    }

    /// Derived aggregate status: pending while either artifact is pending,
    /// failed if any artifact failed, completed only when both completed.
    pub fn status(&self) -> RequestStatus {
        let statuses = self.artifacts().map(|a| a.status);
        if statuses.contains(&ArtifactStatus::Pending) {
            RequestStatus::Pending
        } else if statuses.contains(&ArtifactStatus::Failed) {
            RequestStatus::Failed
        } else {
            RequestStatus::Completed
        }
    }
}

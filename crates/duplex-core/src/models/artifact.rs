use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::messages::{FileDescriptor, ReconcileOutcome};

/// The two artifact kinds every report request owns, one record each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Pdf,
    Spreadsheet,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Pdf, ArtifactKind::Spreadsheet];

    /// URL path segment used by the generator RPC surface.
    pub fn path_segment(self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "pdf",
            ArtifactKind::Spreadsheet => "spreadsheet",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "application/pdf",
            ArtifactKind::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for ArtifactKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(ArtifactKind::Pdf),
            "spreadsheet" => Ok(ArtifactKind::Spreadsheet),
            other => Err(CoreError::InvalidKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Pending,
    Completed,
    Failed,
}

/// Result of applying a reconciliation outcome to an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The artifact moved from pending to a terminal state.
    Applied,
    /// The artifact was already terminal. `conflicting` is true when the new
    /// outcome disagrees with the stored one; the stored state is kept
    /// either way.
    AlreadyTerminal { conflicting: bool },
}

/// Per-kind generation record: status plus, once completed, the file
/// descriptor of the rendered output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub status: ArtifactStatus,
    pub file_id: Option<String>,
    pub file_location: Option<String>,
    pub file_size: Option<i64>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl Artifact {
    pub fn pending(kind: ArtifactKind, now: jiff::Timestamp) -> Self {
        Self {
            kind,
            status: ArtifactStatus::Pending,
            file_id: None,
            file_location: None,
            file_size: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != ArtifactStatus::Pending
    }

    /// Apply a reconciliation outcome.
    ///
    /// Legal transitions are pending→completed and pending→failed only.
    /// Reapplying the same terminal outcome is a no-op; a different outcome
    /// after a terminal state never overwrites the stored descriptor.
    pub fn reconcile(&mut self, outcome: &ReconcileOutcome, now: jiff::Timestamp) -> Transition {
        if self.is_terminal() {
            return Transition::AlreadyTerminal {
                conflicting: !self.matches(outcome),
            };
        }

        match outcome {
            ReconcileOutcome::Success(descriptor) => {
                self.status = ArtifactStatus::Completed;
                self.file_id = Some(descriptor.file_id.clone());
                self.file_location = Some(descriptor.file_location.clone());
                self.file_size = Some(descriptor.file_size);
            }
            ReconcileOutcome::Failure => {
                self.status = ArtifactStatus::Failed;
            }
        }
        self.updated_at = now;
        Transition::Applied
    }

    /// Whether a terminal artifact already reflects the given outcome.
    fn matches(&self, outcome: &ReconcileOutcome) -> bool {
        match (self.status, outcome) {
            (ArtifactStatus::Failed, ReconcileOutcome::Failure) => true,
            (ArtifactStatus::Completed, ReconcileOutcome::Success(descriptor)) => {
                self.file_id.as_deref() == Some(descriptor.file_id.as_str())
                    && self.file_location.as_deref() == Some(descriptor.file_location.as_str())
                    && self.file_size == Some(descriptor.file_size)
            }
            _ => false,
        }
    }

    /// The stored file descriptor, present only once completed.
    pub fn descriptor(&self) -> Option<FileDescriptor> {
        Some(FileDescriptor {
            file_id: self.file_id.clone()?,
            file_location: self.file_location.clone()?,
            file_size: self.file_size?,
        })
    }
}

//! Wire types shared by the orchestrator, the generator services, and the
//! notification bus. The same shapes travel over the RPC surface and the
//! queue messages.

use serde::{Deserialize, Serialize};

use crate::models::artifact::ArtifactKind;
use crate::models::request::{ReportRequest, RequestId};

/// Submission payload: the RPC body of `POST /{kind}` and the message
/// published to the submission topic on the async path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderJob {
    pub request_id: RequestId,
    pub submitter: String,
    pub description: String,
}

impl From<&ReportRequest> for RenderJob {
    fn from(request: &ReportRequest) -> Self {
        Self {
            request_id: request.id.clone(),
            submitter: request.submitter.clone(),
            description: request.description.clone(),
        }
    }
}

/// Address and size of a rendered file, populated on successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub file_id: String,
    pub file_location: String,
    pub file_size: i64,
}

/// Descriptor a generator service returns over RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorReply {
    pub request_id: RequestId,
    pub failed: bool,
    pub file_id: Option<String>,
    pub file_location: Option<String>,
    pub file_size: Option<i64>,
}

impl GeneratorReply {
    pub fn success(request_id: RequestId, descriptor: FileDescriptor) -> Self {
        Self {
            request_id,
            failed: false,
            file_id: Some(descriptor.file_id),
            file_location: Some(descriptor.file_location),
            file_size: Some(descriptor.file_size),
        }
    }

    pub fn failure(request_id: RequestId) -> Self {
        Self {
            request_id,
            failed: true,
            file_id: None,
            file_location: None,
            file_size: None,
        }
    }

    pub fn descriptor(&self) -> Option<FileDescriptor> {
        Some(FileDescriptor {
            file_id: self.file_id.clone()?,
            file_location: self.file_location.clone()?,
            file_size: self.file_size?,
        })
    }
}

/// Callback message a generator publishes to the bus after an async render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderCallback {
    pub request_id: RequestId,
    pub kind: ArtifactKind,
    pub failed: bool,
    pub file_id: Option<String>,
    pub file_location: Option<String>,
    pub file_size: Option<i64>,
}

impl RenderCallback {
    pub fn from_reply(kind: ArtifactKind, reply: GeneratorReply) -> Self {
        Self {
            request_id: reply.request_id,
            kind,
            failed: reply.failed,
            file_id: reply.file_id,
            file_location: reply.file_location,
            file_size: reply.file_size,
        }
    }

    pub fn outcome(&self) -> ReconcileOutcome {
        if self.failed {
            return ReconcileOutcome::Failure;
        }
        match (&self.file_id, &self.file_location, self.file_size) {
            (Some(file_id), Some(file_location), Some(file_size)) => {
                ReconcileOutcome::Success(FileDescriptor {
                    file_id: file_id.clone(),
                    file_location: file_location.clone(),
                    file_size,
                })
            }
            // A success flag without a complete descriptor is malformed;
            // treated as a failed render.
            _ => ReconcileOutcome::Failure,
        }
    }
}

/// Input to reconciliation: the generator's outcome for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Success(FileDescriptor),
    Failure,
}

/// Message placed on the email queue after a reconciliation commits.
/// Delivery itself is out of scope; this is the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailNotification {
    pub to: String,
    pub submitter: String,
    pub request_id: RequestId,
    pub kind: ArtifactKind,
    pub completed: bool,
}

use duplex_core::blob::BlobAddress;
use duplex_core::models::artifact::{ArtifactKind, ArtifactStatus, Transition};
use duplex_core::models::messages::{FileDescriptor, ReconcileOutcome};
use duplex_core::models::request::{ReportRequest, RequestStatus};

fn descriptor(file_id: &str) -> FileDescriptor {
    FileDescriptor {
        file_id: file_id.to_string(),
        file_location: format!("bucket1/{file_id}"),
        file_size: 100,
    }
}

#[test]
fn new_request_is_pending_everywhere() {
    let request = ReportRequest::new("alice", "quarterly numbers");
    for artifact in request.artifacts() {
        assert_eq!(artifact.status, ArtifactStatus::Pending);
        assert!(artifact.file_id.is_none());
    }
    assert_eq!(request.status(), RequestStatus::Pending);
}

#[test]
fn derived_status_follows_artifacts() {
    let mut request = ReportRequest::new("alice", "r");
    let now = jiff::Timestamp::now();

    request
        .artifact_mut(ArtifactKind::Pdf)
        .reconcile(&ReconcileOutcome::Success(descriptor("F1")), now);
    assert_eq!(request.status(), RequestStatus::Pending);

    request
        .artifact_mut(ArtifactKind::Spreadsheet)
        .reconcile(&ReconcileOutcome::Failure, now);
    assert_eq!(request.status(), RequestStatus::Failed);

    let mut request = ReportRequest::new("bob", "r");
    for kind in ArtifactKind::ALL {
        request
            .artifact_mut(kind)
            .reconcile(&ReconcileOutcome::Success(descriptor("F2")), now);
    }
    assert_eq!(request.status(), RequestStatus::Completed);
}

#[test]
fn success_populates_descriptor_fields() {
    let mut request = ReportRequest::new("alice", "r");
    let now = jiff::Timestamp::now();
    let transition = request
        .artifact_mut(ArtifactKind::Pdf)
        .reconcile(&ReconcileOutcome::Success(descriptor("F1")), now);

    assert_eq!(transition, Transition::Applied);
    let artifact = request.artifact(ArtifactKind::Pdf);
    assert_eq!(artifact.status, ArtifactStatus::Completed);
    assert_eq!(artifact.file_id.as_deref(), Some("F1"));
    assert_eq!(artifact.file_location.as_deref(), Some("bucket1/F1"));
    assert_eq!(artifact.file_size, Some(100));
}

#[test]
fn reapplying_the_same_outcome_is_a_noop() {
    let mut request = ReportRequest::new("alice", "r");
    let now = jiff::Timestamp::now();
    let outcome = ReconcileOutcome::Success(descriptor("F1"));

    request.artifact_mut(ArtifactKind::Pdf).reconcile(&outcome, now);
    let transition = request.artifact_mut(ArtifactKind::Pdf).reconcile(&outcome, now);

    assert_eq!(transition, Transition::AlreadyTerminal { conflicting: false });
}

#[test]
fn conflicting_outcome_never_overwrites_terminal_state() {
    let mut request = ReportRequest::new("alice", "r");
    let now = jiff::Timestamp::now();

    request
        .artifact_mut(ArtifactKind::Pdf)
        .reconcile(&ReconcileOutcome::Success(descriptor("F1")), now);
    let transition = request
        .artifact_mut(ArtifactKind::Pdf)
        .reconcile(&ReconcileOutcome::Failure, now);

    assert_eq!(transition, Transition::AlreadyTerminal { conflicting: true });
    let artifact = request.artifact(ArtifactKind::Pdf);
    assert_eq!(artifact.status, ArtifactStatus::Completed);
    assert_eq!(artifact.file_id.as_deref(), Some("F1"));

    // Failed stays failed even if a success arrives late.
    let mut request = ReportRequest::new("bob", "r");
    request
        .artifact_mut(ArtifactKind::Spreadsheet)
        .reconcile(&ReconcileOutcome::Failure, now);
    let transition = request
        .artifact_mut(ArtifactKind::Spreadsheet)
        .reconcile(&ReconcileOutcome::Success(descriptor("F9")), now);

    assert_eq!(transition, Transition::AlreadyTerminal { conflicting: true });
    let artifact = request.artifact(ArtifactKind::Spreadsheet);
    assert_eq!(artifact.status, ArtifactStatus::Failed);
    assert!(artifact.file_id.is_none());
}

#[test]
fn blob_address_splits_on_first_slash_only() {
    let addr = BlobAddress::parse("bucket1/reports/2024/F1").unwrap();
    assert_eq!(addr.bucket, "bucket1");
    assert_eq!(addr.key, "reports/2024/F1");
    assert_eq!(addr.to_string(), "bucket1/reports/2024/F1");
}

#[test]
fn malformed_blob_addresses_are_rejected() {
    assert!(BlobAddress::parse("no-separator").is_err());
    assert!(BlobAddress::parse("/leading").is_err());
    assert!(BlobAddress::parse("trailing/").is_err());
    assert!(BlobAddress::parse("").is_err());
}

#[test]
fn request_ids_are_unique_and_prefixed() {
    let a = ReportRequest::new("a", "d");
    let b = ReportRequest::new("a", "d");
    assert_ne!(a.id, b.id);
    assert!(a.id.as_str().starts_with("Req-"));
}

use duplex_core::models::messages::RenderJob;
use duplex_core::models::request::RequestId;
use duplex_generator::render::{KindRenderer, PdfRenderer, Renderer, SheetRenderer};

fn job() -> RenderJob {
    RenderJob {
        request_id: RequestId::generate(),
        submitter: "ana".to_string(),
        description: "quarterly totals".to_string(),
    }
}

fn staging_path(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("duplex-render-test-{tag}-{}", uuid::Uuid::new_v4()))
}

#[test]
fn pdf_renderer_stages_file_with_matching_size() {
    let dest = staging_path("pdf");
    let rendered = PdfRenderer.render(&job(), &dest).unwrap();

    let bytes = std::fs::read(&rendered.path).unwrap();
    assert_eq!(rendered.size, bytes.len() as i64);
    assert!(bytes.starts_with(b"%PDF-"));

    std::fs::remove_file(&dest).unwrap();
}

#[test]
fn sheet_renderer_output_carries_the_job_fields() {
    let j = job();
    let dest = staging_path("sheet");
    let rendered = SheetRenderer.render(&j, &dest).unwrap();

    let text = std::fs::read_to_string(&rendered.path).unwrap();
    assert!(text.contains(&j.submitter));
    assert!(text.contains(&j.description));
    assert!(text.contains(j.request_id.as_str()));

    std::fs::remove_file(&dest).unwrap();
}

#[test]
fn kind_renderer_dispatches_to_the_selected_kind() {
    let dest = staging_path("kind");
    let rendered = KindRenderer::Sheet(SheetRenderer).render(&job(), &dest).unwrap();

    let text = std::fs::read_to_string(&rendered.path).unwrap();
    assert!(text.starts_with("request_id,submitter,description"));

    std::fs::remove_file(&dest).unwrap();
}

#[test]
fn render_to_an_unwritable_path_is_an_error() {
    let dest = std::path::Path::new("/nonexistent-dir/duplex-render-test");
    assert!(PdfRenderer.render(&job(), dest).is_err());
}

//! Artifact rendering.
//!
//! The real rendering pipelines are out of scope; these renderers produce
//! small deterministic files so the upload/record/cleanup glue and the
//! end-to-end flows are exercised with genuine bytes. They stage their
//! output to a local path the service later uploads and removes.

use std::path::{Path, PathBuf};

use duplex_core::models::messages::RenderJob;

use crate::error::GeneratorServiceError;

/// A staged render: where the bytes landed and how large they are.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub size: i64,
}

pub trait Renderer: Send + Sync + 'static {
    fn render(&self, job: &RenderJob, dest: &Path) -> Result<RenderedFile, GeneratorServiceError>;
}

#[derive(Debug, Clone, Default)]
pub struct PdfRenderer;

impl Renderer for PdfRenderer {
    fn render(&self, job: &RenderJob, dest: &Path) -> Result<RenderedFile, GeneratorServiceError> {
        // Placeholder document, not a conformant PDF.
        let body = format!(
            "%PDF-1.4\n% report {}\n(Submitted by {}: {})\n%%EOF\n",
            job.request_id, job.submitter, job.description
        );
        write_staged(dest, body.as_bytes())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SheetRenderer;

impl Renderer for SheetRenderer {
    fn render(&self, job: &RenderJob, dest: &Path) -> Result<RenderedFile, GeneratorServiceError> {
        let body = format!(
            "request_id,submitter,description\n{},{},{}\n",
            job.request_id, job.submitter, job.description
        );
        write_staged(dest, body.as_bytes())
    }
}

/// Kind-selected renderer, picked once at startup.
#[derive(Debug, Clone)]
pub enum KindRenderer {
    Pdf(PdfRenderer),
    Sheet(SheetRenderer),
}

impl Renderer for KindRenderer {
    fn render(&self, job: &RenderJob, dest: &Path) -> Result<RenderedFile, GeneratorServiceError> {
        match self {
            KindRenderer::Pdf(r) => r.render(job, dest),
            KindRenderer::Sheet(r) => r.render(job, dest),
        }
    }
}

fn write_staged(dest: &Path, bytes: &[u8]) -> Result<RenderedFile, GeneratorServiceError> {
    std::fs::write(dest, bytes)?;
    Ok(RenderedFile {
        path: dest.to_path_buf(),
        size: bytes.len() as i64,
    })
}

//! Render + compile + publish, with a scratch directory per invocation.
//!
//! The engine only ever sees a fresh `TempDir`, so concurrent requests cannot
//! overwrite each other's intermediates. The scratch directory is removed after
//! every run, on success and on every error path; a cancelled request still
//! removes it on drop.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::engine::{compile, TypesetEngine};
use super::{render, RenderError, Template};
use crate::models::resume::ResumeRecord;

/// Files published to the output directory by a successful run.
#[derive(Debug, Clone)]
pub struct GeneratedResume {
    pub stem: String,
    pub tex_path: PathBuf,
    pub pdf_path: PathBuf,
}

impl GeneratedResume {
    pub fn pdf_filename(&self) -> String {
        format!("{}.pdf", self.stem)
    }
}

/// Renders `record`, typesets it, and publishes `<stem>.tex` and `<stem>.pdf`
/// into `output_dir`. Nothing is published unless the engine succeeds.
pub async fn generate(
    record: &ResumeRecord,
    template: &Template,
    engine: &dyn TypesetEngine,
    output_dir: &Path,
    stem: &str,
) -> Result<GeneratedResume, RenderError> {
    let markup = render(record, template)?;

    let scratch = blocking(|| tempfile::Builder::new().prefix("resume-").tempdir()).await?;
    let result = compile_and_publish(engine, &markup, scratch.path(), output_dir, stem).await;

    let scratch_path = scratch.path().to_path_buf();
    if let Err(e) = blocking(move || scratch.close()).await {
        warn!("Could not remove scratch directory {}: {e}", scratch_path.display());
    }

    result
}

async fn compile_and_publish(
    engine: &dyn TypesetEngine,
    markup: &str,
    workdir: &Path,
    output_dir: &Path,
    stem: &str,
) -> Result<GeneratedResume, RenderError> {
    let artifact = compile(engine, markup, workdir).await?;

    tokio::fs::create_dir_all(output_dir).await?;
    let tex_path = output_dir.join(format!("{stem}.tex"));
    let pdf_path = output_dir.join(format!("{stem}.pdf"));

    tokio::fs::copy(&artifact.tex_path, &tex_path).await?;
    if let Err(e) = tokio::fs::copy(&artifact.pdf_path, &pdf_path).await {
        if let Err(cleanup) = tokio::fs::remove_file(&tex_path).await {
            warn!("Could not remove {}: {cleanup}", tex_path.display());
        }
        return Err(e.into());
    }

    info!(stem, pdf = %pdf_path.display(), "Resume generated");

    Ok(GeneratedResume {
        stem: stem.to_string(),
        tex_path,
        pdf_path,
    })
}

/// Runs blocking filesystem work off the async workers.
async fn blocking<T, F>(work: F) -> std::io::Result<T>
where
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(std::io::Error::other)?
}

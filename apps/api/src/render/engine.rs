//! External typesetting engine.
//!
//! The engine is a black box: it receives a `.tex` file and either leaves a
//! PDF next to it or fails with diagnostics. `TypesetEngine` is the seam that
//! lets tests run without a TeX installation.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::RenderError;

/// Base name of every file the engine reads or writes.
pub const JOB_NAME: &str = "resume";

/// Files pdflatex leaves behind besides the PDF.
pub const AUX_EXTENSIONS: &[&str] = &[
    "aux", "log", "out", "fdb_latexmk", "fls", "synctex.gz", "toc", "nav", "snm", "vrb",
];

/// Paths of a successful compile, both inside the working directory.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub tex_path: PathBuf,
    pub pdf_path: PathBuf,
}

#[async_trait]
pub trait TypesetEngine: Send + Sync {
    /// Typesets `source` inside `workdir`, returning the produced PDF path.
    async fn typeset(&self, source: &Path, workdir: &Path) -> Result<PathBuf, RenderError>;

    /// Short name for logs and health output.
    fn name(&self) -> &str;
}

/// `pdflatex` (or a compatible binary) run as a child process.
#[derive(Debug, Clone)]
pub struct PdfLatex {
    program: String,
    timeout: Option<Duration>,
}

impl PdfLatex {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl TypesetEngine for PdfLatex {
    async fn typeset(&self, source: &Path, workdir: &Path) -> Result<PathBuf, RenderError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg(format!("-jobname={JOB_NAME}"))
            .arg(format!("-output-directory={}", workdir.display()))
            .arg(source)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(program = %self.program, source = %source.display(), "Running typesetting engine");

        let run = cmd.output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                RenderError::Engine(format!(
                    "{} timed out after {}s",
                    self.program,
                    limit.as_secs()
                ))
            })?,
            None => run.await,
        }
        .map_err(|e| RenderError::Engine(format!("failed to launch '{}': {e}", self.program)))?;

        remove_aux_files(workdir).await;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::Engine(format!(
                "{} exited with {}\n{}{}",
                self.program, output.status, stdout, stderr
            )));
        }

        Ok(workdir.join(format!("{JOB_NAME}.pdf")))
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Writes `markup` into `workdir` and runs `engine` on it.
///
/// Fails with `RenderError::Engine` if the engine fails or leaves no
/// (or an empty) PDF behind. Never retried: the engine is deterministic.
pub async fn compile(
    engine: &dyn TypesetEngine,
    markup: &str,
    workdir: &Path,
) -> Result<Artifact, RenderError> {
    let tex_path = workdir.join(format!("{JOB_NAME}.tex"));
    tokio::fs::write(&tex_path, markup).await?;

    let pdf_path = engine.typeset(&tex_path, workdir).await?;

    let produced = tokio::fs::metadata(&pdf_path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false);
    if !produced {
        return Err(RenderError::Engine(format!(
            "{} finished but produced no artifact at {}",
            engine.name(),
            pdf_path.display()
        )));
    }

    info!(engine = engine.name(), pdf = %pdf_path.display(), "Typesetting succeeded");
    Ok(Artifact { tex_path, pdf_path })
}

/// Best-effort removal of engine byproducts. Returns how many were removed.
pub async fn remove_aux_files(dir: &Path) -> usize {
    let mut removed = 0;
    for ext in AUX_EXTENSIONS {
        let path = dir.join(format!("{JOB_NAME}.{ext}"));
        match tokio::fs::remove_file(&path).await {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {e}", path.display()),
        }
    }
    removed
}

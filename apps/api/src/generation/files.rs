//! Output-directory bookkeeping: which files may be served and which may be
//! deleted. The directory can be shared with other data (e.g. `OUTPUT_DIR=.`),
//! so only generated artifacts and engine byproducts are ever touched.

use std::path::Path;

use tracing::{info, warn};

use crate::render::engine::AUX_EXTENSIONS;

/// A downloadable artifact type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Pdf,
    Tex,
}

impl ArtifactKind {
    /// Classifies a requested file name, rejecting anything that could
    /// escape the output directory.
    pub fn from_filename(name: &str) -> Option<Self> {
        let (stem, ext) = name.rsplit_once('.')?;
        let stem_ok = !stem.is_empty()
            && !stem.starts_with('.')
            && stem
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !stem_ok {
            return None;
        }
        match ext {
            "pdf" => Some(ArtifactKind::Pdf),
            "tex" => Some(ArtifactKind::Tex),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "application/pdf",
            ArtifactKind::Tex => "application/x-tex",
        }
    }
}

fn is_removable(name: &str) -> bool {
    if ArtifactKind::from_filename(name).is_some() {
        return true;
    }
    // Multi-part suffixes such as `synctex.gz` are matched whole.
    AUX_EXTENSIONS.iter().any(|ext| {
        name.strip_suffix(*ext)
            .and_then(|rest| rest.strip_suffix('.'))
            .is_some_and(|stem| !stem.is_empty())
    })
}

/// Deletes generated artifacts and byproducts from `dir`. A missing directory
/// counts as already clean.
pub async fn remove_generated(dir: &Path) -> std::io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !entry.file_type().await?.is_file() || !is_removable(name) {
            continue;
        }
        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => warn!("Could not remove {}: {e}", entry.path().display()),
        }
    }

    info!(dir = %dir.display(), removed, "Cleaned output directory");
    Ok(removed)
}

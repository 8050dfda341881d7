//! Context ingestion.
//!
//! Reads the optional requirement-context document and enumerates source
//! files for directory-wide analysis. Context documents are plain text
//! only; anything that would need a real parser (PDF, DOCX) is rejected
//! up front with a clear error.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::analysis::detect_language_from_path;

const SUPPORTED_CONTEXT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Directories never descended into when scanning for sources.
const SKIPPED_DIRS: [&str; 6] = [
    "__pycache__",
    "venv",
    ".venv",
    "node_modules",
    "target",
    ".git",
];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported context format '.{extension}' for {}: only .txt and .md are supported", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("context document {} is empty", path.display())]
    EmptyDocument { path: PathBuf },
}

/// Read a context document for [`combine_requirement`].
///
/// [`combine_requirement`]: crate::generation::combine_requirement
pub fn read_context_file(path: &Path) -> Result<String, IngestError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !SUPPORTED_CONTEXT_EXTENSIONS.contains(&extension.as_str()) {
        return Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Err(IngestError::EmptyDocument {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(
        path = %path.display(),
        chars = content.len(),
        "loaded context document"
    );
    Ok(content)
}

/// All analyzable source files under `root`, sorted for stable output.
///
/// Skips dependency and VCS directories plus anything hidden.
pub fn list_source_files(root: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut sources = Vec::new();
    let walker = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry));

    for entry in walker {
        let entry = entry.map_err(|err| IngestError::Read {
            path: root.to_path_buf(),
            source: err.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if detect_language_from_path(entry.path()) != "unknown" {
            sources.push(entry.path().to_path_buf());
        }
    }

    sources.sort();
    Ok(sources)
}

fn is_skipped(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    // depth 0 is the scan root itself, even when it is hidden
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    SKIPPED_DIRS.contains(&name.as_ref()) || name.starts_with('.')
}

//! Aggregator: combines the processed files of one directory into a single artifact.
//!
//! The artifact is written three times at the top of the output root, named after the
//! directory: `<name>.txt`, `<name>.md` and `<name>.odt`. The `.odt` is produced by a
//! [`DocumentConverter`] from the `.md`. If conversion fails, the `.txt` and `.md`
//! stay on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::contract::{ConvertError, DocumentConverter};
use crate::persist::write_atomic;

pub const TEXT_EXTENSION: &str = ".txt";

#[derive(Debug)]
pub enum Aggregation {
    /// The directory held no text files; nothing was written.
    Empty,
    Combined(CombinedArtifact),
}

/// The three co-located representations of one directory's combined content.
#[derive(Debug, Clone)]
pub struct CombinedArtifact {
    pub name: String,
    /// Files that were concatenated, in order.
    pub sources: Vec<PathBuf>,
    pub text: PathBuf,
    pub markdown: PathBuf,
    pub document: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot derive an artifact name from {0}")]
    NoBaseName(PathBuf),
    #[error("converting {markdown} failed: {source}")]
    Conversion {
        markdown: PathBuf,
        #[source]
        source: ConvertError,
    },
}

/// True for names ending in `.txt`.
pub fn is_text_file_name(name: &str) -> bool {
    name.ends_with(TEXT_EXTENSION)
}

/// Base name used for the combined artifact of `dir`.
pub fn artifact_name(dir: &Path) -> Option<String> {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}

/// `<output_root>/<name>.txt` for `dir`; its existence marks the directory as aggregated.
pub fn combined_text_path(dir: &Path, output_root: &Path) -> Option<PathBuf> {
    artifact_name(dir).map(|name| output_root.join(format!("{name}.txt")))
}

/// Regular `.txt` files directly inside `dir`, sorted by file name.
/// A missing directory has no text files.
pub fn list_text_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_text = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(is_text_file_name)
            .unwrap_or(false);
        if is_text && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Joins the files' contents in the given order, one newline after each, and trims
/// trailing whitespace from the result.
pub fn combine_text_files(files: &[PathBuf]) -> Result<String, AggregateError> {
    let mut combined = String::new();
    for file in files {
        let content = fs::read_to_string(file).map_err(|source| AggregateError::Io {
            path: file.clone(),
            source,
        })?;
        combined.push_str(&content);
        combined.push('\n');
    }
    Ok(combined.trim_end().to_string())
}

/// Combines the `.txt` files directly inside `dir` into `<output_root>/<name>.{txt,md,odt}`.
pub fn aggregate<C>(
    dir: &Path,
    output_root: &Path,
    converter: &C,
) -> Result<Aggregation, AggregateError>
where
    C: DocumentConverter + ?Sized,
{
    let files = list_text_files(dir).map_err(|source| AggregateError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    aggregate_files(dir, files, output_root, converter)
}

/// Combines exactly `files`, in the given order, into the artifact named after `dir`.
///
/// Used when the caller knows which files belong to the directory, e.g. for the input
/// root, whose mirror is the output root and also holds other directories' artifacts.
pub fn aggregate_files<C>(
    dir: &Path,
    files: Vec<PathBuf>,
    output_root: &Path,
    converter: &C,
) -> Result<Aggregation, AggregateError>
where
    C: DocumentConverter + ?Sized,
{
    if files.is_empty() {
        debug!(dir = %dir.display(), "No text files to combine");
        return Ok(Aggregation::Empty);
    }

    let name = artifact_name(dir).ok_or_else(|| AggregateError::NoBaseName(dir.to_path_buf()))?;
    let combined = combine_text_files(&files)?;

    let text = output_root.join(format!("{name}.txt"));
    let markdown = output_root.join(format!("{name}.md"));
    let document = output_root.join(format!("{name}.odt"));

    // The .txt doubles as the "already aggregated" marker, so it goes last.
    for path in [&markdown, &text] {
        write_atomic(path, &combined).map_err(|source| AggregateError::Io {
            path: path.clone(),
            source,
        })?;
    }
    info!(
        dir = %dir.display(),
        files = files.len(),
        path = %text.display(),
        "Combined and saved"
    );

    if let Err(source) = converter.convert(&markdown, &document) {
        error!(markdown = %markdown.display(), error = %source, "Document conversion failed");
        return Err(AggregateError::Conversion { markdown, source });
    }
    info!(
        markdown = %markdown.display(),
        document = %document.display(),
        "Conversion successful"
    );

    Ok(Aggregation::Combined(CombinedArtifact {
        name,
        sources: files,
        text,
        markdown,
        document,
    }))
}

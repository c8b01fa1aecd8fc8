//! Traversal engine: walks the input tree, reorganises every `.txt` file once, and
//! combines each directory's results.
//!
//! # Workflow
//! Directories are visited top-down (pre-order, names sorted). For each directory:
//!   1. every `.txt` file is mirrored to the output tree, unless the mirrored path already
//!      exists; the text goes through the [`TextTransformer`] and the result is written once
//!   2. the mirrored outputs of that directory's own `.txt` files are combined with
//!      [`aggregate_files`] unless its combined `.txt` already exists
//!   3. the configured delay is awaited, to stay under the text service's rate limits
//!
//! # Progress tracking
//! The output tree is the only state. A mirrored file that exists is done; a combined
//! `<name>.txt` that exists means the directory is done. Re-running over the same input
//! therefore resumes an interrupted run and does nothing for finished work.
//!
//! # Error Handling
//! - a failed transformation is logged, recorded in the report and the file is skipped
//! - any aggregation failure (including conversion) is logged and traversal continues
//! - filesystem errors while reading sources or writing per-file outputs abort the run

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::aggregate::{aggregate_files, combined_text_path, is_text_file_name, Aggregation};
use crate::contract::{DocumentConverter, TextTransformer};
use crate::persist::write_new_atomic;

#[derive(Debug, Clone)]
pub struct TraversalConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    /// Pause after each directory. Zero disables it.
    pub directory_delay: Duration,
}

/// What one traversal pass did.
#[derive(Debug, Default)]
pub struct TraversalReport {
    pub directories: usize,
    /// Per-file outputs written during this pass.
    pub processed: Vec<PathBuf>,
    /// Source files whose output already existed.
    pub skipped: usize,
    /// Source files the transformer failed on; nothing was written for them.
    pub failed: Vec<PathBuf>,
    /// Combined `.txt` artifacts written during this pass.
    pub aggregated: Vec<PathBuf>,
    /// Directories whose combined artifact already existed.
    pub aggregation_skipped: usize,
    /// Source directories whose aggregation failed.
    pub aggregation_failures: Vec<PathBuf>,
}

impl TraversalReport {
    /// True when nothing failed during the pass.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.aggregation_failures.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TraverseError {
    #[error("input root {0} is not a directory")]
    MissingInputRoot(PathBuf),
    #[error("{path} is not under input root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> TraverseError + '_ {
    move |source| TraverseError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Maps `path` under `input_root` to the same relative location under `output_root`.
pub fn mirror_path(
    input_root: &Path,
    output_root: &Path,
    path: &Path,
) -> Result<PathBuf, TraverseError> {
    let relative = path
        .strip_prefix(input_root)
        .map_err(|_| TraverseError::OutsideRoot {
            path: path.to_path_buf(),
            root: input_root.to_path_buf(),
        })?;
    if relative.as_os_str().is_empty() {
        Ok(output_root.to_path_buf())
    } else {
        Ok(output_root.join(relative))
    }
}

struct Listing {
    files: Vec<PathBuf>,
    subdirs: Vec<PathBuf>,
}

/// Text files and subdirectories of `dir`, each sorted by name. Symlinked
/// directories are not followed.
fn read_listing(dir: &Path) -> Result<Listing, TraverseError> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let entry = entry.map_err(io_err(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_err(&path))?;
        if file_type.is_dir() {
            subdirs.push(path);
        } else if entry
            .file_name()
            .to_str()
            .map(is_text_file_name)
            .unwrap_or(false)
            && path.is_file()
        {
            files.push(path);
        }
    }
    files.sort();
    subdirs.sort();
    Ok(Listing { files, subdirs })
}

/// Runs one full pass over `config.input_root`.
pub async fn run<T, C>(
    config: &TraversalConfig,
    transformer: &T,
    converter: &C,
) -> Result<TraversalReport, TraverseError>
where
    T: TextTransformer + ?Sized,
    C: DocumentConverter + ?Sized,
{
    if !config.input_root.is_dir() {
        error!(input_root = %config.input_root.display(), "Input root is not a directory");
        return Err(TraverseError::MissingInputRoot(config.input_root.clone()));
    }
    fs::create_dir_all(&config.output_root).map_err(io_err(&config.output_root))?;
    // An output tree nested inside the input tree must not be walked as input.
    let output_canonical = fs::canonicalize(&config.output_root).ok();

    info!(
        input_root = %config.input_root.display(),
        output_root = %config.output_root.display(),
        delay_secs = config.directory_delay.as_secs_f64(),
        "Starting traversal"
    );

    let mut report = TraversalReport::default();
    let mut pending = vec![config.input_root.clone()];

    while let Some(dir) = pending.pop() {
        let listing = read_listing(&dir)?;
        report.directories += 1;
        info!(dir = %dir.display(), files = listing.files.len(), "Entering directory");

        for file in &listing.files {
            process_file(config, transformer, file, &mut report).await?;
        }

        if listing.files.is_empty() {
            debug!(dir = %dir.display(), "No text files, nothing to combine");
        } else {
            attempt_aggregation(config, converter, &dir, &listing.files, &mut report)?;
        }

        if !config.directory_delay.is_zero() {
            debug!(delay_secs = config.directory_delay.as_secs_f64(), "Waiting before next directory");
            tokio::time::sleep(config.directory_delay).await;
        }

        // Reversed so the stack pops them in name order.
        for sub in listing.subdirs.into_iter().rev() {
            if output_canonical.is_some() && fs::canonicalize(&sub).ok() == output_canonical {
                debug!(dir = %sub.display(), "Skipping output root inside input root");
                continue;
            }
            pending.push(sub);
        }
    }

    info!(
        directories = report.directories,
        processed = report.processed.len(),
        skipped = report.skipped,
        failed = report.failed.len(),
        aggregated = report.aggregated.len(),
        aggregation_failures = report.aggregation_failures.len(),
        "Traversal complete"
    );
    Ok(report)
}

async fn process_file<T>(
    config: &TraversalConfig,
    transformer: &T,
    file: &Path,
    report: &mut TraversalReport,
) -> Result<(), TraverseError>
where
    T: TextTransformer + ?Sized,
{
    let output = mirror_path(&config.input_root, &config.output_root, file)?;
    debug!(input = %file.display(), output = %output.display(), "Visiting file");

    if output.exists() {
        info!(path = %output.display(), "Already processed, skipping");
        report.skipped += 1;
        return Ok(());
    }

    let text = fs::read_to_string(file).map_err(io_err(file))?;
    match transformer.transform(&text).await {
        Ok(organized) => {
            write_new_atomic(&output, organized).map_err(io_err(&output))?;
            info!(path = %output.display(), "Processed and saved");
            report.processed.push(output);
        }
        Err(e) => {
            error!(input = %file.display(), path = %output.display(), error = %e, "Not processed");
            report.failed.push(file.to_path_buf());
        }
    }
    Ok(())
}

fn attempt_aggregation<C>(
    config: &TraversalConfig,
    converter: &C,
    dir: &Path,
    sources: &[PathBuf],
    report: &mut TraversalReport,
) -> Result<(), TraverseError>
where
    C: DocumentConverter + ?Sized,
{
    let mirror = mirror_path(&config.input_root, &config.output_root, dir)?;
    let marker = match combined_text_path(&mirror, &config.output_root) {
        Some(marker) => marker,
        None => {
            warn!(dir = %mirror.display(), "Directory has no base name, not combining");
            return Ok(());
        }
    };
    if marker.exists() {
        debug!(path = %marker.display(), "Already combined, skipping");
        report.aggregation_skipped += 1;
        return Ok(());
    }

    // Built from the source listing: the root's mirror is the output root, which also
    // holds every other directory's combined artifact.
    let mut outputs = Vec::with_capacity(sources.len());
    for source in sources {
        let output = mirror_path(&config.input_root, &config.output_root, source)?;
        if output.is_file() {
            outputs.push(output);
        }
    }

    match aggregate_files(&mirror, outputs, &config.output_root, converter) {
        Ok(Aggregation::Combined(artifact)) => report.aggregated.push(artifact.text),
        Ok(Aggregation::Empty) => {
            debug!(dir = %mirror.display(), "Nothing processed yet, nothing combined");
        }
        Err(e) => {
            error!(dir = %dir.display(), error = %e, "Combining directory failed");
            report.aggregation_failures.push(dir.to_path_buf());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_preserves_relative_structure() {
        let out = mirror_path(
            Path::new("/in"),
            Path::new("/out"),
            Path::new("/in/X/Y/f.txt"),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/out/X/Y/f.txt"));
    }

    #[test]
    fn mirror_of_root_is_output_root() {
        let out = mirror_path(Path::new("/in"), Path::new("/out"), Path::new("/in")).unwrap();
        assert_eq!(out, PathBuf::from("/out"));
    }

    #[test]
    fn mirror_rejects_paths_outside_root() {
        let err = mirror_path(Path::new("/in"), Path::new("/out"), Path::new("/other/f.txt"));
        assert!(matches!(err, Err(TraverseError::OutsideRoot { .. })));
    }

    #[test]
    fn report_is_clean_without_failures() {
        let mut report = TraversalReport::default();
        assert!(report.is_clean());
        report.failed.push(PathBuf::from("a.txt"));
        assert!(!report.is_clean());
    }
}

//! File-level conversion pipeline.
//!
//! Ties the stages together for the CLI: read a `.gb` file, parse it,
//! render the feature table, apply the post-processing rules, and write
//! the `.tbl` file next to the input (or into an output directory).
//!
//! Each file is processed independently with no shared state, so a
//! failure only affects that file; batch mode records it and moves on.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::formats::{self, ParseError};
use crate::{rules, table};

/// Errors that can occur while converting one file.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Failed to write output: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Input file name has no stem: {}", .0.display())]
    NoFileStem(PathBuf),
}

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Outcome of a batch run over a directory.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Output paths of successfully converted files.
    pub converted: Vec<PathBuf>,
    /// Input paths that failed, with the error for each.
    pub failed: Vec<(PathBuf, ConvertError)>,
}

impl BatchOutcome {
    /// True when every file converted.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Converts GenBank text to feature-table text.
///
/// This is the whole transformation minus the filesystem: parse, render,
/// apply Rules 1-4, serialize.
pub fn convert_str(content: &str) -> ConvertResult<String> {
    let record = formats::parse_str(content)?;
    let mut table = table::render(&record);
    rules::apply_rules(&mut table);
    Ok(table.to_text())
}

/// Converts one GenBank file, writing `<stem>.tbl`.
///
/// The output lands in `output_dir` when given (created if missing),
/// otherwise beside the input. Returns the output path.
pub fn process_file(input: &Path, output_dir: Option<&Path>) -> ConvertResult<PathBuf> {
    let record = formats::parse_file(input)?;
    let mut table = table::render(&record);
    rules::apply_rules(&mut table);

    let stem = input
        .file_stem()
        .ok_or_else(|| ConvertError::NoFileStem(input.to_path_buf()))?;
    let file_name = Path::new(stem).with_extension("tbl");
    let output = match output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dir.join(file_name)
        }
        None => input.with_file_name(file_name),
    };

    fs::write(&output, table.to_text())?;
    Ok(output)
}

/// Converts every GenBank file in a directory.
///
/// Files are selected by `extension` when given, otherwise by the
/// default GenBank extensions (see `formats::is_genbank_extension`).
/// The output directory is created if missing. Per-file failures are
/// collected in the outcome; they do not stop the batch.
pub fn process_dir(
    input_dir: &Path,
    output_dir: Option<&Path>,
    extension: Option<&str>,
) -> std::io::Result<BatchOutcome> {
    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)?;
    }

    let mut inputs: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| match extension {
            Some(ext) => path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case(ext)),
            None => formats::is_genbank_extension(path),
        })
        .collect();
    // Deterministic processing order regardless of directory iteration.
    inputs.sort();

    let mut outcome = BatchOutcome::default();
    for input in inputs {
        match process_file(&input, output_dir) {
            Ok(output) => outcome.converted.push(output),
            Err(e) => outcome.failed.push((input, e)),
        }
    }
    Ok(outcome)
}

//! GenBank input handling.
//!
//! Reads `.gb` flat files from disk and hands them to the record
//! parser. Recognized extensions for batch mode:
//! - GenBank (.gb, .gbk, .gbff, .genbank)

pub mod genbank;

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use thiserror::Error;

use crate::model::GenBankRecord;

/// Errors that can occur while reading and parsing an input file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty file")]
    EmptyFile,

    #[error("GenBank error: {0}")]
    GenBankError(#[from] genbank::GenBankError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Returns true for file extensions treated as GenBank input when
/// scanning a directory without an explicit extension filter.
pub fn is_genbank_extension<P: AsRef<Path>>(path: P) -> bool {
    let Some(ext) = path.as_ref().extension().and_then(OsStr::to_str) else {
        return false;
    };
    matches!(
        ext.to_lowercase().as_str(),
        "gb" | "gbk" | "gbff" | "genbank"
    )
}

/// Reads and parses one GenBank file.
///
/// The file is opened, fully read, and closed before parsing begins, so
/// the handle is released even when parsing fails.
pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<GenBankRecord> {
    let content = {
        let file = File::open(&path)?;
        let file_size = file.metadata()?.len() as usize;
        if file_size == 0 {
            return Err(ParseError::EmptyFile);
        }
        let mut reader = BufReader::with_capacity(64 * 1024, file);
        let mut content = String::with_capacity(file_size);
        reader.read_to_string(&mut content)?;
        content
    };

    Ok(genbank::parse_genbank_str(&content)?)
}

/// Parses GenBank content from a string.
///
/// Useful for testing or processing in-memory data.
pub fn parse_str(content: &str) -> ParseResult<GenBankRecord> {
    if content.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }
    Ok(genbank::parse_genbank_str(content)?)
}

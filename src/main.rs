//! gbtbl - GenBank to NCBI Feature Table Converter
//!
//! Converts GenBank flat files to NCBI five-column feature tables.
//!
//! ## Usage
//!
//! ```bash
//! gbtbl sequence.gb                      # writes sequence.tbl beside the input
//! gbtbl sequence.gb -o tables/           # writes into tables/
//! gbtbl -i genbank_files/ -o tables/     # batch mode over a directory
//! gbtbl -i genbank_files/ -e gbk         # only *.gbk files
//! ```
//!
//! Exit status is 0 only when every file converted; a file that fails
//! to parse is reported and skipped, and the run exits non-zero.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use gbtbl::convert::{process_dir, process_file};

/// Convert GenBank flat files (.gb) to NCBI five-column feature tables (.tbl)
///
/// Applies four cleanup rules to the rendered table: gene qualifiers are
/// dropped from mRNA features, deprecated label qualifiers are dropped
/// from CDS features and renamed to note elsewhere, and database
/// prefixes (gb|...|) are stripped from the header.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GenBank file to convert (single-file mode)
    file: Option<PathBuf>,

    /// Input directory (batch mode, converts every GenBank file in it)
    #[arg(short = 'i', long = "input", conflicts_with = "file")]
    input: Option<PathBuf>,

    /// Output directory (created if missing; default: beside each input)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Only convert files with this extension in batch mode
    /// (default: gb, gbk, gbff, genbank)
    #[arg(short = 'e', long = "extension", requires = "input")]
    extension: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(input_dir) = args.input {
        if !input_dir.is_dir() {
            anyhow::bail!("Input directory '{}' not found", input_dir.display());
        }

        let outcome = process_dir(&input_dir, args.output.as_deref(), args.extension.as_deref())?;
        for output in &outcome.converted {
            eprintln!("✓ Processed: {}", output.display());
        }
        for (input, error) in &outcome.failed {
            eprintln!("✗ Error processing {}: {}", input.display(), error);
        }
        eprintln!(
            "Processing complete! Generated {} feature table files.",
            outcome.converted.len()
        );
        if !outcome.is_success() {
            anyhow::bail!(
                "{} of {} files failed",
                outcome.failed.len(),
                outcome.failed.len() + outcome.converted.len()
            );
        }
    } else if let Some(file) = args.file {
        if !file.is_file() {
            anyhow::bail!("File '{}' not found", file.display());
        }

        match process_file(&file, args.output.as_deref()) {
            Ok(output) => eprintln!("✓ Successfully generated: {}", output.display()),
            Err(e) => {
                eprintln!("✗ Error processing {}: {}", file.display(), e);
                anyhow::bail!("conversion failed");
            }
        }
    } else {
        anyhow::bail!("No input given. Pass a GenBank file, or -i <dir> for batch mode.");
    }

    Ok(())
}

//! NCBI five-column feature table rendering.
//!
//! Converts a parsed record into tagged rows and serializes them as
//! `.tbl` text:
//!
//! ```text
//! >Feature EU382073.1
//! 12	78	mRNA
//! 134	202
//! 			product	heavy metal ATPase 4
//! ```
//!
//! A feature's first span carries the feature key in column three;
//! continuation spans repeat only the coordinates. Complement spans are
//! written end-before-start, the five-column convention for the reverse
//! strand. Qualifier rows put the tag in column four and the value in
//! column five.
//!
//! The post-processing rules (see `rules`) operate on the `Row` stream
//! produced here, never on the structured features, so the renderer is
//! the single place that decides column layout.

use std::fmt::Write as _;

use crate::model::{Feature, GenBankRecord};
use crate::rules;

/// One output row of the feature table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// A location row; `key` is present only on a feature's first span.
    Location {
        start: u64,
        end: u64,
        key: Option<String>,
    },
    /// A qualifier row (tag in column four, value in column five).
    Qualifier { name: String, value: Option<String> },
}

/// A rendered feature table: the cleaned header ID plus the row stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTable {
    pub sequence_id: String,
    pub rows: Vec<Row>,
}

impl FeatureTable {
    /// Serializes the table as `.tbl` text, with a trailing newline.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        // Infallible: writing to a String cannot fail.
        let _ = writeln!(out, ">Feature {}", self.sequence_id);
        for row in &self.rows {
            match row {
                Row::Location { start, end, key } => match key {
                    Some(key) => {
                        let _ = writeln!(out, "{start}\t{end}\t{key}");
                    }
                    None => {
                        let _ = writeln!(out, "{start}\t{end}");
                    }
                },
                Row::Qualifier { name, value } => match value.as_deref() {
                    Some(value) if !value.is_empty() => {
                        let _ = writeln!(out, "\t\t\t{name}\t{value}");
                    }
                    // Valueless or empty: tag only, value column empty.
                    _ => {
                        let _ = writeln!(out, "\t\t\t{name}");
                    }
                },
            }
        }
        out
    }
}

/// Renders a record into a feature table.
///
/// `source` features describe the whole sequence and have no place in a
/// submission table, so they are skipped. Header cleaning (the
/// `db|...|` prefix strip) is applied here rather than as a later text
/// pass, so the header never needs re-parsing.
pub fn render(record: &GenBankRecord) -> FeatureTable {
    let mut rows = Vec::new();
    for feature in &record.features {
        if feature.has_key("source") {
            continue;
        }
        push_feature_rows(feature, &mut rows);
    }
    FeatureTable {
        sequence_id: rules::clean_sequence_id(record.sequence_id()),
        rows,
    }
}

fn push_feature_rows(feature: &Feature, rows: &mut Vec<Row>) {
    for (i, span) in feature.spans.iter().enumerate() {
        // Reverse-strand spans swap the coordinates.
        let (start, end) = if span.complement {
            (span.end, span.start)
        } else {
            (span.start, span.end)
        };
        rows.push(Row::Location {
            start,
            end,
            key: (i == 0).then(|| feature.key.clone()),
        });
    }
    for qualifier in &feature.qualifiers {
        rows.push(Row::Qualifier {
            name: qualifier.name.clone(),
            value: qualifier.value.clone(),
        });
    }
}

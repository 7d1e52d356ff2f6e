//! GenBank flat-file parser.
//!
//! Extracts header metadata and the FEATURES block from one `.gb`
//! record.
//!
//! ## GenBank Format
//!
//! ```text
//! LOCUS       EU382073    5163 bp    DNA     linear   PLN 01-JAN-2008
//! ACCESSION   EU382073
//! VERSION     EU382073.1
//! FEATURES             Location/Qualifiers
//!      source          1..5163
//!                      /organism="Arabidopsis halleri"
//!      mRNA            join(12..78,134..202)
//!                      /gene="HMA4"
//!                      /product="heavy metal ATPase 4"
//!      CDS             complement(340..565)
//!                      /note="this value wraps
//!                      onto the next line"
//! ORIGIN
//!         1 acgt...
//! //
//! ```
//!
//! Feature keys sit at a 5-space indent with the location to their
//! right; qualifier and continuation lines sit at a deeper indent.
//! Locations and qualifier values, quoted or not, may wrap across
//! lines; wrapped values are joined with single spaces.
//!
//! ## Relaxed Parsing
//!
//! This parser is lenient about:
//! - Exact indent depth of qualifier/continuation lines
//! - Case of feature keys
//! - Missing LOCUS/ACCESSION/VERSION lines (any subset may be absent)
//!
//! It rejects records with no FEATURES section, qualifier lines that
//! appear before any feature key, and locations that do not match the
//! grammar (see `location`).

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::location::{self, LocationError};
use crate::model::{Feature, GenBankRecord, Qualifier};

/// Qualifiers never copied into the feature table.
const EXCLUDED_QUALIFIERS: [&str; 2] = ["codon_start", "translation"];

/// Errors that can occur during GenBank parsing.
#[derive(Error, Debug)]
pub enum GenBankError {
    #[error("no FEATURES section found")]
    MissingFeatures,

    #[error("line {line}: qualifier before any feature key: '{text}'")]
    QualifierBeforeFeature { line: usize, text: String },

    #[error("line {line}: malformed feature line: '{text}'")]
    MalformedFeature { line: usize, text: String },

    #[error("line {line}: invalid location '{text}': {source}")]
    InvalidLocation {
        line: usize,
        text: String,
        source: LocationError,
    },
}

/// Result type for GenBank parsing.
pub type GenBankResult<T> = Result<T, GenBankError>;

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^VERSION\s+(\S+)").expect("valid regex"))
}

fn accession_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^ACCESSION\s+(\S+)").expect("valid regex"))
}

fn locus_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^LOCUS\s+(.+)$").expect("valid regex"))
}

fn qualifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/([\w\-]+)(?:=(.*))?$").expect("valid regex"))
}

/// Parses one GenBank record from a string.
pub fn parse_genbank_str(content: &str) -> GenBankResult<GenBankRecord> {
    let mut record = parse_header(content);
    record.features = parse_features(content)?;
    Ok(record)
}

/// Extracts LOCUS/ACCESSION/VERSION metadata. All fields are optional;
/// a record missing them still parses (the renderer falls back to
/// `"sequence"` as the ID).
fn parse_header(content: &str) -> GenBankRecord {
    let mut record = GenBankRecord::default();

    if let Some(caps) = version_re().captures(content) {
        record.version = Some(caps[1].to_string());
    }
    if let Some(caps) = accession_re().captures(content) {
        record.accession = Some(caps[1].to_string());
    }
    if let Some(caps) = locus_re().captures(content) {
        // LOCUS NAME LENGTH bp TYPE [TOPOLOGY] [DIVISION] [DATE]
        let tokens: Vec<&str> = caps[1].split_whitespace().collect();
        record.locus_name = tokens.first().map(|t| t.to_string());
        for (i, token) in tokens.iter().enumerate() {
            match *token {
                "bp" | "aa" => {
                    if i > 0 {
                        record.length = tokens[i - 1].parse().ok();
                    }
                    record.molecule_type = tokens.get(i + 1).map(|t| t.to_string());
                }
                "linear" | "circular" => {
                    record.topology = Some(token.to_string());
                }
                _ => {}
            }
        }
    }

    record
}

/// Accumulates one feature while its continuation lines are consumed.
struct FeatureBuilder {
    key: String,
    location_text: String,
    location_line: usize,
    qualifiers: Vec<Qualifier>,
}

impl FeatureBuilder {
    fn finish(self) -> GenBankResult<Feature> {
        let loc = location::parse_location(&self.location_text).map_err(|source| {
            GenBankError::InvalidLocation {
                line: self.location_line,
                text: self.location_text.clone(),
                source,
            }
        })?;
        Ok(Feature {
            key: self.key,
            spans: loc.spans(),
            qualifiers: self.qualifiers,
        })
    }
}

/// Where continuation text belongs while a quoted value is open.
enum QuoteTarget {
    /// Append to the last kept qualifier's value.
    Keep,
    /// The qualifier is excluded; consume its lines and drop them.
    Discard,
}

/// Parses the FEATURES block into an ordered feature list.
fn parse_features(content: &str) -> GenBankResult<Vec<Feature>> {
    let mut features = Vec::new();
    let mut in_features = false;
    let mut seen_features = false;
    let mut current: Option<FeatureBuilder> = None;
    // Open multi-line quoted qualifier value, if any.
    let mut open_quote: Option<QuoteTarget> = None;

    for (idx, line) in content.lines().enumerate() {
        let line_number = idx + 1;

        if !in_features {
            if line.starts_with("FEATURES") {
                in_features = true;
                seen_features = true;
            }
            continue;
        }
        if line.starts_with("ORIGIN") || line.starts_with("BASE COUNT") || line.starts_with("//") {
            break;
        }

        let indent = line.len() - line.trim_start().len();
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        // Column-0 keywords inside the region (e.g. CONTIG) are
        // record-level lines, not feature data.
        if indent == 0 {
            continue;
        }

        // Feature key lines sit at the shallow indent (5 columns in
        // well-formed files); anything deeper belongs to the current
        // feature.
        let is_key_line = indent > 0 && indent < 10 && !text.starts_with('/');

        if is_key_line {
            if let Some(builder) = current.take() {
                features.push(builder.finish()?);
            }
            open_quote = None;

            let (key, rest) = match text.split_once(char::is_whitespace) {
                Some((key, rest)) if !rest.trim().is_empty() => (key, rest.trim()),
                _ => {
                    return Err(GenBankError::MalformedFeature {
                        line: line_number,
                        text: text.to_string(),
                    })
                }
            };
            current = Some(FeatureBuilder {
                key: key.to_string(),
                location_text: rest.to_string(),
                location_line: line_number,
                qualifiers: Vec::new(),
            });
            continue;
        }

        // Continuation of an open quoted value, unless a new qualifier
        // starts (tolerates a missing closing quote).
        if let Some(target) = &open_quote {
            if !text.starts_with('/') {
                let (chunk, closes) = match text.strip_suffix('"') {
                    Some(stripped) => (stripped, true),
                    None => (text, false),
                };
                if let (QuoteTarget::Keep, Some(builder)) = (target, current.as_mut()) {
                    if let Some(Qualifier {
                        value: Some(value), ..
                    }) = builder.qualifiers.last_mut()
                    {
                        value.push(' ');
                        value.push_str(chunk);
                    }
                }
                if closes {
                    open_quote = None;
                }
                continue;
            }
            open_quote = None;
        }

        if let Some(caps) = qualifier_re().captures(text) {
            let Some(builder) = current.as_mut() else {
                return Err(GenBankError::QualifierBeforeFeature {
                    line: line_number,
                    text: text.to_string(),
                });
            };

            let name = caps[1].to_string();
            let excluded = EXCLUDED_QUALIFIERS
                .iter()
                .any(|q| name.eq_ignore_ascii_case(q));

            let mut value = caps.get(2).map(|m| m.as_str().trim_end().to_string());
            if let Some(v) = value.take() {
                if let Some(rest) = v.strip_prefix('"') {
                    match rest.strip_suffix('"') {
                        // "..." on one line (also covers the empty "")
                        Some(inner) => value = Some(inner.to_string()),
                        None => {
                            value = Some(rest.to_string());
                            open_quote = Some(if excluded {
                                QuoteTarget::Discard
                            } else {
                                QuoteTarget::Keep
                            });
                        }
                    }
                } else {
                    value = Some(v.trim().to_string());
                }
            }

            if !excluded {
                builder.qualifiers.push(Qualifier { name, value });
            }
            continue;
        }

        // Deep-indent line with no '/' and no open quote: a wrapped
        // location while no qualifier has been seen yet, otherwise the
        // continuation of an unquoted qualifier value.
        match current.as_mut() {
            Some(builder) if builder.qualifiers.is_empty() => {
                builder.location_text.push_str(text);
            }
            Some(builder) => {
                if let Some(Qualifier {
                    value: Some(value), ..
                }) = builder.qualifiers.last_mut()
                {
                    value.push(' ');
                    value.push_str(text);
                }
                // A bare flag qualifier has no value to continue; drop
                // the stray line.
            }
            None => {
                return Err(GenBankError::QualifierBeforeFeature {
                    line: line_number,
                    text: text.to_string(),
                });
            }
        }
    }

    if let Some(builder) = current.take() {
        features.push(builder.finish()?);
    }

    if !seen_features {
        return Err(GenBankError::MissingFeatures);
    }

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Span;

    const SAMPLE: &str = "\
LOCUS       EU382073                5163 bp    DNA     linear   PLN 01-JAN-2008
DEFINITION  Arabidopsis halleri heavy metal ATPase 4 (HMA4) gene.
ACCESSION   EU382073
VERSION     EU382073.1
FEATURES             Location/Qualifiers
     source          1..5163
                     /organism=\"Arabidopsis halleri\"
                     /mol_type=\"genomic DNA\"
     gene            <12..>3311
                     /gene=\"HMA4\"
     mRNA            join(12..78,134..202)
                     /gene=\"HMA4\"
                     /product=\"heavy metal ATPase 4\"
     CDS             complement(join(340..565,620..790))
                     /gene=\"HMA4\"
                     /codon_start=1
                     /translation=\"MALQNKEEKSGAIALE
                     RKNDDVKSTSLE\"
                     /product=\"heavy metal ATPase 4\"
ORIGIN
        1 acgtacgtac gtacgtacgt
//
";

    #[test]
    fn test_parse_header_metadata() {
        let record = parse_genbank_str(SAMPLE).unwrap();
        assert_eq!(record.locus_name.as_deref(), Some("EU382073"));
        assert_eq!(record.length, Some(5163));
        assert_eq!(record.molecule_type.as_deref(), Some("DNA"));
        assert_eq!(record.topology.as_deref(), Some("linear"));
        assert_eq!(record.accession.as_deref(), Some("EU382073"));
        assert_eq!(record.version.as_deref(), Some("EU382073.1"));
        assert_eq!(record.sequence_id(), "EU382073.1");
    }

    #[test]
    fn test_parse_feature_list() {
        let record = parse_genbank_str(SAMPLE).unwrap();
        let keys: Vec<&str> = record.features.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["source", "gene", "mRNA", "CDS"]);
    }

    #[test]
    fn test_partial_markers_stripped() {
        let record = parse_genbank_str(SAMPLE).unwrap();
        let gene = &record.features[1];
        assert_eq!(gene.spans, vec![Span::new(12, 3311)]);
    }

    #[test]
    fn test_join_location() {
        let record = parse_genbank_str(SAMPLE).unwrap();
        let mrna = &record.features[2];
        assert_eq!(mrna.spans, vec![Span::new(12, 78), Span::new(134, 202)]);
    }

    #[test]
    fn test_excluded_qualifiers_dropped() {
        let record = parse_genbank_str(SAMPLE).unwrap();
        let cds = &record.features[3];
        let names: Vec<&str> = cds.qualifiers.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(names, vec!["gene", "product"]);
    }

    #[test]
    fn test_multiline_translation_consumed_silently() {
        // The wrapped translation value must not leak into the next
        // qualifier or the location of a later feature.
        let record = parse_genbank_str(SAMPLE).unwrap();
        let cds = &record.features[3];
        assert_eq!(
            cds.qualifiers.last().unwrap().value.as_deref(),
            Some("heavy metal ATPase 4")
        );
    }

    #[test]
    fn test_multiline_qualifier_joined_with_spaces() {
        let content = "\
FEATURES             Location/Qualifiers
     misc_feature    1..10
                     /note=\"this is a
                     long note\"
";
        let record = parse_genbank_str(content).unwrap();
        let q = &record.features[0].qualifiers[0];
        assert_eq!(q.value.as_deref(), Some("this is a long note"));
    }

    #[test]
    fn test_unquoted_multiline_qualifier_joined() {
        let content = "\
FEATURES             Location/Qualifiers
     misc_feature    1..10
                     /note=this is a
                     long note
                     /standard_name=x
";
        let record = parse_genbank_str(content).unwrap();
        let quals = &record.features[0].qualifiers;
        assert_eq!(quals[0].value.as_deref(), Some("this is a long note"));
        assert_eq!(quals[1].value.as_deref(), Some("x"));
    }

    #[test]
    fn test_wrapped_location() {
        let content = "\
FEATURES             Location/Qualifiers
     CDS             join(1..10,
                     20..30)
                     /product=\"x\"
";
        let record = parse_genbank_str(content).unwrap();
        assert_eq!(
            record.features[0].spans,
            vec![Span::new(1, 10), Span::new(20, 30)]
        );
    }

    #[test]
    fn test_bare_flag_qualifier() {
        let content = "\
FEATURES             Location/Qualifiers
     gene            1..10
                     /pseudo
";
        let record = parse_genbank_str(content).unwrap();
        let q = &record.features[0].qualifiers[0];
        assert_eq!(q.name, "pseudo");
        assert_eq!(q.value, None);
    }

    #[test]
    fn test_empty_quoted_value_kept() {
        let content = "\
FEATURES             Location/Qualifiers
     misc_feature    1..10
                     /note=\"\"
";
        let record = parse_genbank_str(content).unwrap();
        let q = &record.features[0].qualifiers[0];
        assert_eq!(q.value.as_deref(), Some(""));
    }

    #[test]
    fn test_missing_features_section() {
        let content = "LOCUS       X 100 bp DNA linear\nORIGIN\n";
        assert!(matches!(
            parse_genbank_str(content),
            Err(GenBankError::MissingFeatures)
        ));
    }

    #[test]
    fn test_qualifier_before_feature_key() {
        let content = "\
FEATURES             Location/Qualifiers
                     /gene=\"HMA4\"
     gene            1..10
";
        let err = parse_genbank_str(content).unwrap_err();
        assert!(matches!(
            err,
            GenBankError::QualifierBeforeFeature { line: 2, .. }
        ));
    }

    #[test]
    fn test_invalid_location_reports_line() {
        let content = "\
FEATURES             Location/Qualifiers
     gene            nonsense
";
        let err = parse_genbank_str(content).unwrap_err();
        match err {
            GenBankError::InvalidLocation { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_base_count_ends_features() {
        let content = "\
FEATURES             Location/Qualifiers
     gene            1..10
BASE COUNT     29 a     23 c
";
        let record = parse_genbank_str(content).unwrap();
        assert_eq!(record.features.len(), 1);
    }
}

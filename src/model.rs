//! Data model for GenBank records and their features.
//!
//! This module contains all data structures produced by parsing:
//! - `GenBankRecord`: header metadata plus the ordered feature list
//! - `Feature`: a feature key, its coordinate spans, and its qualifiers
//! - `Location`: the parsed location expression tree
//! - `Span`: one flattened coordinate interval with strand information
//!
//! Records are built once by the parser and are not mutated afterwards;
//! all post-processing happens on the rendered row stream (see `table`
//! and `rules`).

/// A single coordinate interval on the sequence.
///
/// Coordinates are 1-based and inclusive, as in the GenBank flat file.
/// Partial-boundary markers (`<`, `>`) are stripped during parsing and
/// only the numeric bound is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u64,
    pub end: u64,
    /// True if this interval lies on the reverse strand.
    pub complement: bool,
}

impl Span {
    /// Creates a forward-strand span.
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end,
            complement: false,
        }
    }
}

/// A parsed GenBank location expression.
///
/// The grammar is recursive: `complement()` and `join()` may nest, e.g.
/// `complement(join(5..10,20..25))` or `join(complement(1..10),20..30)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A simple range `a..b`.
    Range { start: u64, end: u64 },
    /// A single position `a`, equivalent to the range `a..a`.
    Point(u64),
    /// `join(loc1,loc2,...)` - an ordered list of sub-locations.
    Join(Vec<Location>),
    /// `complement(loc)` - the enclosed location on the reverse strand.
    Complement(Box<Location>),
}

impl Location {
    /// Flattens the expression tree into spans, in source order.
    ///
    /// Strand handling falls out of the traversal: each nesting level of
    /// `complement()` toggles the flag, so an inner `complement()` inside
    /// a complemented `join()` cancels back to the forward strand.
    /// The span order of a join is preserved even under complement.
    pub fn spans(&self) -> Vec<Span> {
        let mut out = Vec::new();
        self.collect_spans(false, &mut out);
        out
    }

    fn collect_spans(&self, complement: bool, out: &mut Vec<Span>) {
        match self {
            Location::Range { start, end } => out.push(Span {
                start: *start,
                end: *end,
                complement,
            }),
            Location::Point(pos) => out.push(Span {
                start: *pos,
                end: *pos,
                complement,
            }),
            Location::Join(parts) => {
                for part in parts {
                    part.collect_spans(complement, out);
                }
            }
            Location::Complement(inner) => inner.collect_spans(!complement, out),
        }
    }
}

/// A name/value annotation attached to a feature.
///
/// The value is `None` for bare flag qualifiers such as `/pseudo`.
/// An explicitly empty value (`/note=""`) is kept as `Some("")` so the
/// renderer can still emit the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualifier {
    pub name: String,
    pub value: Option<String>,
}

impl Qualifier {
    /// Creates a qualifier.
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One annotated feature from the FEATURES block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// The feature key (e.g. "CDS", "mRNA", "gene").
    pub key: String,
    /// Coordinate spans in source order; never empty for a parsed feature.
    pub spans: Vec<Span>,
    /// Qualifiers in source order; duplicate names are allowed.
    pub qualifiers: Vec<Qualifier>,
}

impl Feature {
    /// Compares the feature key case-insensitively.
    ///
    /// GenBank keys are case-sensitive in principle, but files in the
    /// wild mix `CDS`/`cds` and `mRNA`/`mrna`, so all key matching in
    /// this crate goes through this helper.
    pub fn has_key(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }
}

/// One parsed GenBank record: header metadata and the feature list.
#[derive(Debug, Clone, Default)]
pub struct GenBankRecord {
    /// First token of the LOCUS line.
    pub locus_name: Option<String>,
    /// Sequence length from the LOCUS line, when present.
    pub length: Option<u64>,
    /// Molecule type from the LOCUS line (e.g. "DNA", "mRNA").
    pub molecule_type: Option<String>,
    /// Topology from the LOCUS line ("linear" or "circular").
    pub topology: Option<String>,
    /// First token of the ACCESSION line.
    pub accession: Option<String>,
    /// First token of the VERSION line (e.g. "EU382073.1").
    pub version: Option<String>,
    /// Features in source order.
    pub features: Vec<Feature>,
}

impl GenBankRecord {
    /// Returns a stable sequence ID for the feature table header.
    ///
    /// Fixed precedence: VERSION, then ACCESSION, then LOCUS name, then
    /// the literal `"sequence"` as a last resort. The returned ID is
    /// raw; database prefix/suffix cleaning is applied at render time.
    pub fn sequence_id(&self) -> &str {
        self.version
            .as_deref()
            .or(self.accession.as_deref())
            .or(self.locus_name.as_deref())
            .unwrap_or("sequence")
    }
}

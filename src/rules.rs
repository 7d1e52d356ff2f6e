//! Post-processing rules for rendered feature tables.
//!
//! Four deterministic rewrites, applied in fixed order to the tagged
//! row stream produced by `table`:
//!
//! 1. Remove `gene` qualifier rows from `mRNA` blocks (the gene feature
//!    already carries it).
//! 2. Remove `label` qualifier rows from `CDS` blocks (`label` is a
//!    deprecated qualifier).
//! 3. Rename `label` to `note` in every other block, value unchanged.
//! 4. Strip a leading `db|` prefix and trailing `|` from the header ID
//!    (applied once, by the renderer, when the header is built).
//!
//! Rules 1-3 are idempotent and scoped to feature-block boundaries: a
//! block starts at a location row that carries a feature key, so a
//! qualifier row can never be attributed to the wrong feature. Rules
//! never fail; an unexpected row shape passes through unchanged.

use std::sync::OnceLock;

use regex::Regex;

use crate::table::{FeatureTable, Row};

/// Applies Rules 1-3 to the row stream, in order.
///
/// Rule 4 is the renderer's job: `table::render` cleans the header ID
/// exactly once when it builds the table. Cleaning strips a single
/// `db|` prefix, so re-running it on a chained ID like `ref|gb|X`
/// would strip further; keeping it out of this pass leaves the whole
/// pipeline idempotent.
pub fn apply_rules(table: &mut FeatureTable) {
    remove_qualifier_in("mRNA", "gene", &mut table.rows);
    remove_qualifier_in("CDS", "label", &mut table.rows);
    rename_label_to_note(&mut table.rows);
}

/// Rule 1 / Rule 2: drops qualifier rows with tag `name` from blocks
/// whose feature key is `key`.
fn remove_qualifier_in(key: &str, name: &str, rows: &mut Vec<Row>) {
    let mut in_target_block = false;
    rows.retain(|row| match row {
        Row::Location { key: Some(k), .. } => {
            in_target_block = k.eq_ignore_ascii_case(key);
            true
        }
        Row::Location { .. } => true,
        Row::Qualifier { name: n, .. } => !(in_target_block && n == name),
    });
}

/// Rule 3: renames `label` to `note` everywhere except CDS blocks,
/// which Rule 2 already handled.
fn rename_label_to_note(rows: &mut [Row]) {
    let mut in_cds_block = false;
    for row in rows {
        match row {
            Row::Location { key: Some(k), .. } => {
                in_cds_block = k.eq_ignore_ascii_case("CDS");
            }
            Row::Location { .. } => {}
            Row::Qualifier { name, .. } => {
                if !in_cds_block && name == "label" {
                    *name = "note".to_string();
                }
            }
        }
    }
}

fn db_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z]+\|").expect("valid regex"))
}

/// Rule 4: strips a single database prefix and one trailing pipe from
/// a sequence ID, e.g. `gb|EU382073.1|` becomes `EU382073.1`.
///
/// Applied once per table, by the renderer. An ID that comes out empty
/// falls back to `"sequence"` so the header always carries a token.
pub fn clean_sequence_id(id: &str) -> String {
    let id = id.trim();
    let id = db_prefix_re().replace(id, "");
    let id = id.strip_suffix('|').unwrap_or(&id).trim();
    if id.is_empty() {
        "sequence".to_string()
    } else {
        id.to_string()
    }
}

//! Substituting fenced JSON blocks for tables in the working text.

use log::debug;

use crate::{
    render::{NewlineMode, normalize_newlines},
    table::{RawTable, StructuredRow},
};

/// Render `rows` as a fenced `json` block on a single physical line.
///
/// The JSON is pretty-printed with two-space indentation and then has its
/// line breaks removed, so the indentation survives as runs of spaces. The
/// block is surrounded by one line break on each side.
///
/// # Examples
///
/// ```
/// use mdtablejson::splice::fenced_json;
/// assert_eq!(fenced_json(&[]), "\n```json\n[]\n```\n");
/// ```
#[must_use]
pub fn fenced_json(rows: &[StructuredRow]) -> String {
    let json = serde_json::to_string_pretty(rows).unwrap_or_else(|_| String::from("[]"));
    format!("\n```json\n{}\n```\n", json.replace('\n', ""))
}

/// Replace each table in `text` with its fenced JSON block.
///
/// The text is first newline-normalised with `mode`, and so is each table's
/// needle. Tables are applied in order, each replacing only the first
/// remaining occurrence of its needle in the text as modified so far. A
/// needle that no longer occurs leaves the text unchanged.
///
/// Matching is by literal substring, not by position: if identical markup
/// occurs earlier in the text than the table itself (inside a code block,
/// say), that earlier occurrence is the one replaced.
#[must_use]
pub fn splice_tables(text: &str, tables: &[RawTable], mode: NewlineMode) -> String {
    let mut working = normalize_newlines(text, mode).into_owned();
    for (index, table) in tables.iter().enumerate() {
        let needle = normalize_newlines(table.needle(), mode);
        if needle.is_empty() || !working.contains(needle.as_ref()) {
            debug!("table {index} not found in text, leaving it in place");
            continue;
        }
        working = working.replacen(needle.as_ref(), &fenced_json(&table.rows), 1);
    }
    working
}

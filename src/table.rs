//! Turning an HTML table into row objects.
//!
//! Header rows are the contiguous run of rows at the top of the table that
//! contain at least one `<th>`. Their cells are flattened column by column
//! into one label per column. Every following row becomes a
//! [`StructuredRow`] keyed by those labels.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::html::Element;

/// One body row: column label to cell text, in left-to-right column order.
pub type StructuredRow = Map<String, Value>;

/// A table found in a text, ready to be spliced.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// The table as serialised by the HTML parser.
    pub html: String,
    /// The table's markup as it appears in the source text, when it could be
    /// located there.
    pub source: Option<String>,
    pub rows: Vec<StructuredRow>,
}

impl RawTable {
    /// The text to search for when replacing this table.
    #[must_use]
    pub fn needle(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.html)
    }
}

/// Cell texts of `row`, each repeated once per spanned column.
fn expand_row(row: &Element<'_>) -> Vec<String> {
    row.descendants(&["th", "td"])
        .iter()
        .flat_map(|cell| std::iter::repeat_n(cell.text(), cell.colspan()))
        .collect()
}

/// Merge header rows into one label per column.
///
/// Labels from successive rows are joined with a space. The result is as
/// wide as the widest header row.
fn flatten_headers(header_rows: &[Vec<String>]) -> Vec<String> {
    let width = header_rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut flat = vec![String::new(); width];
    for row in header_rows {
        for (label, col) in flat.iter_mut().zip(row) {
            *label = format!("{label} {col}").trim().to_string();
        }
    }
    flat
}

fn numbered_headers(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Column {i}")).collect()
}

/// Pair `cells` with `headers`, dropping cells past the last header.
///
/// The second occurrence of a label within the row becomes `"{label} 1"`,
/// the third `"{label} 2"`, and so on.
fn build_row(headers: &[String], cells: Vec<String>) -> StructuredRow {
    let mut row = StructuredRow::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (header, cell) in headers.iter().zip(cells) {
        let repeats = seen
            .entry(header.as_str())
            .and_modify(|n| *n += 1)
            .or_insert(0);
        let key = if *repeats == 0 {
            header.clone()
        } else {
            format!("{header} {repeats}")
        };
        row.insert(key, Value::String(cell));
    }
    row
}

/// Convert a `<table>` element into its body rows.
///
/// Rows that contain no cells are skipped. When the table has no header row
/// the columns are named `Column 1`, `Column 2`, … after the first non-empty
/// body row. A table without body rows yields no rows.
///
/// # Examples
///
/// ```
/// use mdtablejson::{html::HtmlDocument, table::structure_table};
/// let doc = HtmlDocument::parse(
///     "<table><tr><th>Name</th><th>Age</th></tr><tr><td>Ana</td><td>30</td></tr></table>",
/// );
/// let rows = structure_table(&doc.tables()[0]);
/// assert_eq!(rows[0]["Name"], "Ana");
/// assert_eq!(rows[0]["Age"], "30");
/// ```
#[must_use]
pub fn structure_table(table: &Element<'_>) -> Vec<StructuredRow> {
    let rows = table.descendants(&["tr"]);
    let header_rows: Vec<Vec<String>> = rows
        .iter()
        .take_while(|row| row.contains("th"))
        .map(expand_row)
        .collect();
    let mut headers = flatten_headers(&header_rows);

    rows[header_rows.len()..]
        .iter()
        .filter_map(|row| {
            let cells = expand_row(row);
            if cells.is_empty() {
                return None;
            }
            if headers.is_empty() {
                headers = numbered_headers(cells.len());
            }
            Some(build_row(&headers, cells))
        })
        .collect()
}

//! The per-text pipeline: render, extract, structure, splice.

use log::debug;

use crate::{
    html::{HtmlDocument, SourcePos, raw_table_spans},
    render::{NewlineMode, html_regions, render_markdown},
    splice::splice_tables,
    table::{RawTable, StructuredRow, structure_table},
};

/// Options for [`convert_text`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Line-break handling for the text around tables.
    pub newlines: NewlineMode,
}

/// Rows of the first table in a hand-written HTML fragment.
fn fragment_rows(fragment: &str) -> Vec<StructuredRow> {
    let doc = HtmlDocument::parse(fragment);
    doc.tables()
        .first()
        .map(structure_table)
        .unwrap_or_default()
}

/// Pair tables rendered from raw HTML with the source spans they came from.
///
/// Each table first takes the next span whose rows it reproduces. A table
/// left over (Markdown inside a cell renders differently from its source,
/// for instance) takes the next free span that keeps both sequences in
/// document order.
fn pair_spans(tables: &[&[StructuredRow]], spans: &[&str]) -> Vec<Option<usize>> {
    let span_rows: Vec<Vec<StructuredRow>> = spans.iter().map(|span| fragment_rows(span)).collect();
    let mut paired = vec![None; tables.len()];
    let mut next = 0;
    for (slot, rows) in paired.iter_mut().zip(tables) {
        if let Some(offset) = span_rows[next..].iter().position(|span| span == rows) {
            *slot = Some(next + offset);
            next += offset + 1;
        }
    }

    let mut lower = 0;
    for index in 0..paired.len() {
        if let Some(span) = paired[index] {
            lower = span + 1;
            continue;
        }
        let upper = paired[index + 1..]
            .iter()
            .flatten()
            .next()
            .copied()
            .unwrap_or(spans.len());
        if lower < upper {
            debug!("pairing table {index} with span {lower} by position");
            paired[index] = Some(lower);
            lower += 1;
        }
    }
    paired
}

/// Find every table in `markdown`, in document order.
///
/// Pipe tables are located in the source through the renderer's source
/// positions. Tables written as raw HTML are paired with the hand-written
/// `<table>` spans of the source (see [`raw_table_spans`]); any table that
/// cannot be located keeps only its serialised HTML as needle.
#[must_use]
pub fn collect_tables(markdown: &str) -> Vec<RawTable> {
    let html = render_markdown(markdown);
    let doc = HtmlDocument::parse(&html);
    let mut tables = Vec::new();
    let mut from_raw_html = Vec::new();
    for table in doc.tables() {
        let position = table.attr("data-sourcepos");
        if position.is_none() {
            from_raw_html.push(tables.len());
        }
        tables.push(RawTable {
            html: table.outer_html(),
            source: position
                .as_deref()
                .and_then(SourcePos::parse)
                .and_then(|pos| pos.slice(markdown))
                .map(str::to_string),
            rows: structure_table(&table),
        });
    }

    if !from_raw_html.is_empty() {
        let spans = raw_table_spans(markdown, &html_regions(markdown));
        let rows: Vec<&[StructuredRow]> = from_raw_html
            .iter()
            .map(|&index| tables[index].rows.as_slice())
            .collect();
        let pairing = pair_spans(&rows, &spans);
        for (&index, span) in from_raw_html.iter().zip(pairing) {
            tables[index].source = span.map(|span| spans[span].to_string());
        }
    }

    for (index, table) in tables.iter().enumerate() {
        if table.source.is_none() {
            debug!("could not locate source of table {index}, falling back to its HTML");
        }
    }
    tables
}

/// Replace every table in `text` with a fenced JSON block.
///
/// Text outside tables is kept, apart from line-break normalisation.
/// Never fails: malformed Markdown or HTML degrades to whatever the parsers
/// recover.
///
/// # Examples
///
/// ```
/// use mdtablejson::{ConvertOptions, convert_text};
/// let out = convert_text("| A | B |\n|---|---|\n| 1 | 2 |", &ConvertOptions::default());
/// assert_eq!(out, "\n```json\n[  {    \"A\": \"1\",    \"B\": \"2\"  }]\n```\n");
/// ```
#[must_use]
pub fn convert_text(text: &str, options: &ConvertOptions) -> String {
    let tables = collect_tables(text);
    debug!("found {} table(s)", tables.len());
    splice_tables(text, &tables, options.newlines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipe_table_source_comes_from_sourcepos() {
        let text = "Intro\n\n| A | B |\n|---|---|\n| 1 | 2 |\n\nOutro";
        let tables = collect_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0].source.as_deref(),
            Some("| A | B |\n|---|---|\n| 1 | 2 |")
        );
    }

    #[test]
    fn raw_html_table_source_is_the_written_markup() {
        let text = "before\n\n<table>\n<tr><th>A</th></tr>\n<tr><td>1</td></tr>\n</table>\n\nafter";
        let tables = collect_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0].source.as_deref(),
            Some("<table>\n<tr><th>A</th></tr>\n<tr><td>1</td></tr>\n</table>")
        );
        assert!(tables[0].html.contains("<tbody>"));
    }

    #[test]
    fn mixed_tables_keep_document_order() {
        let text = "<table><tr><td>x</td></tr></table>\n\n| A |\n|---|\n| 1 |\n";
        let tables = collect_tables(text);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows[0]["Column 1"], "x");
        assert_eq!(tables[1].rows[0]["A"], "1");
    }

    #[test]
    fn raw_table_in_fence_is_not_a_table() {
        let text = "```html\n<table><tr><td>x</td></tr></table>\n```\n";
        assert!(collect_tables(text).is_empty());
    }

    #[test]
    fn text_without_tables_is_only_normalised() {
        let options = ConvertOptions::default();
        assert_eq!(convert_text("a\nb\r\nc", &options), "a b c");
    }

    #[test]
    fn spans_pair_by_rows_first() {
        let a = fragment_rows("<table><tr><td>a</td></tr></table>");
        let b = fragment_rows("<table><tr><td>b</td></tr></table>");
        let pairing = pair_spans(
            &[a.as_slice(), b.as_slice()],
            &["<table><tr><td>b</td></tr></table>"],
        );
        assert_eq!(pairing, vec![None, Some(0)]);
    }

    #[test]
    fn unmatched_tables_pair_by_position() {
        let a = fragment_rows("<table><tr><td>a</td></tr></table>");
        let rendered = fragment_rows("<table><tr><td>x <em>y</em></td></tr></table>");
        let c = fragment_rows("<table><tr><td>c</td></tr></table>");
        let pairing = pair_spans(
            &[a.as_slice(), rendered.as_slice(), c.as_slice()],
            &[
                "<table><tr><td>a</td></tr></table>",
                "<table><tr><td>x *y*</td></tr></table>",
                "<table><tr><td>c</td></tr></table>",
            ],
        );
        assert_eq!(pairing, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn code_span_before_raw_table_is_not_its_source() {
        let text = "Use `<table>` here:\n\n<table><tr><td>1</td></tr></table>";
        let tables = collect_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0].source.as_deref(),
            Some("<table><tr><td>1</td></tr></table>")
        );
    }
}

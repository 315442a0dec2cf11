//! Locating `<table>` elements in HTML and mapping them back to their source.
//!
//! Parsing goes through `html5ever` into an `RcDom`, which recovers from
//! unclosed or misnested markup the way browsers do. Elements are exposed
//! through [`Element`], a thin typed view that only lives as long as the
//! [`HtmlDocument`] it was found in.

use std::{marker::PhantomData, ops::Range, sync::LazyLock};

use html5ever::{
    driver::ParseOpts,
    parse_document,
    serialize::{SerializeOpts, TraversalScope, serialize},
    tendril::TendrilSink,
};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use regex::Regex;

use crate::render::{HtmlRegion, RegionKind};

/// Browsers refuse to span more columns than this.
const MAX_COLSPAN: usize = 1000;

static TABLE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<table(?:\s[^>]*)?>").expect("table open tag regex should compile")
});
static TABLE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</table\s*>").expect("table close tag regex should compile"));
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex should compile"));
static BACKTICKS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`+").expect("backtick regex should compile"));

/// A parsed HTML document.
///
/// `RcDom` tears down the whole subtree when its document node is dropped,
/// so elements borrow the document rather than outliving it.
pub struct HtmlDocument {
    dom: RcDom,
}

impl HtmlDocument {
    /// Parse `html`, recovering from malformed markup.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
        Self { dom }
    }

    /// Outermost `<table>` elements in document order.
    ///
    /// Tables nested inside another table are not returned on their own;
    /// their rows and cells remain reachable through the enclosing table.
    #[must_use]
    pub fn tables(&self) -> Vec<Element<'_>> {
        let mut tables = Vec::new();
        collect_outermost(&self.dom.document, "table", &mut tables);
        tables.into_iter().map(Element::new).collect()
    }
}

/// Walks the DOM tree collecting `name` elements, without descending into a
/// match.
fn collect_outermost(handle: &Handle, name: &str, found: &mut Vec<Handle>) {
    if is_element(handle, name) {
        found.push(handle.clone());
        return;
    }
    for child in handle.children.borrow().iter() {
        collect_outermost(child, name, found);
    }
}

/// Collects every descendant of `handle` whose tag is one of `names`.
fn collect_descendants(handle: &Handle, names: &[&str], found: &mut Vec<Handle>) {
    for child in handle.children.borrow().iter() {
        if names.iter().any(|name| is_element(child, name)) {
            found.push(child.clone());
        }
        collect_descendants(child, names, found);
    }
}

fn is_element(handle: &Handle, tag: &str) -> bool {
    matches!(&handle.data, NodeData::Element { name, .. } if name.local.as_ref() == tag)
}

fn collect_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { .. } | NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
        _ => {}
    }
}

/// An element node inside an [`HtmlDocument`].
#[derive(Clone)]
pub struct Element<'doc> {
    handle: Handle,
    _doc: PhantomData<&'doc HtmlDocument>,
}

impl Element<'_> {
    fn new(handle: Handle) -> Self {
        Self {
            handle,
            _doc: PhantomData,
        }
    }

    /// Value of the attribute called `name`, if present.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<String> {
        let NodeData::Element { attrs, .. } = &self.handle.data else {
            return None;
        };
        attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == name)
            .map(|attr| attr.value.to_string())
    }

    /// Number of columns the cell spans.
    ///
    /// Missing, unparsable and zero values count as one column; large
    /// values are capped at 1000.
    #[must_use]
    pub fn colspan(&self) -> usize {
        self.attr("colspan")
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|&span| span > 0)
            .map_or(1, |span| span.min(MAX_COLSPAN))
    }

    /// Descendant text concatenated without separators, then trimmed.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.handle, &mut out);
        out.trim().to_string()
    }

    /// Every descendant element whose tag is in `names`, in document order.
    #[must_use]
    pub fn descendants(&self, names: &[&str]) -> Vec<Self> {
        let mut found = Vec::new();
        collect_descendants(&self.handle, names, &mut found);
        found.into_iter().map(Self::new).collect()
    }

    /// `true` if any descendant element is a `tag`.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        fn walk(handle: &Handle, tag: &str) -> bool {
            handle
                .children
                .borrow()
                .iter()
                .any(|child| is_element(child, tag) || walk(child, tag))
        }
        walk(&self.handle, tag)
    }

    /// The element serialised back to HTML, tags included.
    #[must_use]
    pub fn outer_html(&self) -> String {
        let node: SerializableHandle = self.handle.clone().into();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..SerializeOpts::default()
        };
        let mut bytes = Vec::new();
        if serialize(&mut bytes, &node, opts).is_err() {
            return String::new();
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// A `data-sourcepos` value: 1-based line and byte column of the first and
/// last character of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePos {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourcePos {
    /// Parse the `"L:C-L:C"` form emitted by the Markdown renderer.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (start, end) = value.trim().split_once('-')?;
        let (start_line, start_column) = start.split_once(':')?;
        let (end_line, end_column) = end.split_once(':')?;
        Some(Self {
            start_line: start_line.parse().ok()?,
            start_column: start_column.parse().ok()?,
            end_line: end_line.parse().ok()?,
            end_column: end_column.parse().ok()?,
        })
    }

    /// The covered part of `text`: from the start position through the end
    /// of the last line, line break excluded.
    ///
    /// Returns `None` when the position does not fit `text`.
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.byte_range(text)?)
    }

    /// Byte range of [`SourcePos::slice`] within `text`.
    #[must_use]
    pub fn byte_range(&self, text: &str) -> Option<Range<usize>> {
        let lines = line_ranges(text);
        let first = lines.get(self.start_line.checked_sub(1)?)?;
        let last = lines.get(self.end_line.checked_sub(1)?)?;
        let start = first.start + self.start_column.checked_sub(1)?;
        if start > first.end || start > last.end || !text.is_char_boundary(start) {
            return None;
        }
        Some(start..last.end)
    }
}

/// Byte ranges of each line in `text`, line breaks excluded.
///
/// `\r\n`, `\n` and a lone `\r` all end a line, matching the Markdown
/// renderer's line numbering.
fn line_ranges(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                lines.push(start..i);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            b'\n' => {
                lines.push(start..i);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    lines.push(start..bytes.len());
    lines
}

/// Byte ranges of inline code spans in `text`.
///
/// A run of backticks opens a span that the next run of the same length
/// closes; a run without a partner is literal text.
fn code_span_ranges(text: &str) -> Vec<Range<usize>> {
    let runs: Vec<Range<usize>> = BACKTICKS_RE.find_iter(text).map(|m| m.range()).collect();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < runs.len() {
        let open = &runs[i];
        match runs[i + 1..].iter().position(|run| run.len() == open.len()) {
            Some(offset) => {
                spans.push(open.start..runs[i + 1 + offset].end);
                i += offset + 2;
            }
            None => i += 1,
        }
    }
    spans
}

fn covers(ranges: &[Range<usize>], pos: usize) -> bool {
    ranges.iter().any(|range| range.contains(&pos))
}

/// Parts of a region in which tags are not markup: HTML comments, and code
/// spans when the region holds inline content.
fn hidden_ranges(source: &str, kind: RegionKind) -> Vec<Range<usize>> {
    let mut hidden = match kind {
        RegionKind::Inline => code_span_ranges(source),
        RegionKind::Block => Vec::new(),
    };
    let mut at = 0;
    while let Some(comment) = COMMENT_RE.find_at(source, at) {
        if covers(&hidden, comment.start()) {
            at = comment.start() + 1;
            continue;
        }
        hidden.push(comment.range());
        at = comment.end();
    }
    hidden
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tag {
    start: usize,
    end: usize,
    opening: bool,
}

fn visible_tags(region: &HtmlRegion, source: &str, hidden: &[Range<usize>]) -> Vec<Tag> {
    let open = TABLE_OPEN_RE.find_iter(source).map(|m| (m, true));
    let close = TABLE_CLOSE_RE.find_iter(source).map(|m| (m, false));
    open.chain(close)
        .filter(|(m, _)| !covers(hidden, m.start()))
        .map(|(m, opening)| Tag {
            start: region.range.start + m.start(),
            end: region.range.start + m.end(),
            opening,
        })
        .collect()
}

/// Hand-written `<table>…</table>` spans in `text`, outermost only, in
/// document order.
///
/// Only tags inside `regions` count, minus comments and inline code. A
/// `<table>` that is never closed yields no span and does not hide the
/// tables after it.
#[must_use]
pub fn raw_table_spans<'a>(text: &'a str, regions: &[HtmlRegion]) -> Vec<&'a str> {
    let mut tags: Vec<Tag> = regions
        .iter()
        .filter_map(|region| {
            let source = text.get(region.range.clone())?;
            let hidden = hidden_ranges(source, region.kind);
            Some(visible_tags(region, source, &hidden))
        })
        .flatten()
        .collect();
    tags.sort_unstable_by_key(|tag| tag.start);
    tags.dedup();

    let mut spans = Vec::new();
    let mut i = 0;
    while i < tags.len() {
        if !tags[i].opening {
            i += 1;
            continue;
        }
        let mut depth = 0usize;
        let close = tags[i..].iter().position(|tag| {
            if tag.opening {
                depth += 1;
            } else {
                depth -= 1;
            }
            depth == 0
        });
        match close {
            Some(offset) => {
                spans.push(&text[tags[i].start..tags[i + offset].end]);
                i += offset + 1;
            }
            None => i += 1,
        }
    }
    spans
}

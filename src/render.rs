//! Markdown rendering and line-break normalisation.
//!
//! Tables are detected on the rendered HTML rather than on the Markdown
//! source, so anything the Markdown engine recognises as a table (pipe
//! tables as well as raw `<table>` blocks passed through untouched) is
//! handled by the same extractor.

use std::{borrow::Cow, ops::Range, str::FromStr, sync::LazyLock};

use comrak::{
    Arena, ComrakOptions, markdown_to_html,
    nodes::{NodeValue, Sourcepos},
    parse_document,
};
use regex::Regex;

use crate::html::SourcePos;

static LINE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\r|\n").expect("line break regex should compile"));

/// How line breaks in the input text are rewritten in the output.
///
/// Every non-table part of a converted text passes through this
/// normalisation, so it decides whether words on either side of a removed
/// line break stay separated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewlineMode {
    /// Replace each line break (`\r\n`, `\n` or a lone `\r`) with one space.
    #[default]
    Space,
    /// Remove line breaks entirely; adjacent words are concatenated.
    Strip,
}

impl NewlineMode {
    fn replacement(self) -> &'static str {
        match self {
            Self::Space => " ",
            Self::Strip => "",
        }
    }
}

impl FromStr for NewlineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "space" => Ok(Self::Space),
            "strip" => Ok(Self::Strip),
            other => Err(format!("unknown newline mode `{other}` (expected `space` or `strip`)")),
        }
    }
}

/// Rewrite every line break in `text` according to `mode`.
///
/// Returns the input unchanged (borrowed) when it contains no line break.
///
/// # Examples
///
/// ```
/// use mdtablejson::{NewlineMode, normalize_newlines};
/// assert_eq!(normalize_newlines("a\r\nb\nc", NewlineMode::Space), "a b c");
/// assert_eq!(normalize_newlines("a\nb", NewlineMode::Strip), "ab");
/// ```
#[must_use]
pub fn normalize_newlines(text: &str, mode: NewlineMode) -> Cow<'_, str> {
    LINE_BREAK_RE.replace_all(text, mode.replacement())
}

fn comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.render.unsafe_ = true;
    options.render.sourcepos = true;
    options
}

/// Render Markdown to HTML with pipe-table support.
///
/// Raw HTML is passed through, and every block element carries a
/// `data-sourcepos` attribute pointing back into `markdown`. Rendering is
/// best effort and never fails.
#[must_use]
pub fn render_markdown(markdown: &str) -> String {
    markdown_to_html(markdown, &comrak_options())
}

/// How raw HTML appears inside an [`HtmlRegion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// An HTML block, passed through verbatim.
    Block,
    /// A paragraph or heading, where tags sit among inline content such as
    /// code spans.
    Inline,
}

/// A stretch of Markdown source in which raw HTML is live markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlRegion {
    /// Byte range in the source, from the block's first character through
    /// the end of its last line.
    pub range: Range<usize>,
    pub kind: RegionKind,
}

fn source_pos(pos: Sourcepos) -> SourcePos {
    SourcePos {
        start_line: pos.start.line,
        start_column: pos.start.column,
        end_line: pos.end.line,
        end_column: pos.end.column,
    }
}

/// Regions of `markdown` that may carry raw HTML, in document order.
///
/// Code blocks of every kind (fenced, indented, nested in quotes or list
/// items) are never part of a region.
#[must_use]
pub fn html_regions(markdown: &str) -> Vec<HtmlRegion> {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &comrak_options());
    root.descendants()
        .filter_map(|node| {
            let ast = node.data.borrow();
            let kind = match ast.value {
                NodeValue::HtmlBlock(_) => RegionKind::Block,
                NodeValue::Paragraph | NodeValue::Heading(_) => RegionKind::Inline,
                _ => return None,
            };
            let range = source_pos(ast.sourcepos).byte_range(markdown)?;
            Some(HtmlRegion { range, kind })
        })
        .collect()
}

//! Replace tables embedded in free-form text with fenced JSON blocks.
//!
//! Text is rendered as Markdown, every `<table>` in the result is turned into
//! a list of row objects keyed by column label, and each table's markup in
//! the text is replaced with the rows as a `json` code block. The batch
//! interface in [`skill`] wraps this for document-enrichment pipelines.

pub mod convert;
pub mod error;
pub mod html;
pub mod io;
pub mod render;
pub mod skill;
pub mod splice;
pub mod table;
#[cfg(feature = "worker")]
mod worker;

pub use convert::{ConvertOptions, collect_tables, convert_text};
pub use error::{Error, Result};
pub use io::{convert_file, convert_request_file, rewrite};
pub use render::{NewlineMode, normalize_newlines, render_markdown};
pub use skill::{
    Issue, MISSING_TEXT_WARNING, TableConverterRequest, TableConverterResponse, convert_batch,
    convert_request_json,
};
pub use splice::{fenced_json, splice_tables};
pub use table::{RawTable, StructuredRow, structure_table};

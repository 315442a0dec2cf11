//! File helpers for converting Markdown documents and skill request files.

use std::{fs, path::Path};

use crate::{
    convert::{ConvertOptions, convert_text},
    error::Result,
    skill::convert_request_json,
};

/// Convert the tables in the file at `path` and return the result.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn convert_file(path: &Path, options: &ConvertOptions) -> Result<String> {
    let text = fs::read_to_string(path)?;
    Ok(convert_text(&text, options))
}

/// Rewrite a file in place with its tables converted.
///
/// # Errors
/// Returns an error if reading or writing the file fails.
pub fn rewrite(path: &Path, options: &ConvertOptions) -> Result<()> {
    let converted = convert_file(path, options)?;
    fs::write(path, converted)?;
    Ok(())
}

/// Read a skill request from `path` and return the JSON response.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid request.
pub fn convert_request_file(path: &Path, options: &ConvertOptions) -> Result<String> {
    let body = fs::read_to_string(path)?;
    convert_request_json(&body, options)
}

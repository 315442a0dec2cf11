//! Custom-skill batch contract.
//!
//! A request carries independent records, each with an opaque `recordId`.
//! The response carries exactly one record per input record with the same
//! `recordId`, plus per-record warnings and errors. No record can fail the
//! batch.

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    convert::{ConvertOptions, convert_text},
    error::{Error, Result},
};

/// Warning attached to records that arrive without text.
pub const MISSING_TEXT_WARNING: &str = "No input text provided.";

/// A warning or error reported for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub message: String,
}

impl Issue {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One input record carrying a skill-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillInputRecord<T> {
    #[serde(rename = "recordId")]
    pub record_id: String,
    #[serde(default)]
    pub data: T,
}

/// One output record carrying a skill-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillOutputRecord<T> {
    #[serde(rename = "recordId")]
    pub record_id: String,
    pub data: T,
    #[serde(default)]
    pub errors: Vec<Issue>,
    #[serde(default)]
    pub warnings: Vec<Issue>,
}

impl<T> SkillOutputRecord<T> {
    #[must_use]
    pub fn new(record_id: String, data: T) -> Self {
        Self {
            record_id,
            data,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_warning(mut self, warning: Issue) -> Self {
        self.warnings.push(warning);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRequest<T> {
    #[serde(default)]
    pub values: Vec<SkillInputRecord<T>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillResponse<T> {
    #[serde(default)]
    pub values: Vec<SkillOutputRecord<T>>,
}

/// Payload of a table-converter input record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConverterInput {
    #[serde(default)]
    pub text: Option<String>,
}

/// Payload of a table-converter output record. `text` is `null` when the
/// input had none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConverterOutput {
    pub text: Option<String>,
}

pub type TableConverterRequest = SkillRequest<TableConverterInput>;
pub type TableConverterResponse = SkillResponse<TableConverterOutput>;

/// Body of the liveness endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub info: String,
}

#[must_use]
pub fn health() -> HealthStatus {
    HealthStatus {
        info: String::from("Healthy"),
    }
}

/// Convert every record of a batch.
///
/// Records with non-empty text are converted and come first; records whose
/// text is missing, `null` or empty follow with a single
/// [`MISSING_TEXT_WARNING`]. Each group keeps its input order.
#[must_use]
pub fn convert_batch(
    request: TableConverterRequest,
    options: &ConvertOptions,
) -> TableConverterResponse {
    let (with_text, without_text): (Vec<_>, Vec<_>) = request
        .values
        .into_iter()
        .partition(|record| record.data.text.as_deref().is_some_and(|text| !text.is_empty()));
    info!(
        "converting batch: {} record(s) with text, {} without",
        with_text.len(),
        without_text.len()
    );

    let converted = with_text.into_iter().map(|record| {
        let text = record.data.text.unwrap_or_default();
        SkillOutputRecord::new(
            record.record_id,
            TableConverterOutput {
                text: Some(convert_text(&text, options)),
            },
        )
    });
    let skipped = without_text.into_iter().map(|record| {
        SkillOutputRecord::new(record.record_id, TableConverterOutput { text: None })
            .with_warning(Issue::new(MISSING_TEXT_WARNING))
    });

    SkillResponse {
        values: converted.chain(skipped).collect(),
    }
}

/// Convert a JSON request body into a JSON response body.
///
/// # Errors
/// Returns [`Error::InvalidRequest`] if `body` is not a valid request and
/// [`Error::Serialize`] if the response cannot be encoded.
pub fn convert_request_json(body: &str, options: &ConvertOptions) -> Result<String> {
    let request: TableConverterRequest =
        serde_json::from_str(body).map_err(Error::InvalidRequest)?;
    let response = convert_batch(request, options);
    serde_json::to_string(&response).map_err(Error::Serialize)
}

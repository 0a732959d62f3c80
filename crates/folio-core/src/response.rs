//! Uniform error payload returned for every failed request

use http::StatusCode;
use jiff::Zoned;
use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};

/// Error payload body
///
/// `code` and `invalidParameters` are omitted from the JSON when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    pub status: u16,
    pub timestamp: DateTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_parameters: Vec<FieldError>,
}

/// Per-parameter detail attached to a 4xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub parameter: String,
    pub message: String,
}

impl FieldError {
    pub fn new(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            message: message.into(),
        }
    }
}

/// Build an error payload stamped with the current local date-time
pub fn build(
    code: Option<&str>,
    message: impl Into<String>,
    status: StatusCode,
    field_errors: Vec<FieldError>,
) -> ErrorResponse {
    build_at(code, message, status, field_errors, Zoned::now().datetime())
}

/// Build an error payload with an explicit timestamp
///
/// Blank codes are dropped.
pub fn build_at(
    code: Option<&str>,
    message: impl Into<String>,
    status: StatusCode,
    field_errors: Vec<FieldError>,
    timestamp: DateTime,
) -> ErrorResponse {
    ErrorResponse {
        code: code.filter(|c| !c.trim().is_empty()).map(ToOwned::to_owned),
        message: message.into(),
        status: status.as_u16(),
        timestamp,
        invalid_parameters: field_errors,
    }
}

//! The single conversion point from failures to error responses

use axum::Json;
use axum::response::{IntoResponse, Response};
use folio_core::{Failure, FieldError, HttpError, ValidationFailure, response};
use http::StatusCode;

use crate::error::{ApiError, BindingError};
use crate::request_context::RequestLine;

/// Placeholder logged for the method and URL when no request is in scope
const NO_REQUEST: &str = "'null'";

/// How a failure is reported to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Name of the construct that raised the failure; logged, never sent
    pub origin: &'static str,
    pub status: StatusCode,
    pub code: Option<String>,
    pub message: String,
    pub field_errors: Vec<FieldError>,
}

impl Classification {
    fn new(origin: &'static str, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            origin,
            status,
            code: None,
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    fn bad_request(origin: &'static str, field_errors: Vec<FieldError>) -> Self {
        Self {
            field_errors,
            ..Self::new(origin, StatusCode::BAD_REQUEST, reason_phrase(StatusCode::BAD_REQUEST))
        }
    }
}

/// Classify, log and render a failure
///
/// `request` is the request being served, if any; it only feeds the log line.
pub fn dispatch(error: &ApiError, request: Option<&RequestLine>) -> Response {
    let classification = classify(error);
    log_failure(error, &classification, request);

    let status = classification.status;
    let body = response::build(
        classification.code.as_deref(),
        classification.message,
        status,
        classification.field_errors,
    );

    (status, Json(body)).into_response()
}

/// Decide status, code, message and field errors for a failure
pub fn classify(error: &ApiError) -> Classification {
    match error {
        ApiError::Failure(failure) => classify_failure(failure),
        ApiError::Validation(failure) => classify_validation(failure),
        ApiError::Binding(binding) => classify_binding(binding),
        ApiError::Unexpected(_) => Classification::new(
            "Unclassified",
            StatusCode::INTERNAL_SERVER_ERROR,
            reason_phrase(StatusCode::INTERNAL_SERVER_ERROR),
        ),
    }
}

fn classify_failure(failure: &Failure) -> Classification {
    Classification {
        code: failure.error_code().map(ToOwned::to_owned),
        ..Classification::new(failure.origin(), failure.status_code(), failure.client_message())
    }
}

fn classify_validation(failure: &ValidationFailure) -> Classification {
    let field_errors = failure
        .violations
        .iter()
        .filter_map(|violation| {
            let parameter = violation.property_path.parameter();
            if parameter.is_none() {
                tracing::warn!(
                    path = %violation.property_path,
                    "can't extract the parameter of a constraint violation"
                );
            }
            parameter.map(|parameter| FieldError::new(parameter, &violation.message))
        })
        .collect();

    Classification::bad_request(failure.origin, field_errors)
}

fn classify_binding(error: &BindingError) -> Classification {
    let field = |origin, parameter: &str, message: String| {
        Classification::bad_request(origin, vec![FieldError::new(parameter, message)])
    };

    match error {
        BindingError::MissingHeader { name } => field(
            "MissingRequestHeader",
            name,
            format!("Missing header parameter with name '{name}'"),
        ),
        BindingError::MissingQuery { name } => field(
            "MissingRequestParameter",
            name,
            format!("Missing query parameter with name '{name}'"),
        ),
        BindingError::MissingPath { name } => field(
            "MissingPathVariable",
            name,
            format!("Missing path parameter with name '{name}'"),
        ),
        BindingError::TypeMismatch { name, required, .. } => field(
            "TypeMismatch",
            name,
            format!("Unexpected type specified for '{name}' parameter. Required '{required}'"),
        ),
        BindingError::MalformedQuery { detail } => field("MalformedQuery", "query", detail.clone()),
        BindingError::UnreadableBody { detail } => field("UnreadableBody", "body", detail.clone()),
        BindingError::UnsupportedMediaType { detail } => {
            Classification::new("MediaTypeNotSupported", StatusCode::UNSUPPORTED_MEDIA_TYPE, detail.clone())
        }
        BindingError::PayloadTooLarge { .. } => Classification::new(
            "PayloadTooLarge",
            StatusCode::PAYLOAD_TOO_LARGE,
            reason_phrase(StatusCode::PAYLOAD_TOO_LARGE),
        ),
        BindingError::MethodNotAllowed { method } => Classification::new(
            "MethodNotSupported",
            StatusCode::METHOD_NOT_ALLOWED,
            format!("Request method '{method}' is not supported"),
        ),
        BindingError::NoRoute { .. } => Classification::new("NoHandlerFound", StatusCode::NOT_FOUND, error.to_string()),
    }
}

fn log_failure(error: &ApiError, classification: &Classification, request: Option<&RequestLine>) {
    let (method, url) = request.map_or((NO_REQUEST, NO_REQUEST), |line| (line.method.as_str(), line.url.as_str()));

    let reason = cause_chain(error);

    tracing::error!(
        origin = classification.origin,
        status = classification.status.as_u16(),
        "Request {method} {url} failed with exception reason: {reason}"
    );
}

/// The error followed by each of its sources, colon separated
fn cause_chain(error: &dyn std::error::Error) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

fn reason_phrase(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown Status")
}

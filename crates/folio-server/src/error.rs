use axum::response::{IntoResponse, Response};
use folio_core::{Failure, ValidationFailure};
use http::Method;
use thiserror::Error;

/// Every way a request can fail before a successful response is produced
///
/// Handlers and extractors return this; its [`IntoResponse`] impl hands it
/// to the dispatcher, which is the only place failures become responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Business or application failure raised by domain code
    #[error(transparent)]
    Failure(#[from] Failure),

    /// One or more constraint violations
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// A single request parameter could not be bound
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// Anything else, including panics caught at the boundary
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Request binding failures, each about exactly one parameter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("Required request header '{name}' is not present")]
    MissingHeader { name: String },

    #[error("Required request parameter '{name}' is not present")]
    MissingQuery { name: String },

    #[error("Missing URI template variable '{name}'")]
    MissingPath { name: String },

    #[error("Failed to convert value '{value}' of parameter '{name}' to required type '{required}'")]
    TypeMismatch {
        name: String,
        value: String,
        required: &'static str,
    },

    #[error("Malformed query string: {detail}")]
    MalformedQuery { detail: String },

    #[error("Unreadable request body: {detail}")]
    UnreadableBody { detail: String },

    #[error("Unsupported request content type: {detail}")]
    UnsupportedMediaType { detail: String },

    #[error("Request body too large: {detail}")]
    PayloadTooLarge { detail: String },

    #[error("Request method '{method}' is not supported")]
    MethodNotAllowed { method: Method },

    #[error("No handler found for {method} {path}")]
    NoRoute { method: Method, path: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        crate::dispatch::dispatch(&self, crate::request_context::current().as_ref())
    }
}

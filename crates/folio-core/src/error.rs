use http::StatusCode;

/// Trait for domain errors that can be rendered as HTTP error payloads
///
/// Implemented by failure types that carry their own status and code. The
/// server layer turns these into responses, keeping domain errors decoupled
/// from axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code reported to the client
    fn status_code(&self) -> StatusCode;

    /// Stable machine-readable code (e.g. `V147`), if the error exposes one
    fn error_code(&self) -> Option<&str>;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}

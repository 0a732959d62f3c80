use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use thiserror::Error;

use crate::error::HttpError;
use crate::reason::{ApplicationReason, BusinessReason, TemplateError, interpolate};

/// Failure family
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Family {
    Business,
    Application,
}

/// A classified failure raised by domain code
///
/// Constructed at the point of detection with the reason's registered
/// metadata already resolved; immutable afterwards.
#[derive(Debug, Clone, Error)]
pub enum Failure {
    /// Expected domain-rule violation the client can act on
    #[error(transparent)]
    Business(BusinessFailure),
    /// Internal fault that must not be interpreted as client-actionable
    #[error(transparent)]
    Application(ApplicationFailure),
}

/// Lower-level error that caused a failure
///
/// Reachable through [`std::error::Error::source`] for logging; never part
/// of the client message.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// Business failure with its resolved status, code and message
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BusinessFailure {
    pub reason: BusinessReason,
    pub status: StatusCode,
    pub code: Option<&'static str>,
    pub message: String,
    pub origin: &'static str,
    #[source]
    pub source: Option<Cause>,
}

/// Application failure with its resolved status and message
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApplicationFailure {
    pub reason: ApplicationReason,
    pub status: StatusCode,
    pub message: String,
    pub origin: &'static str,
    #[source]
    pub source: Option<Cause>,
}

impl Failure {
    /// Raise a business failure, interpolating the reason's template
    ///
    /// A template that needs more parameters than supplied produces an
    /// application failure describing the mismatch instead.
    pub fn business<I, P>(reason: BusinessReason, parameters: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: fmt::Display,
    {
        let descriptor = reason.descriptor();
        let parameters = render(parameters);

        match interpolate(descriptor.message_template, &parameters) {
            Ok(message) => Self::Business(BusinessFailure {
                reason,
                status: descriptor.status,
                code: descriptor.code,
                message,
                origin: reason.name(),
                source: None,
            }),
            Err(error) => template_mismatch(reason.name(), &error),
        }
    }

    /// Raise an application failure, interpolating the reason's template
    pub fn application<I, P>(reason: ApplicationReason, parameters: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: fmt::Display,
    {
        let descriptor = reason.descriptor();
        let parameters = render(parameters);

        match interpolate(descriptor.message_template, &parameters) {
            Ok(message) => Self::Application(ApplicationFailure {
                reason,
                status: descriptor.status,
                message,
                origin: reason.name(),
                source: None,
            }),
            Err(error) => template_mismatch(reason.name(), &error),
        }
    }

    /// Replace the origin tag with the name of the raising construct
    #[must_use]
    pub fn with_origin(mut self, origin: &'static str) -> Self {
        match &mut self {
            Self::Business(failure) => failure.origin = origin,
            Self::Application(failure) => failure.origin = origin,
        }
        self
    }

    /// Keep the error that caused this failure for the failure log
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let source: Cause = Arc::new(source);
        match &mut self {
            Self::Business(failure) => failure.source = Some(source),
            Self::Application(failure) => failure.source = Some(source),
        }
        self
    }

    pub const fn family(&self) -> Family {
        match self {
            Self::Business(_) => Family::Business,
            Self::Application(_) => Family::Application,
        }
    }

    /// Status resolved from the reason registry
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Business(failure) => failure.status,
            Self::Application(failure) => failure.status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Business(failure) => &failure.message,
            Self::Application(failure) => &failure.message,
        }
    }

    pub const fn origin(&self) -> &'static str {
        match self {
            Self::Business(failure) => failure.origin,
            Self::Application(failure) => failure.origin,
        }
    }
}

impl HttpError for Failure {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Business(failure) => failure.status,
            Self::Application(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> Option<&str> {
        match self {
            Self::Business(failure) => failure.code,
            Self::Application(_) => None,
        }
    }

    fn client_message(&self) -> String {
        self.message().to_owned()
    }
}

impl From<BusinessFailure> for Failure {
    fn from(failure: BusinessFailure) -> Self {
        Self::Business(failure)
    }
}

impl From<ApplicationFailure> for Failure {
    fn from(failure: ApplicationFailure) -> Self {
        Self::Application(failure)
    }
}

fn render<I, P>(parameters: I) -> Vec<String>
where
    I: IntoIterator<Item = P>,
    P: fmt::Display,
{
    parameters.into_iter().map(|p| p.to_string()).collect()
}

fn template_mismatch(reason: &'static str, error: &TemplateError) -> Failure {
    let TemplateError::MissingParameters { expected, actual } = *error;
    let descriptor = ApplicationReason::MessageTemplateMismatch.descriptor();
    let parameters = [reason.to_owned(), expected.to_string(), actual.to_string()];
    let message = interpolate(descriptor.message_template, &parameters)
        .unwrap_or_else(|_| descriptor.message_template.to_owned());

    Failure::Application(ApplicationFailure {
        reason: ApplicationReason::MessageTemplateMismatch,
        status: descriptor.status,
        message,
        origin: reason,
        source: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_failure_resolves_registry_metadata() {
        let failure = Failure::business(BusinessReason::BookNotFoundById, [42]);

        assert_eq!(failure.family(), Family::Business);
        assert_eq!(failure.status(), StatusCode::NOT_FOUND);
        assert_eq!(failure.error_code(), Some("V147"));
        assert_eq!(failure.message(), "Book not found by id: 42");
        assert_eq!(failure.origin(), "BookNotFoundById");
        assert_eq!(failure.to_string(), "Book not found by id: 42");
    }

    #[test]
    fn application_failure_never_exposes_a_code() {
        let failure = Failure::application(ApplicationReason::PropertyNotExists, ["rating", "Book"]);

        assert_eq!(failure.family(), Family::Application);
        assert_eq!(failure.error_code(), None);
        assert_eq!(failure.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failure.message(), "Property 'rating' for object 'Book' doesn't exist");
    }

    #[test]
    fn origin_can_be_overridden() {
        let failure = Failure::business(BusinessReason::UserNotFoundById, [7]).with_origin("CatalogService");
        assert_eq!(failure.origin(), "CatalogService");
    }

    #[test]
    fn source_is_chained_but_not_rendered() {
        let cause = std::io::Error::other("disk quota exceeded");
        let failure =
            Failure::application(ApplicationReason::DataAccessFailure, ["storing a book"]).with_source(cause);

        assert_eq!(failure.message(), "Data access failed while storing a book");
        assert_eq!(failure.client_message(), "Data access failed while storing a book");
        assert_eq!(failure.to_string(), "Data access failed while storing a book");
        let source = StdError::source(&failure).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("disk quota exceeded"));
    }

    #[test]
    fn failures_without_source_end_the_chain() {
        let failure = Failure::business(BusinessReason::BookNotFoundById, [1]);
        assert!(StdError::source(&failure).is_none());
    }

    #[test]
    fn missing_parameters_become_an_application_failure() {
        let failure = Failure::business(BusinessReason::BookNotFoundById, Vec::<String>::new());

        assert_eq!(failure.family(), Family::Application);
        assert_eq!(failure.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failure.error_code(), None);
        assert_eq!(
            failure.message(),
            "Message template for 'BookNotFoundById' expects 1 parameter(s), got 0"
        );
        assert_eq!(failure.origin(), "BookNotFoundById");
    }

    #[test]
    fn family_display() {
        assert_eq!(Family::Business.to_string(), "Business");
        assert_eq!(Family::Application.to_string(), "Application");
    }
}

//! Registry of known failure reasons
//!
//! Every reason is a symbolic key bound to an immutable [`ReasonDescriptor`].
//! The key set is closed: adding a reason means adding an enum variant, and
//! the compiler then forces a descriptor for it.

use http::StatusCode;
use strum::{EnumIter, IntoStaticStr};
use thiserror::Error;

/// Immutable metadata attached to a failure reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReasonDescriptor {
    /// Stable machine-readable code exposed to clients (business reasons only)
    pub code: Option<&'static str>,
    /// Message template with `%s` positional placeholders
    pub message_template: &'static str,
    /// HTTP status the reason maps to
    pub status: StatusCode,
}

impl ReasonDescriptor {
    const fn business(code: &'static str, message_template: &'static str, status: StatusCode) -> Self {
        Self {
            code: Some(code),
            message_template,
            status,
        }
    }

    const fn application(message_template: &'static str) -> Self {
        Self {
            code: None,
            message_template,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Number of `%s` placeholders in the template
    pub fn arity(&self) -> usize {
        placeholder_count(self.message_template)
    }
}

/// Expected, client-actionable failure conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum BusinessReason {
    BookNotFoundById,
    AuthorNotFoundById,
    UserNotFoundById,
    BookTitleAlreadyExists,
}

impl BusinessReason {
    /// Resolve the descriptor registered for this reason
    pub const fn descriptor(self) -> ReasonDescriptor {
        match self {
            Self::BookNotFoundById => {
                ReasonDescriptor::business("V147", "Book not found by id: %s", StatusCode::NOT_FOUND)
            }
            Self::AuthorNotFoundById => {
                ReasonDescriptor::business("V148", "Author not found by id: %s", StatusCode::NOT_FOUND)
            }
            Self::UserNotFoundById => {
                ReasonDescriptor::business("V149", "User not found by id: %s", StatusCode::NOT_FOUND)
            }
            Self::BookTitleAlreadyExists => ReasonDescriptor::business(
                "V150",
                "Book with title '%s' already exists",
                StatusCode::CONFLICT,
            ),
        }
    }

    /// Symbolic name of the reason, e.g. `BookNotFoundById`
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Internal faults that are never client-actionable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum ApplicationReason {
    PropertyNotExists,
    DataAccessFailure,
    MessageTemplateMismatch,
}

impl ApplicationReason {
    /// Resolve the descriptor registered for this reason
    pub const fn descriptor(self) -> ReasonDescriptor {
        match self {
            Self::PropertyNotExists => ReasonDescriptor::application("Property '%s' for object '%s' doesn't exist"),
            Self::DataAccessFailure => ReasonDescriptor::application("Data access failed while %s"),
            Self::MessageTemplateMismatch => ReasonDescriptor::application(
                "Message template for '%s' expects %s parameter(s), got %s",
            ),
        }
    }

    /// Symbolic name of the reason, e.g. `PropertyNotExists`
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Template interpolation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Fewer parameters were supplied than the template has placeholders
    #[error("template expects {expected} parameter(s), got {actual}")]
    MissingParameters { expected: usize, actual: usize },
}

/// Substitute `%s` placeholders in order with `parameters`
///
/// `%%` renders a literal percent sign. Surplus parameters are ignored.
///
/// # Errors
///
/// Returns [`TemplateError::MissingParameters`] when the template has more
/// placeholders than parameters were supplied
pub fn interpolate<S: AsRef<str>>(template: &str, parameters: &[S]) -> Result<String, TemplateError> {
    let expected = placeholder_count(template);
    if parameters.len() < expected {
        return Err(TemplateError::MissingParameters {
            expected,
            actual: parameters.len(),
        });
    }

    let mut output = String::with_capacity(template.len() + parameters.iter().map(|p| p.as_ref().len()).sum::<usize>());
    let mut parameters = parameters.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            output.push(c);
            continue;
        }

        match chars.peek() {
            Some('s') => {
                chars.next();
                if let Some(parameter) = parameters.next() {
                    output.push_str(parameter.as_ref());
                }
            }
            Some('%') => {
                chars.next();
                output.push('%');
            }
            _ => output.push('%'),
        }
    }

    Ok(output)
}

fn placeholder_count(template: &str) -> usize {
    let mut count = 0;
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.next() {
                Some('s') => count += 1,
                Some(_) | None => {}
            }
        }
    }

    count
}

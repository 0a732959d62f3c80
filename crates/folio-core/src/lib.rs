//! Failure taxonomy and error payloads shared by every Folio crate

#![allow(clippy::must_use_candidate)]

mod error;
mod failure;
pub mod reason;
pub mod response;
pub mod validation;

pub use error::HttpError;
pub use failure::{ApplicationFailure, BusinessFailure, Cause, Failure, Family};
pub use reason::{ApplicationReason, BusinessReason, ReasonDescriptor};
pub use response::{ErrorResponse, FieldError};
pub use validation::{ConstraintViolation, PropertyPath, Validate, ValidationFailure, Violations};

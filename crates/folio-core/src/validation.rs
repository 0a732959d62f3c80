//! Constraint violations produced by input validation

use std::fmt;

use thiserror::Error;

/// Dotted path to the value a constraint was checked against
///
/// Paths are rooted at the validated construct, so a query parameter checked
/// by the `listPage` operation has the path `listPage.size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath(Vec<String>);

impl PropertyPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a dotted path, ignoring empty segments
    pub fn parse(path: &str) -> Self {
        Self::new(path.split('.').filter(|s| !s.is_empty()))
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Name of the offending parameter: the segment right below the root
    ///
    /// `None` when the path has no segment below its root.
    pub fn parameter(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// A single failed constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub property_path: PropertyPath,
    pub message: String,
}

/// One or more constraint violations raised by a validated construct
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.violations))]
pub struct ValidationFailure {
    /// Name of the validating construct, e.g. `ConstraintViolation`
    pub origin: &'static str,
    pub violations: Vec<ConstraintViolation>,
}

fn describe(violations: &[ConstraintViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.property_path, v.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Types that can check their own constraints
pub trait Validate {
    /// Name reported as the failure origin
    const ORIGIN: &'static str;

    /// Record every violated constraint into `violations`
    fn validate(&self, violations: &mut Violations);

    /// Run [`Validate::validate`] under `root` and collect the outcome
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] listing every violation found
    fn check(&self, root: &'static str) -> Result<(), ValidationFailure> {
        let mut violations = Violations::new(root);
        self.validate(&mut violations);
        violations.finish(Self::ORIGIN)
    }
}

/// Accumulator for violations sharing a root segment
#[derive(Debug)]
pub struct Violations {
    root: &'static str,
    violations: Vec<ConstraintViolation>,
}

impl Violations {
    pub const fn new(root: &'static str) -> Self {
        Self {
            root,
            violations: Vec::new(),
        }
    }

    /// Record a violation on `field` unless `valid` holds
    pub fn require(&mut self, valid: bool, field: &str, message: impl Into<String>) {
        if !valid {
            self.violations.push(ConstraintViolation {
                property_path: PropertyPath::new([self.root, field]),
                message: message.into(),
            });
        }
    }

    pub fn not_blank(&mut self, field: &str, value: &str) {
        self.require(!value.trim().is_empty(), field, "must not be blank");
    }

    pub fn max_length(&mut self, field: &str, value: &str, max: usize) {
        self.require(
            value.chars().count() <= max,
            field,
            format!("size must be between 0 and {max}"),
        );
    }

    pub fn at_least(&mut self, field: &str, value: i64, min: i64) {
        self.require(value >= min, field, format!("must be greater than or equal to {min}"));
    }

    pub fn between(&mut self, field: &str, value: i64, min: i64, max: i64) {
        self.require(
            (min..=max).contains(&value),
            field,
            format!("must be between {min} and {max}"),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Finish validation
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] tagged with `origin` if any constraint failed
    pub fn finish(self, origin: &'static str) -> Result<(), ValidationFailure> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure {
                origin,
                violations: self.violations,
            })
        }
    }
}

//! Validation reports.

use oxrdf::Term;
use oxshape::{Shape, Step};
use std::fmt;

/// A constraint not satisfied by the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    path: Vec<Step>,
    shape: Shape,
    values: Vec<Term>,
    message: String,
}

impl Violation {
    /// Creates a violation of `shape` by the focus reached following `path` from the root.
    pub fn new(path: Vec<Step>, shape: Shape) -> Self {
        Self {
            path,
            shape,
            values: Vec::new(),
            message: String::new(),
        }
    }

    /// Adds a value causing the violation.
    #[must_use]
    pub fn with_value(mut self, value: Term) -> Self {
        self.values.push(value);
        self
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// The path from the root to the focus.
    pub fn path(&self) -> &[Step] {
        &self.path
    }

    /// The violated constraint.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The values causing the violation, if any can be singled out.
    pub fn values(&self) -> &[Term] {
        &self.values
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str("/")?;
        }
        for step in &self.path {
            write!(f, "/{}", step.label())?;
        }
        write!(f, ": {}", self.message)?;
        for (i, value) in self.values.iter().enumerate() {
            f.write_str(if i == 0 { " (" } else { ", " })?;
            write!(f, "{value}")?;
            if i + 1 == self.values.len() {
                f.write_str(")")?;
            }
        }
        Ok(())
    }
}

/// The outcome of a validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the data conforms to the shape.
    pub fn conforms(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// The violations of the focus reached by the given path.
    pub fn at<'a>(&'a self, path: &'a [Step]) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations
            .iter()
            .filter(move |violation| violation.path == path)
    }

    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Merges another report into this one.
    pub fn merge(&mut self, other: Self) {
        self.violations.extend(other.violations);
    }
}

impl IntoIterator for ValidationReport {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.violations {
            writeln!(f, "{violation}")?;
        }
        Ok(())
    }
}

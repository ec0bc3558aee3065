//! Validation of values against shapes.

use crate::error::ValidationError;
use crate::focus::Focus;
use crate::report::{ValidationReport, Violation};
use oxrdf::vocab::rdf;
use oxrdf::{NamedNode, Term};
use oxshape::vocab::{self, derives};
use oxshape::{Frame, Shape, Step, Value, compare, datatype_of, text};
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::debug;

/// Checks values against a shape.
///
/// The shape must have been redacted: guards are rejected with [`ValidationError::Guard`].
#[derive(Debug, Clone)]
pub struct Validator<'a> {
    shape: &'a Shape,
}

impl<'a> Validator<'a> {
    pub fn new(shape: &'a Shape) -> Self {
        Self { shape }
    }

    /// Validates a value.
    pub fn validate(&self, data: &Value) -> Result<ValidationReport, ValidationError> {
        self.validate_focus(&Focus::from(data))
    }

    /// Validates a focus, possibly empty.
    pub fn validate_focus(&self, focus: &Focus<'_>) -> Result<ValidationReport, ValidationError> {
        let mut context = ValidationContext::default();
        let mut report = ValidationReport::new();
        context.validate_focus(self.shape, focus, &mut Vec::new(), &mut report)?;
        debug!(
            conforms = report.conforms(),
            violations = report.violation_count(),
            "validated value"
        );
        Ok(report)
    }
}

/// Validates a value against a shape.
pub fn validate(shape: &Shape, data: &Value) -> Result<ValidationReport, ValidationError> {
    Validator::new(shape).validate(data)
}

#[derive(Default)]
struct ValidationContext {
    regex_cache: FxHashMap<String, Regex>,
}

impl ValidationContext {
    /// Validates the focus, including the envelope check of its frames.
    fn validate_focus(
        &mut self,
        shape: &Shape,
        focus: &Focus<'_>,
        path: &mut Vec<Step>,
        report: &mut ValidationReport,
    ) -> Result<(), ValidationError> {
        self.validate_shape(shape, focus, path, report)?;
        let fields = shape.fields();
        for frame in focus.values().iter().filter_map(|value| value.as_frame()) {
            for (step, value) in frame.fields() {
                if step.iri() == rdf::TYPE && !step.is_inverse() {
                    continue;
                }
                let expected = fields
                    .keys()
                    .any(|field| field.iri() == step.iri() && field.is_inverse() == step.is_inverse());
                if !expected {
                    let mut violation = Violation::new(path.clone(), shape.clone())
                        .with_message(format!("unexpected field '{}'", step.label()));
                    for term in Focus::from(value).terms() {
                        violation = violation.with_value(term.clone());
                    }
                    report.add(violation);
                }
            }
        }
        Ok(())
    }

    fn validate_shape(
        &mut self,
        shape: &Shape,
        focus: &Focus<'_>,
        path: &mut Vec<Step>,
        report: &mut ValidationReport,
    ) -> Result<(), ValidationError> {
        match shape {
            Shape::And(shapes) => {
                for shape in shapes {
                    self.validate_shape(shape, focus, path, report)?;
                }
            }
            Shape::Or(shapes) => {
                let mut failures = ValidationReport::new();
                for shape in shapes {
                    let mut branch = ValidationReport::new();
                    self.validate_shape(shape, focus, path, &mut branch)?;
                    if branch.conforms() {
                        return Ok(());
                    }
                    failures.merge(branch);
                }
                if shapes.is_empty() {
                    report.add(
                        Violation::new(path.clone(), shape.clone())
                            .with_message("unsatisfiable shape"),
                    );
                }
                report.merge(failures);
            }
            Shape::Field { step, shape: nested } => {
                for value in focus.values() {
                    let Some(frame) = value.as_frame() else {
                        let mut violation = Violation::new(path.clone(), shape.clone())
                            .with_message(format!("expected entity for field '{}'", step.label()));
                        if let Some(term) = value.as_term() {
                            violation = violation.with_value(term.clone());
                        }
                        report.add(violation);
                        continue;
                    };
                    let nested_focus = Focus::new(field_value(frame, step));
                    path.push(step.clone());
                    let result = self.validate_focus(nested, &nested_focus, path, report);
                    path.pop();
                    result?;
                }
            }
            Shape::Link { shape, .. } => self.validate_shape(shape, focus, path, report)?,
            Shape::Guard { axis, .. } => return Err(ValidationError::guard(axis.clone())),
            Shape::Meta { .. } => (),
            Shape::MinCount(limit) => {
                if focus.len() < *limit {
                    report.add(
                        Violation::new(path.clone(), shape.clone()).with_message(format!(
                            "expected at least {limit} values, found {}",
                            focus.len()
                        )),
                    );
                }
            }
            Shape::MaxCount(limit) => {
                // An explicit collection is always plural; a bare value counts as one,
                // so max_count(0) accepts only a missing value
                let valid = if focus.is_plural() {
                    *limit > 1 && focus.len() <= *limit
                } else {
                    focus.len() <= *limit
                };
                if !valid {
                    report.add(
                        Violation::new(path.clone(), shape.clone()).with_message(format!(
                            "expected at most {limit} values, found {}{}",
                            focus.len(),
                            if focus.is_plural() { " in a collection" } else { "" }
                        )),
                    );
                }
            }
            Shape::All(values) => {
                for expected in values {
                    if !focus.contains(expected) {
                        report.add(
                            Violation::new(path.clone(), shape.clone())
                                .with_value(expected.clone())
                                .with_message("missing required value"),
                        );
                    }
                }
            }
            Shape::Any(values) => {
                if !values.iter().any(|value| focus.contains(value)) {
                    report.add(
                        Violation::new(path.clone(), shape.clone())
                            .with_message("expected at least one of the listed values"),
                    );
                }
            }
            Shape::Localized => {
                let mut tags = FxHashSet::default();
                for value in focus.values() {
                    let tag = value.as_term().and_then(language);
                    if tag.is_none_or(|tag| !tags.insert(tag.to_ascii_lowercase())) {
                        report.add(
                            violation_for(path, shape, value).with_message(match tag {
                                Some(tag) => format!("duplicate value for language '{tag}'"),
                                None => "expected a language-tagged literal".to_owned(),
                            }),
                        );
                    }
                }
            }
            Shape::Datatype(_)
            | Shape::Clazz(_)
            | Shape::MinInclusive(_)
            | Shape::MaxInclusive(_)
            | Shape::MinExclusive(_)
            | Shape::MaxExclusive(_)
            | Shape::MinLength(_)
            | Shape::MaxLength(_)
            | Shape::Pattern(_)
            | Shape::Like(_)
            | Shape::In(_)
            | Shape::Lang(_) => {
                // Value constraints hold vacuously on an empty focus
                for value in focus.values() {
                    if let Some(message) = self.check_value(shape, value)? {
                        report.add(violation_for(path, shape, value).with_message(message));
                    }
                }
            }
        }
        Ok(())
    }

    /// Checks a single value, returning the reason of the failure if any.
    fn check_value(
        &mut self,
        shape: &Shape,
        value: &Value,
    ) -> Result<Option<String>, ValidationError> {
        let term = value.as_term();
        Ok(match shape {
            Shape::Datatype(datatype) => {
                let actual = match (value, term) {
                    (Value::Frame(_), None) => vocab::RESOURCE,
                    (_, Some(term)) => datatype_of(term),
                    (_, None) => vocab::VALUE,
                };
                (!derives(datatype.as_ref(), actual))
                    .then(|| format!("expected a value of type {datatype}"))
            }
            Shape::Clazz(class) => match value {
                Value::Frame(frame) => (!has_type(frame, class))
                    .then(|| format!("expected an instance of {class}")),
                Value::Term(Term::NamedNode(_) | Term::BlankNode(_)) => None,
                _ => Some(format!("expected an instance of {class}")),
            },
            Shape::MinInclusive(limit) => check_range(term, limit, "at least", |o| {
                o != Ordering::Less
            }),
            Shape::MaxInclusive(limit) => check_range(term, limit, "at most", |o| {
                o != Ordering::Greater
            }),
            Shape::MinExclusive(limit) => check_range(term, limit, "greater than", |o| {
                o == Ordering::Greater
            }),
            Shape::MaxExclusive(limit) => check_range(term, limit, "less than", |o| {
                o == Ordering::Less
            }),
            Shape::MinLength(limit) => term
                .map(|t| text(t).chars().count())
                .is_none_or(|length| length < *limit)
                .then(|| format!("expected at least {limit} characters")),
            Shape::MaxLength(limit) => term
                .map(|t| text(t).chars().count())
                .is_none_or(|length| length > *limit)
                .then(|| format!("expected at most {limit} characters")),
            Shape::Pattern(pattern) => {
                let regex = self.regex(pattern)?;
                term.is_none_or(|t| !regex.is_match(text(t)))
                    .then(|| format!("expected a value matching {pattern:?}"))
            }
            Shape::Like(keywords) => term
                .is_none_or(|t| !is_like(text(t), keywords))
                .then(|| format!("expected a value like {keywords:?}")),
            Shape::In(values) => term
                .is_none_or(|t| !values.contains(t))
                .then(|| "unexpected value".to_owned()),
            Shape::Lang(tags) => match term.and_then(language) {
                Some(tag) if tags.is_empty() || contains_tag(tags, tag) => None,
                Some(tag) => Some(format!("unexpected language '{tag}'")),
                None => Some("expected a language-tagged literal".to_owned()),
            },
            Shape::And(_)
            | Shape::Or(_)
            | Shape::Field { .. }
            | Shape::Link { .. }
            | Shape::Guard { .. }
            | Shape::Meta { .. }
            | Shape::MinCount(_)
            | Shape::MaxCount(_)
            | Shape::All(_)
            | Shape::Any(_)
            | Shape::Localized => None,
        })
    }

    fn regex(&mut self, pattern: &str) -> Result<&Regex, ValidationError> {
        if !self.regex_cache.contains_key(pattern) {
            // Patterns match the whole lexical form
            let regex = Regex::new(&format!("^(?:{pattern})$"))
                .map_err(|e| ValidationError::invalid_pattern(pattern, e.to_string()))?;
            self.regex_cache.insert(pattern.to_owned(), regex);
        }
        self.regex_cache
            .get(pattern)
            .ok_or_else(|| ValidationError::invalid_pattern(pattern, "not compiled"))
    }
}

fn violation_for(path: &[Step], shape: &Shape, value: &Value) -> Violation {
    let violation = Violation::new(path.to_vec(), shape.clone());
    match value.as_term() {
        Some(term) => violation.with_value(term.clone()),
        None => violation,
    }
}

fn field_value<'a>(frame: &'a Frame, step: &Step) -> Option<&'a Value> {
    frame
        .get(step)
        .or_else(|| frame.get_by_iri(step.iri(), step.is_inverse()))
}

fn has_type(frame: &Frame, class: &NamedNode) -> bool {
    frame
        .get_by_iri(rdf::TYPE, false)
        .is_some_and(|types| Focus::from(types).contains(&class.clone().into()))
}

fn check_range(
    term: Option<&Term>,
    limit: &Term,
    relation: &str,
    accept: impl Fn(Ordering) -> bool,
) -> Option<String> {
    term.is_none_or(|t| !accept(compare(t, limit)))
        .then(|| format!("expected a value {relation} {limit}"))
}

fn language(term: &Term) -> Option<&str> {
    if let Term::Literal(literal) = term {
        literal.language()
    } else {
        None
    }
}

fn contains_tag(tags: &BTreeSet<String>, tag: &str) -> bool {
    tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Checks that each keyword is the prefix of a word of the text, ignoring case.
fn is_like(text: &str, keywords: &str) -> bool {
    let words = words(text);
    self::words(keywords)
        .iter()
        .all(|keyword| words.iter().any(|word| word.starts_with(keyword.as_str())))
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like() {
        assert!(is_like("<http://exampe.org/>", "ex.org"));
        assert!(is_like("The Quick Brown Fox", "quick fo"));
        assert!(!is_like("The Quick Brown Fox", "uick"));
        assert!(is_like("anything", ""));
    }

    #[test]
    fn test_invalid_pattern() {
        let shape = Shape::pattern("(");
        assert!(matches!(
            validate(&shape, &oxrdf::Literal::new_simple_literal("x").into()),
            Err(ValidationError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_pattern_is_cached() {
        let mut context = ValidationContext::default();
        assert!(context.regex("a+").is_ok());
        assert!(context.regex("a+").is_ok());
        assert_eq!(context.regex_cache.len(), 1);
    }
}

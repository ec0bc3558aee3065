use crate::probe::{DatatypeProbe, FieldsProbe, Probe};
use crate::step::Step;
use crate::value::normalize;
use oxrdf::{NamedNode, Term};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A constraint over a set of values: the focus.
///
/// Shapes are immutable trees compared and hashed structurally.
/// `and()` (an empty conjunction) accepts anything and `or()` (an empty disjunction) accepts nothing.
///
/// The constructors only collapse singleton conjunctions and disjunctions and normalize value sets:
/// the full simplification of a shape is performed by an optimizer pass.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Shape {
    /// Conjunction.
    And(Vec<Self>),
    /// Disjunction.
    Or(Vec<Self>),
    /// The values reached by following `step` from each focus value conform to `shape`.
    Field { step: Step, shape: Box<Self> },
    /// Each focus value has the given datatype or node kind (see [`vocab`](crate::vocab)).
    Datatype(NamedNode),
    /// Each focus value is an instance of the class.
    Clazz(NamedNode),
    /// The focus holds at least the given number of values.
    MinCount(usize),
    /// The focus holds at most the given number of values.
    MaxCount(usize),
    MinInclusive(Term),
    MaxInclusive(Term),
    MinExclusive(Term),
    MaxExclusive(Term),
    /// Each focus value has a textual form at least that long.
    MinLength(usize),
    /// Each focus value has a textual form at most that long.
    MaxLength(usize),
    /// Each focus value has a textual form fully matching the regular expression.
    Pattern(String),
    /// Each focus value has a textual form containing words starting with each of the keywords.
    Like(String),
    /// Each focus value is one of the given values.
    In(Vec<Term>),
    /// Each of the given values is in the focus.
    All(Vec<Term>),
    /// At least one of the given values is in the focus.
    Any(Vec<Term>),
    /// Each focus value is a literal tagged with one of the given languages (any if empty).
    Lang(BTreeSet<String>),
    /// Each focus value is a language-tagged literal, with at most one value per language.
    Localized,
    /// The focus is an alias for the resources related to it by `relation`, which conform to `shape`.
    Link { relation: NamedNode, shape: Box<Self> },
    /// Annotation without effect on validation.
    Meta { key: String, value: Term },
    /// Conditional branch resolved by redaction: `then` applies iff the binding of `axis`
    /// is one of `values`.
    Guard {
        axis: String,
        values: BTreeSet<String>,
        then: Box<Self>,
    },
}

impl Shape {
    /// Conjunction of the given shapes. A single shape is returned as is.
    pub fn and(shapes: impl IntoIterator<Item = Self>) -> Self {
        let mut shapes = shapes.into_iter().collect::<Vec<_>>();
        if shapes.len() == 1 {
            if let Some(shape) = shapes.pop() {
                return shape;
            }
        }
        Self::And(shapes)
    }

    /// Disjunction of the given shapes. A single shape is returned as is.
    pub fn or(shapes: impl IntoIterator<Item = Self>) -> Self {
        let mut shapes = shapes.into_iter().collect::<Vec<_>>();
        if shapes.len() == 1 {
            if let Some(shape) = shapes.pop() {
                return shape;
            }
        }
        Self::Or(shapes)
    }

    pub fn field(step: Step, shape: Self) -> Self {
        Self::Field {
            step,
            shape: Box::new(shape),
        }
    }

    pub fn datatype(datatype: impl Into<NamedNode>) -> Self {
        Self::Datatype(datatype.into())
    }

    pub fn clazz(class: impl Into<NamedNode>) -> Self {
        Self::Clazz(class.into())
    }

    #[inline]
    pub fn min_count(limit: usize) -> Self {
        Self::MinCount(limit)
    }

    /// At most `limit` values.
    ///
    /// A bare value counts as one, while an explicit collection is always plural:
    /// `[x]` fails `max_count(1)` and `x` fails `max_count(0)`.
    #[inline]
    pub fn max_count(limit: usize) -> Self {
        Self::MaxCount(limit)
    }

    pub fn min_inclusive(limit: impl Into<Term>) -> Self {
        Self::MinInclusive(limit.into())
    }

    pub fn max_inclusive(limit: impl Into<Term>) -> Self {
        Self::MaxInclusive(limit.into())
    }

    pub fn min_exclusive(limit: impl Into<Term>) -> Self {
        Self::MinExclusive(limit.into())
    }

    pub fn max_exclusive(limit: impl Into<Term>) -> Self {
        Self::MaxExclusive(limit.into())
    }

    #[inline]
    pub fn min_length(limit: usize) -> Self {
        Self::MinLength(limit)
    }

    #[inline]
    pub fn max_length(limit: usize) -> Self {
        Self::MaxLength(limit)
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::Pattern(pattern.into())
    }

    pub fn like(keywords: impl Into<String>) -> Self {
        Self::Like(keywords.into())
    }

    /// Closed range of values.
    pub fn in_values<T: Into<Term>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::In(normalize(values.into_iter().map(Into::into).collect()))
    }

    pub fn all<T: Into<Term>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::All(normalize(values.into_iter().map(Into::into).collect()))
    }

    pub fn any<T: Into<Term>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::Any(normalize(values.into_iter().map(Into::into).collect()))
    }

    pub fn lang<T: Into<String>>(tags: impl IntoIterator<Item = T>) -> Self {
        Self::Lang(tags.into_iter().map(Into::into).collect())
    }

    #[inline]
    pub fn localized() -> Self {
        Self::Localized
    }

    pub fn link(relation: impl Into<NamedNode>, shape: Self) -> Self {
        Self::Link {
            relation: relation.into(),
            shape: Box::new(shape),
        }
    }

    pub fn meta(key: impl Into<String>, value: impl Into<Term>) -> Self {
        Self::Meta {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn guard<T: Into<String>>(
        axis: impl Into<String>,
        values: impl IntoIterator<Item = T>,
        then: Self,
    ) -> Self {
        Self::Guard {
            axis: axis.into(),
            values: values.into_iter().map(Into::into).collect(),
            then: Box::new(then),
        }
    }

    /// Exactly one value.
    pub fn required() -> Self {
        Self::And(vec![Self::MinCount(1), Self::MaxCount(1)])
    }

    /// At most one value.
    #[inline]
    pub fn optional() -> Self {
        Self::MaxCount(1)
    }

    /// At least one value.
    #[inline]
    pub fn repeatable() -> Self {
        Self::MinCount(1)
    }

    /// Any number of values.
    #[inline]
    pub fn multiple() -> Self {
        Self::And(Vec::new())
    }

    /// Exactly the given values.
    pub fn exactly<T: Into<Term>>(values: impl IntoIterator<Item = T>) -> Self {
        let values = normalize(values.into_iter().map(Into::into).collect());
        Self::And(vec![Self::All(values.clone()), Self::In(values)])
    }

    /// Is this shape `and()`, accepting everything?
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Self::And(shapes) if shapes.is_empty())
    }

    /// Is this shape `or()`, accepting nothing?
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, Self::Or(shapes) if shapes.is_empty())
    }

    /// Is this shape either `and()` or `or()`?
    pub fn is_empty(&self) -> bool {
        self.is_unconstrained() || self.is_unsatisfiable()
    }

    /// Applies a probe to this shape.
    ///
    /// ```
    /// use oxshape::{Probe, Shape};
    ///
    /// struct Depth;
    ///
    /// impl Probe for Depth {
    ///     type Output = usize;
    ///
    ///     fn probe(&mut self, shape: &Shape) -> usize {
    ///         match shape {
    ///             Shape::And(shapes) | Shape::Or(shapes) => {
    ///                 1 + shapes.iter().map(|s| self.probe(s)).max().unwrap_or(0)
    ///             }
    ///             _ => 1,
    ///         }
    ///     }
    /// }
    ///
    /// let shape = Shape::and([Shape::or([Shape::min_count(1), Shape::max_count(2)]), Shape::localized()]);
    /// assert_eq!(shape.map(Depth), 3);
    /// ```
    #[inline]
    pub fn map<P: Probe>(&self, mut probe: P) -> P::Output {
        probe.probe(self)
    }

    /// The envelope of the shape: the fields reachable from the focus, with the conjunction of
    /// their nested shapes.
    ///
    /// Fields are collected through conjunctions, disjunctions, links and guard branches.
    pub fn fields(&self) -> BTreeMap<Step, Self> {
        self.map(FieldsProbe)
    }

    /// The datatype declared for the focus values, if any.
    pub fn declared_datatype(&self) -> Option<NamedNode> {
        self.map(DatatypeProbe)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(shapes) => write_list(f, "and", shapes),
            Self::Or(shapes) => write_list(f, "or", shapes),
            Self::Field { step, shape } => write!(f, "field({step}, {shape})"),
            Self::Datatype(datatype) => write!(f, "datatype({datatype})"),
            Self::Clazz(class) => write!(f, "clazz({class})"),
            Self::MinCount(limit) => write!(f, "min_count({limit})"),
            Self::MaxCount(limit) => write!(f, "max_count({limit})"),
            Self::MinInclusive(limit) => write!(f, "min_inclusive({limit})"),
            Self::MaxInclusive(limit) => write!(f, "max_inclusive({limit})"),
            Self::MinExclusive(limit) => write!(f, "min_exclusive({limit})"),
            Self::MaxExclusive(limit) => write!(f, "max_exclusive({limit})"),
            Self::MinLength(limit) => write!(f, "min_length({limit})"),
            Self::MaxLength(limit) => write!(f, "max_length({limit})"),
            Self::Pattern(pattern) => write!(f, "pattern({pattern:?})"),
            Self::Like(keywords) => write!(f, "like({keywords:?})"),
            Self::In(values) => write_list(f, "in", values),
            Self::All(values) => write_list(f, "all", values),
            Self::Any(values) => write_list(f, "any", values),
            Self::Lang(tags) => {
                f.write_str("lang(")?;
                for (i, tag) in tags.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{tag:?}")?;
                }
                f.write_str(")")
            }
            Self::Localized => f.write_str("localized()"),
            Self::Link { relation, shape } => write!(f, "link({relation}, {shape})"),
            Self::Meta { key, value } => write!(f, "meta({key:?}, {value})"),
            Self::Guard { axis, values, then } => {
                write!(f, "guard({axis:?}, [")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value:?}")?;
                }
                write!(f, "], {then})")
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, name: &str, items: &[impl fmt::Display]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(")")
}

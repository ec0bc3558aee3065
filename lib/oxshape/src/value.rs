use crate::step::Step;
use crate::vocab;
use oxrdf::{Literal, NamedNode, NamedNodeRef, Term};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A data value checked against shapes.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Value {
    /// An RDF term.
    Term(Term),
    /// A plural value: each element is a member of the focus.
    Array(Vec<Self>),
    /// An entity described by its fields.
    Frame(Frame),
}

impl Value {
    /// Flattens the value into the set of values it denotes.
    ///
    /// Arrays denote their elements (recursively), any other value denotes itself.
    pub fn members(&self) -> Vec<&Self> {
        let mut members = Vec::new();
        self.collect_members(&mut members);
        members
    }

    fn collect_members<'a>(&'a self, members: &mut Vec<&'a Self>) {
        if let Self::Array(values) = self {
            for value in values {
                value.collect_members(members);
            }
        } else {
            members.push(self);
        }
    }

    /// The term identifying the value, if any.
    pub fn as_term(&self) -> Option<&Term> {
        match self {
            Self::Term(term) => Some(term),
            Self::Frame(frame) => frame.id(),
            Self::Array(_) => None,
        }
    }

    pub fn as_frame(&self) -> Option<&Frame> {
        if let Self::Frame(frame) = self {
            Some(frame)
        } else {
            None
        }
    }

    /// Checks if the value may be the subject of a statement.
    pub fn is_resource(&self) -> bool {
        match self {
            Self::Term(term) => is_resource(term),
            Self::Frame(_) => true,
            Self::Array(_) => false,
        }
    }
}

impl From<Term> for Value {
    #[inline]
    fn from(term: Term) -> Self {
        Self::Term(term)
    }
}

impl From<NamedNode> for Value {
    #[inline]
    fn from(node: NamedNode) -> Self {
        Self::Term(node.into())
    }
}

impl From<Literal> for Value {
    #[inline]
    fn from(literal: Literal) -> Self {
        Self::Term(literal.into())
    }
}

impl From<Frame> for Value {
    #[inline]
    fn from(frame: Frame) -> Self {
        Self::Frame(frame)
    }
}

impl From<Vec<Self>> for Value {
    #[inline]
    fn from(values: Vec<Self>) -> Self {
        Self::Array(values)
    }
}

impl<T: Into<Value>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::Array(iter.into_iter().map(Into::into).collect())
    }
}

/// An entity: an optional identifier and a map from path steps to values.
///
/// ```
/// use oxrdf::{Literal, NamedNode};
/// use oxshape::{Frame, Step, Value};
///
/// let name = Step::direct(NamedNode::new("http://schema.org/name")?);
/// let frame = Frame::new()
///     .with_id(NamedNode::new("http://example.com/alice")?)
///     .with(name.clone(), Literal::new_simple_literal("Alice"));
/// assert_eq!(
///     frame.get(&name),
///     Some(&Value::from(Literal::new_simple_literal("Alice")))
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Frame {
    id: Option<Term>,
    fields: BTreeMap<Step, Value>,
}

impl Frame {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the identifier of the entity.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<Term>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the value of a field.
    #[must_use]
    pub fn with(mut self, step: Step, value: impl Into<Value>) -> Self {
        self.insert(step, value);
        self
    }

    pub fn insert(&mut self, step: Step, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(step, value.into())
    }

    #[inline]
    pub fn id(&self) -> Option<&Term> {
        self.id.as_ref()
    }

    #[inline]
    pub fn get(&self, step: &Step) -> Option<&Value> {
        self.fields.get(step)
    }

    /// Looks up a field by predicate and direction, ignoring labels.
    pub fn get_by_iri(&self, iri: NamedNodeRef<'_>, inverse: bool) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(step, _)| step.iri() == iri && step.is_inverse() == inverse)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&Step, &Value)> {
        self.fields.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Checks if the term may be the subject of a statement.
pub fn is_resource(term: &Term) -> bool {
    matches!(term, Term::NamedNode(_) | Term::BlankNode(_))
}

/// The datatype of a term: the node kind for IRIs and blank nodes, the literal datatype otherwise.
pub fn datatype_of(term: &Term) -> NamedNodeRef<'_> {
    match term {
        Term::NamedNode(_) => vocab::IRI,
        Term::BlankNode(_) => vocab::BNODE,
        Term::Literal(literal) => literal.datatype(),
        #[allow(unreachable_patterns)]
        _ => vocab::RESOURCE,
    }
}

/// The textual form of a term: the IRI, the blank node identifier or the lexical form.
pub fn text(term: &Term) -> &str {
    match term {
        Term::NamedNode(node) => node.as_str(),
        Term::BlankNode(node) => node.as_str(),
        Term::Literal(literal) => literal.value(),
        #[allow(unreachable_patterns)]
        _ => "",
    }
}

/// A total order over terms.
///
/// Blank nodes sort before IRIs that sort before literals.
/// Numeric literals sort first among literals and are compared by value, then calendar literals,
/// then all other literals by datatype, language tag and lexical form.
///
/// ```
/// use oxrdf::{Literal, NamedNode, Term};
/// use oxshape::compare;
/// use std::cmp::Ordering;
///
/// let ten = Term::from(Literal::from(10));
/// let two = Term::from(Literal::from(2.5));
/// let empty = Term::from(Literal::new_simple_literal(""));
/// assert_eq!(compare(&two, &ten), Ordering::Less);
/// assert_eq!(compare(&ten, &empty), Ordering::Less);
/// assert_eq!(
///     compare(&NamedNode::new("http://example.com")?.into(), &empty),
///     Ordering::Less
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub fn compare(left: &Term, right: &Term) -> Ordering {
    match (left, right) {
        (Term::BlankNode(l), Term::BlankNode(r)) => l.as_str().cmp(r.as_str()),
        (Term::NamedNode(l), Term::NamedNode(r)) => l.as_str().cmp(r.as_str()),
        (Term::Literal(l), Term::Literal(r)) => compare_literals(l, r),
        _ => kind_rank(left).cmp(&kind_rank(right)),
    }
}

fn kind_rank(term: &Term) -> u8 {
    match term {
        Term::BlankNode(_) => 0,
        Term::NamedNode(_) => 1,
        Term::Literal(_) => 2,
        #[allow(unreachable_patterns)]
        _ => 3,
    }
}

fn literal_rank(literal: &Literal) -> u8 {
    let datatype = literal.datatype();
    if numeric_value(literal).is_some() {
        0
    } else if vocab::is_temporal_datatype(datatype) {
        1
    } else {
        2
    }
}

fn compare_literals(left: &Literal, right: &Literal) -> Ordering {
    let rank = literal_rank(left).cmp(&literal_rank(right));
    if rank != Ordering::Equal {
        return rank;
    }
    let by_value = match (numeric_value(left), numeric_value(right)) {
        (Some(l), Some(r)) => l.total_cmp(&r),
        _ => Ordering::Equal,
    };
    by_value
        .then_with(|| left.datatype().as_str().cmp(right.datatype().as_str()))
        .then_with(|| left.language().cmp(&right.language()))
        .then_with(|| left.value().cmp(right.value()))
}

/// The numeric value of a literal with a numeric datatype and a valid lexical form.
pub fn numeric_value(literal: &Literal) -> Option<f64> {
    if vocab::is_numeric_datatype(literal.datatype()) {
        literal.value().trim().parse().ok()
    } else {
        None
    }
}

/// Sorts the terms according to [`compare`] and removes duplicates.
pub fn normalize(mut terms: Vec<Term>) -> Vec<Term> {
    terms.sort_by(compare);
    terms.dedup();
    terms
}

use oxrdf::{NamedNode, NamedNodeRef};
use std::cmp::Ordering;
use std::fmt;

/// A path step: a predicate traversed either from subject to object (direct) or from object to
/// subject (inverse).
///
/// Each step carries a textual label, used as the field name in frames and as the path segment
/// in queries. It defaults to the local name of the predicate IRI, prefixed by `^` for inverse steps.
///
/// ```
/// use oxrdf::NamedNode;
/// use oxshape::Step;
///
/// let knows = NamedNode::new("http://xmlns.com/foaf/0.1/knows")?;
/// assert_eq!(Step::direct(knows.clone()).label(), "knows");
/// assert_eq!(Step::inverse(knows.clone()).label(), "^knows");
/// assert_eq!(Step::direct(knows).with_label("friend").label(), "friend");
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Step {
    iri: NamedNode,
    inverse: bool,
    label: String,
}

impl Step {
    /// A step following `iri` from subject to object.
    pub fn direct(iri: impl Into<NamedNode>) -> Self {
        let iri = iri.into();
        let label = local_name(iri.as_ref()).to_owned();
        Self {
            iri,
            inverse: false,
            label,
        }
    }

    /// A step following `iri` from object to subject.
    pub fn inverse(iri: impl Into<NamedNode>) -> Self {
        let iri = iri.into();
        let label = format!("^{}", local_name(iri.as_ref()));
        Self {
            iri,
            inverse: true,
            label,
        }
    }

    /// Replaces the label of the step.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[inline]
    pub fn iri(&self) -> NamedNodeRef<'_> {
        self.iri.as_ref()
    }

    #[inline]
    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The same predicate traversed in the other direction.
    #[must_use]
    pub fn reverse(&self) -> Self {
        if self.inverse {
            Self::direct(self.iri.clone())
        } else {
            Self::inverse(self.iri.clone())
        }
    }

    /// Checks if a path segment designates this step.
    ///
    /// A segment matches the label, or the IRI between angle brackets optionally prefixed by `^`
    /// for inverse steps.
    pub fn matches(&self, segment: &str) -> bool {
        if segment == self.label {
            return true;
        }
        let (inverse, segment) = match segment.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, segment),
        };
        inverse == self.inverse
            && segment
                .strip_prefix('<')
                .and_then(|s| s.strip_suffix('>'))
                .is_some_and(|iri| iri == self.iri.as_str())
    }
}

impl Ord for Step {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label
            .cmp(&other.label)
            .then_with(|| self.iri.as_str().cmp(other.iri.as_str()))
            .then_with(|| self.inverse.cmp(&other.inverse))
    }
}

impl PartialOrd for Step {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverse {
            write!(f, "^{}", self.iri)
        } else {
            write!(f, "{}", self.iri)
        }
    }
}

/// The part of the IRI after the last `#`, `/` or `:`.
pub(crate) fn local_name(iri: NamedNodeRef<'_>) -> &str {
    let iri = iri.as_str();
    iri.rfind(['#', '/', ':']).map_or(iri, |i| &iri[i + 1..])
}

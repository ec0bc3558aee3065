use oxrdf::Term;
use oxshape::Value;

/// The set of values checked against a shape.
///
/// A missing value is an empty focus, an array is a plural focus holding its elements
/// and any other value is a singleton focus.
#[derive(Debug, Clone, Default)]
pub struct Focus<'a> {
    values: Vec<&'a Value>,
    plural: bool,
}

impl<'a> Focus<'a> {
    pub fn new(value: Option<&'a Value>) -> Self {
        match value {
            None => Self::default(),
            Some(value @ Value::Array(_)) => Self {
                values: value.members(),
                plural: true,
            },
            Some(value) => Self {
                values: vec![value],
                plural: false,
            },
        }
    }

    #[inline]
    pub fn values(&self) -> &[&'a Value] {
        &self.values
    }

    /// The terms of the values, frames being identified by their id.
    pub fn terms(&self) -> impl Iterator<Item = &'a Term> + '_ {
        self.values.iter().filter_map(|value| value.as_term())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Was the focus given as an explicit collection?
    #[inline]
    pub fn is_plural(&self) -> bool {
        self.plural
    }

    pub fn contains(&self, term: &Term) -> bool {
        self.terms().any(|t| t == term)
    }
}

impl<'a> From<&'a Value> for Focus<'a> {
    fn from(value: &'a Value) -> Self {
        Self::new(Some(value))
    }
}

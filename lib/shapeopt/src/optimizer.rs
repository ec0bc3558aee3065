use oxrdf::{NamedNode, Term};
use oxshape::vocab::derives;
use oxshape::{Probe, Shape, Step, compare, normalize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Rewrites shapes into equivalent minimal forms.
///
/// The rewriting only flattens connectives, merges redundant constraints and removes identities:
/// it never changes satisfiability, so contradictory bounds like `min_count(3)` and `max_count(1)`
/// are kept as is. Guards are not resolved, only their branches are optimized.
///
/// The optimization is idempotent.
pub struct Optimizer;

impl Optimizer {
    pub fn optimize(shape: Shape) -> Shape {
        match shape {
            Shape::And(shapes) => {
                Self::optimize_connective(Connective::And, shapes.into_iter().map(Self::optimize))
            }
            Shape::Or(shapes) => {
                Self::optimize_connective(Connective::Or, shapes.into_iter().map(Self::optimize))
            }
            Shape::Field { step, shape } => {
                let shape = Self::optimize(*shape);
                if shape.is_unsatisfiable() {
                    Shape::And(Vec::new())
                } else {
                    Shape::field(step, shape)
                }
            }
            Shape::Link { relation, shape } => {
                let shape = Self::optimize(*shape);
                if shape.is_unsatisfiable() {
                    Shape::And(Vec::new())
                } else {
                    Shape::link(relation, shape)
                }
            }
            Shape::Guard { axis, values, then } => Shape::Guard {
                axis,
                values,
                then: Box::new(Self::optimize(*then)),
            },
            Shape::In(values) => Shape::In(normalize(values)),
            Shape::All(values) => {
                if values.is_empty() {
                    Shape::And(Vec::new())
                } else {
                    Shape::All(normalize(values))
                }
            }
            Shape::Any(values) => {
                if values.is_empty() {
                    Shape::Or(Vec::new())
                } else {
                    Shape::Any(normalize(values))
                }
            }
            shape @ (Shape::Datatype(_)
            | Shape::Clazz(_)
            | Shape::MinCount(_)
            | Shape::MaxCount(_)
            | Shape::MinInclusive(_)
            | Shape::MaxInclusive(_)
            | Shape::MinExclusive(_)
            | Shape::MaxExclusive(_)
            | Shape::MinLength(_)
            | Shape::MaxLength(_)
            | Shape::Pattern(_)
            | Shape::Like(_)
            | Shape::Lang(_)
            | Shape::Localized
            | Shape::Meta { .. }) => shape,
        }
    }

    /// Merges the already optimized members of a conjunction or a disjunction.
    fn optimize_connective(connective: Connective, shapes: impl Iterator<Item = Shape>) -> Shape {
        let mut members = Members::new(connective);
        for shape in shapes {
            match (connective, shape) {
                (Connective::And, Shape::And(children)) | (Connective::Or, Shape::Or(children)) => {
                    for child in children {
                        members.add(child);
                    }
                }
                (Connective::And, shape) if shape.is_unsatisfiable() => return shape,
                (Connective::Or, shape) if shape.is_unconstrained() => return shape,
                (_, shape) => members.add(shape),
            }
        }
        let mut shapes = members.build();
        if shapes.len() == 1 {
            if let Some(shape) = shapes.pop() {
                return shape;
            }
        }
        match connective {
            Connective::And => Shape::And(shapes),
            Connective::Or => Shape::Or(shapes),
        }
    }
}

impl Probe for Optimizer {
    type Output = Shape;

    fn probe(&mut self, shape: &Shape) -> Shape {
        Self::optimize(shape.clone())
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
enum Connective {
    And,
    Or,
}

impl Connective {
    /// Does `new` replace `old` for a lower bound?
    ///
    /// Conjunctions keep the tightest bound, disjunctions the loosest one.
    fn wins_lower(self, ordering: Ordering) -> bool {
        match self {
            Self::And => ordering == Ordering::Greater,
            Self::Or => ordering == Ordering::Less,
        }
    }

    fn wins_upper(self, ordering: Ordering) -> bool {
        self.wins_lower(ordering.reverse())
    }
}

/// The members of a connective, grouped by kind for merging.
struct Members {
    connective: Connective,
    datatypes: Vec<NamedNode>,
    classes: Vec<NamedNode>,
    min_inclusive: Option<Term>,
    max_inclusive: Option<Term>,
    min_exclusive: Option<Term>,
    max_exclusive: Option<Term>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    patterns: Vec<String>,
    likes: Vec<String>,
    range: Option<Vec<Term>>,
    all: Vec<Vec<Term>>,
    any: Vec<Vec<Term>>,
    langs: Vec<BTreeSet<String>>,
    localized: bool,
    min_count: Option<usize>,
    max_count: Option<usize>,
    fields: Vec<(Step, Vec<Shape>)>,
    links: Vec<(NamedNode, Vec<Shape>)>,
    others: Vec<Shape>,
}

impl Members {
    fn new(connective: Connective) -> Self {
        Self {
            connective,
            datatypes: Vec::new(),
            classes: Vec::new(),
            min_inclusive: None,
            max_inclusive: None,
            min_exclusive: None,
            max_exclusive: None,
            min_length: None,
            max_length: None,
            patterns: Vec::new(),
            likes: Vec::new(),
            range: None,
            all: Vec::new(),
            any: Vec::new(),
            langs: Vec::new(),
            localized: false,
            min_count: None,
            max_count: None,
            fields: Vec::new(),
            links: Vec::new(),
            others: Vec::new(),
        }
    }

    fn add(&mut self, shape: Shape) {
        let connective = self.connective;
        match shape {
            Shape::Datatype(datatype) => self.add_datatype(datatype),
            Shape::Clazz(class) => push_unique(&mut self.classes, class),
            Shape::MinCount(limit) => {
                merge_bound(&mut self.min_count, limit, |new, old| {
                    connective.wins_lower(new.cmp(old))
                });
            }
            Shape::MaxCount(limit) => {
                merge_bound(&mut self.max_count, limit, |new, old| {
                    connective.wins_upper(new.cmp(old))
                });
            }
            Shape::MinLength(limit) => {
                merge_bound(&mut self.min_length, limit, |new, old| {
                    connective.wins_lower(new.cmp(old))
                });
            }
            Shape::MaxLength(limit) => {
                merge_bound(&mut self.max_length, limit, |new, old| {
                    connective.wins_upper(new.cmp(old))
                });
            }
            Shape::MinInclusive(limit) => {
                merge_bound(&mut self.min_inclusive, limit, |new, old| {
                    connective.wins_lower(compare(new, old))
                });
            }
            Shape::MaxInclusive(limit) => {
                merge_bound(&mut self.max_inclusive, limit, |new, old| {
                    connective.wins_upper(compare(new, old))
                });
            }
            Shape::MinExclusive(limit) => {
                merge_bound(&mut self.min_exclusive, limit, |new, old| {
                    connective.wins_lower(compare(new, old))
                });
            }
            Shape::MaxExclusive(limit) => {
                merge_bound(&mut self.max_exclusive, limit, |new, old| {
                    connective.wins_upper(compare(new, old))
                });
            }
            Shape::Pattern(pattern) => push_unique(&mut self.patterns, pattern),
            Shape::Like(keywords) => push_unique(&mut self.likes, keywords),
            Shape::In(values) => {
                self.range = Some(match self.range.take() {
                    None => values,
                    Some(mut range) => match connective {
                        Connective::And => {
                            range.retain(|value| values.contains(value));
                            range
                        }
                        Connective::Or => {
                            range.extend(values);
                            normalize(range)
                        }
                    },
                });
            }
            Shape::All(values) => match connective {
                Connective::And => union_into(&mut self.all, values),
                Connective::Or => push_unique(&mut self.all, values),
            },
            Shape::Any(values) => match connective {
                Connective::And => push_unique(&mut self.any, values),
                Connective::Or => union_into(&mut self.any, values),
            },
            Shape::Lang(tags) => self.add_lang(tags),
            Shape::Localized => self.localized = true,
            Shape::Field { step, shape } if connective == Connective::And => {
                if let Some((_, shapes)) = self.fields.iter_mut().find(|(s, _)| *s == step) {
                    shapes.push(*shape);
                } else {
                    self.fields.push((step, vec![*shape]));
                }
            }
            Shape::Link { relation, shape } if connective == Connective::And => {
                if let Some((_, shapes)) = self.links.iter_mut().find(|(r, _)| *r == relation) {
                    shapes.push(*shape);
                } else {
                    self.links.push((relation, vec![*shape]));
                }
            }
            shape @ (Shape::And(_)
            | Shape::Or(_)
            | Shape::Field { .. }
            | Shape::Link { .. }
            | Shape::Meta { .. }
            | Shape::Guard { .. }) => push_unique(&mut self.others, shape),
        }
    }

    fn add_datatype(&mut self, datatype: NamedNode) {
        match self.connective {
            // The most specific datatype wins, incomparable ones are kept
            Connective::And => {
                if self
                    .datatypes
                    .iter()
                    .any(|d| derives(datatype.as_ref(), d.as_ref()))
                {
                    return;
                }
                self.datatypes
                    .retain(|d| !derives(d.as_ref(), datatype.as_ref()));
            }
            Connective::Or => {
                if self
                    .datatypes
                    .iter()
                    .any(|d| derives(d.as_ref(), datatype.as_ref()))
                {
                    return;
                }
                self.datatypes
                    .retain(|d| !derives(datatype.as_ref(), d.as_ref()));
            }
        }
        self.datatypes.push(datatype);
    }

    fn add_lang(&mut self, tags: BTreeSet<String>) {
        match self.connective {
            // An empty tag set accepts any language
            Connective::And => {
                if tags.is_empty() {
                    if self.langs.is_empty() {
                        self.langs.push(tags);
                    }
                    return;
                }
                for existing in &mut self.langs {
                    if existing.is_empty() {
                        *existing = tags;
                        return;
                    }
                    let common = existing.intersection(&tags).cloned().collect::<BTreeSet<_>>();
                    if !common.is_empty() {
                        *existing = common;
                        return;
                    }
                }
                self.langs.push(tags);
            }
            Connective::Or => {
                if let Some(existing) = self.langs.first_mut() {
                    if existing.is_empty() || tags.is_empty() {
                        existing.clear();
                    } else {
                        existing.extend(tags);
                    }
                } else {
                    self.langs.push(tags);
                }
            }
        }
    }

    fn build(self) -> Vec<Shape> {
        let mut shapes = Vec::new();
        shapes.extend(self.datatypes.into_iter().map(Shape::Datatype));
        shapes.extend(self.classes.into_iter().map(Shape::Clazz));
        shapes.extend(self.min_inclusive.map(Shape::MinInclusive));
        shapes.extend(self.max_inclusive.map(Shape::MaxInclusive));
        shapes.extend(self.min_exclusive.map(Shape::MinExclusive));
        shapes.extend(self.max_exclusive.map(Shape::MaxExclusive));
        shapes.extend(self.min_length.map(Shape::MinLength));
        shapes.extend(self.max_length.map(Shape::MaxLength));
        shapes.extend(self.patterns.into_iter().map(Shape::Pattern));
        shapes.extend(self.likes.into_iter().map(Shape::Like));
        shapes.extend(self.range.map(Shape::In));
        shapes.extend(self.all.into_iter().map(Shape::All));
        shapes.extend(self.any.into_iter().map(Shape::Any));
        shapes.extend(self.langs.into_iter().map(Shape::Lang));
        if self.localized {
            shapes.push(Shape::Localized);
        }
        shapes.extend(self.min_count.map(Shape::MinCount));
        shapes.extend(self.max_count.map(Shape::MaxCount));
        for (step, nested) in self.fields {
            let nested = merge_nested(nested);
            if !nested.is_unsatisfiable() {
                shapes.push(Shape::field(step, nested));
            }
        }
        for (relation, nested) in self.links {
            let nested = merge_nested(nested);
            if !nested.is_unsatisfiable() {
                shapes.push(Shape::link(relation, nested));
            }
        }
        shapes.extend(self.others);
        shapes
    }
}

/// Conjunction of the optimized shapes of a merged field.
fn merge_nested(mut shapes: Vec<Shape>) -> Shape {
    if shapes.len() == 1 {
        if let Some(shape) = shapes.pop() {
            return shape;
        }
    }
    Optimizer::optimize(Shape::And(shapes))
}

fn merge_bound<T>(slot: &mut Option<T>, value: T, wins: impl Fn(&T, &T) -> bool) {
    if slot.as_ref().is_none_or(|old| wins(&value, old)) {
        *slot = Some(value);
    }
}

fn push_unique<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if !values.contains(&value) {
        values.push(value);
    }
}

fn union_into(sets: &mut Vec<Vec<Term>>, values: Vec<Term>) {
    if let Some(set) = sets.first_mut() {
        set.extend(values);
        *set = normalize(std::mem::take(set));
    } else {
        sets.push(values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::Literal;

    fn step(name: &str) -> Step {
        Step::direct(NamedNode::new_unchecked(format!("http://example.com/{name}")))
    }

    #[test]
    fn test_flatten_and_collapse() {
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![Shape::And(vec![Shape::MinCount(1)])])),
            Shape::MinCount(1)
        );
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![Shape::And(Vec::new()), Shape::And(Vec::new())])),
            Shape::And(Vec::new())
        );
        assert_eq!(
            Optimizer::optimize(Shape::Or(vec![Shape::Or(Vec::new())])),
            Shape::Or(Vec::new())
        );
    }

    #[test]
    fn test_absorbing_members() {
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![Shape::MinCount(1), Shape::Or(Vec::new())])),
            Shape::Or(Vec::new())
        );
        assert_eq!(
            Optimizer::optimize(Shape::Or(vec![Shape::MinCount(1), Shape::And(Vec::new())])),
            Shape::And(Vec::new())
        );
    }

    #[test]
    fn test_merge_counts() {
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![Shape::MinCount(1), Shape::MinCount(3)])),
            Shape::MinCount(3)
        );
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![Shape::MaxCount(1), Shape::MaxCount(3)])),
            Shape::MaxCount(1)
        );
        assert_eq!(
            Optimizer::optimize(Shape::Or(vec![Shape::MinCount(1), Shape::MinCount(3)])),
            Shape::MinCount(1)
        );
        assert_eq!(
            Optimizer::optimize(Shape::Or(vec![Shape::MaxCount(1), Shape::MaxCount(3)])),
            Shape::MaxCount(3)
        );
    }

    #[test]
    fn test_contradictions_are_kept() {
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![Shape::MinCount(3), Shape::MaxCount(1)])),
            Shape::And(vec![Shape::MinCount(3), Shape::MaxCount(1)])
        );
    }

    #[test]
    fn test_merge_ranges() {
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![
                Shape::min_inclusive(Literal::from(1)),
                Shape::min_inclusive(Literal::from(5)),
            ])),
            Shape::min_inclusive(Literal::from(5))
        );
        assert_eq!(
            Optimizer::optimize(Shape::Or(vec![
                Shape::max_exclusive(Literal::from(1)),
                Shape::max_exclusive(Literal::from(5)),
            ])),
            Shape::max_exclusive(Literal::from(5))
        );
    }

    #[test]
    fn test_merge_value_sets() {
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![
                Shape::in_values([Literal::from(1), Literal::from(2)]),
                Shape::in_values([Literal::from(2), Literal::from(3)]),
            ])),
            Shape::in_values([Literal::from(2)])
        );
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![
                Shape::all([Literal::from(1)]),
                Shape::all([Literal::from(2)]),
            ])),
            Shape::all([Literal::from(1), Literal::from(2)])
        );
        assert_eq!(
            Optimizer::optimize(Shape::Or(vec![
                Shape::any([Literal::from(1)]),
                Shape::any([Literal::from(2)]),
            ])),
            Shape::any([Literal::from(1), Literal::from(2)])
        );
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![
                Shape::any([Literal::from(1)]),
                Shape::any([Literal::from(2)]),
            ])),
            Shape::And(vec![
                Shape::any([Literal::from(1)]),
                Shape::any([Literal::from(2)]),
            ])
        );
    }

    #[test]
    fn test_empty_value_sets() {
        assert_eq!(Optimizer::optimize(Shape::All(Vec::new())), Shape::and([]));
        assert_eq!(Optimizer::optimize(Shape::Any(Vec::new())), Shape::or([]));
    }

    #[test]
    fn test_merge_fields() {
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![
                Shape::field(step("a"), Shape::MinCount(1)),
                Shape::field(step("a"), Shape::MaxCount(1)),
            ])),
            Shape::field(
                step("a"),
                Shape::And(vec![Shape::MinCount(1), Shape::MaxCount(1)])
            )
        );
        assert_eq!(
            Optimizer::optimize(Shape::field(step("a"), Shape::Or(Vec::new()))),
            Shape::and([])
        );
    }

    #[test]
    fn test_fields_are_not_merged_in_disjunctions() {
        let shape = Shape::Or(vec![
            Shape::field(step("a"), Shape::MinCount(1)),
            Shape::field(step("a"), Shape::MaxCount(1)),
        ]);
        assert_eq!(Optimizer::optimize(shape.clone()), shape);
    }

    #[test]
    fn test_guards_are_kept() {
        let shape = Shape::guard(
            "role",
            ["admin"],
            Shape::And(vec![Shape::MinCount(1), Shape::MinCount(2)]),
        );
        assert_eq!(
            Optimizer::optimize(shape),
            Shape::guard("role", ["admin"], Shape::MinCount(2))
        );
    }

    #[test]
    fn test_datatypes() {
        use oxshape::vocab::{IRI, RESOURCE};
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![
                Shape::datatype(RESOURCE),
                Shape::datatype(IRI)
            ])),
            Shape::datatype(IRI)
        );
        assert_eq!(
            Optimizer::optimize(Shape::Or(vec![
                Shape::datatype(RESOURCE),
                Shape::datatype(IRI)
            ])),
            Shape::datatype(RESOURCE)
        );
    }

    #[test]
    fn test_langs() {
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![
                Shape::lang(["en", "fr"]),
                Shape::lang(["en", "de"])
            ])),
            Shape::lang(["en"])
        );
        assert_eq!(
            Optimizer::optimize(Shape::And(vec![
                Shape::lang(Vec::<String>::new()),
                Shape::lang(["en"])
            ])),
            Shape::lang(["en"])
        );
        assert_eq!(
            Optimizer::optimize(Shape::Or(vec![Shape::lang(["en"]), Shape::lang(["fr"])])),
            Shape::lang(["en", "fr"])
        );
    }
}

use oxshape::{Accept, Probe, Shape, guard};

/// Projects a shape on the guard branches of an axis.
///
/// Matching guards are replaced by their branch and the other ones are dropped from their
/// container, so pruning never makes a shape unsatisfiable: unlike redaction it selects what is
/// visible, it does not authorize.
/// Guards on other axes are kept.
///
/// ```
/// use oxshape::{Shape, guard};
/// use shapeopt::Pruner;
///
/// let shape = Shape::and([
///     guard::convey(Shape::max_count(1)),
///     guard::filter(Shape::min_count(1)),
/// ]);
/// assert_eq!(Pruner::filter().prune(&shape), Shape::And(vec![Shape::min_count(1)]));
/// ```
#[derive(Debug, Clone)]
pub struct Pruner {
    axis: String,
    accept: Accept,
}

impl Pruner {
    pub fn new(axis: impl Into<String>, accept: impl Into<Accept>) -> Self {
        Self {
            axis: axis.into(),
            accept: accept.into(),
        }
    }

    /// Keeps the branches selecting resources.
    pub fn filter() -> Self {
        Self::new(guard::MODE, Accept::values([guard::FILTER]))
    }

    /// Keeps the branches describing returned content.
    pub fn convey() -> Self {
        Self::new(guard::MODE, Accept::values([guard::CONVEY]))
    }

    pub fn prune(&self, shape: &Shape) -> Shape {
        self.prune_member(shape).unwrap_or_else(|| Shape::And(Vec::new()))
    }

    /// Returns `None` if the shape must be dropped from its container.
    fn prune_member(&self, shape: &Shape) -> Option<Shape> {
        match shape {
            Shape::And(shapes) => {
                Self::prune_connective(shapes, Shape::And, |s| self.prune_member(s))
            }
            Shape::Or(shapes) => Self::prune_connective(shapes, Shape::Or, |s| self.prune_member(s)),
            Shape::Field { step, shape } => Some(Shape::field(step.clone(), self.prune(shape))),
            Shape::Link { relation, shape } => {
                Some(Shape::link(relation.clone(), self.prune(shape)))
            }
            Shape::Guard { axis, values, then } => {
                if *axis != self.axis {
                    Some(Shape::Guard {
                        axis: axis.clone(),
                        values: values.clone(),
                        then: Box::new(self.prune(then)),
                    })
                } else if self.accept.accepts(values) {
                    self.prune_member(then)
                } else {
                    None
                }
            }
            Shape::Datatype(_)
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
            | Shape::In(_)
            | Shape::All(_)
            | Shape::Any(_)
            | Shape::Lang(_)
            | Shape::Localized
            | Shape::Meta { .. } => Some(shape.clone()),
        }
    }

    /// A connective whose members have all been dropped is dropped too.
    fn prune_connective(
        shapes: &[Shape],
        build: impl FnOnce(Vec<Shape>) -> Shape,
        prune: impl FnMut(&Shape) -> Option<Shape>,
    ) -> Option<Shape> {
        let pruned = shapes.iter().filter_map(prune).collect::<Vec<_>>();
        if pruned.is_empty() && !shapes.is_empty() {
            None
        } else {
            Some(build(pruned))
        }
    }
}

impl Probe for Pruner {
    type Output = Shape;

    fn probe(&mut self, shape: &Shape) -> Shape {
        self.prune(shape)
    }
}

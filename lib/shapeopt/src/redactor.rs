use crate::optimizer::Optimizer;
use oxshape::{Accept, Probe, Shape};
use tracing::debug;

/// Partially evaluates the guards of an axis.
///
/// Accepted guards are replaced by their (redacted) branch, the other ones by `or()`:
/// redaction removes paths, it never adds them.
/// Guards on other axes are kept for a later redaction.
///
/// ```
/// use oxshape::{Accept, Shape};
/// use shapeopt::Redactor;
///
/// let shape = Shape::guard("task", ["create", "update"], Shape::min_count(1));
/// assert_eq!(Redactor::new("task", Accept::values(["update"])).redact(&shape), Shape::min_count(1));
/// assert_eq!(Redactor::new("task", Accept::values(["delete"])).redact(&shape), Shape::or([]));
/// assert_eq!(Redactor::new("role", Accept::Any).redact(&shape), shape);
/// ```
#[derive(Debug, Clone)]
pub struct Redactor {
    axis: String,
    accept: Accept,
}

impl Redactor {
    pub fn new(axis: impl Into<String>, accept: impl Into<Accept>) -> Self {
        Self {
            axis: axis.into(),
            accept: accept.into(),
        }
    }

    pub fn redact(&self, shape: &Shape) -> Shape {
        match shape {
            Shape::And(shapes) => Shape::And(shapes.iter().map(|s| self.redact(s)).collect()),
            Shape::Or(shapes) => Shape::Or(shapes.iter().map(|s| self.redact(s)).collect()),
            Shape::Field { step, shape } => Shape::field(step.clone(), self.redact(shape)),
            Shape::Link { relation, shape } => Shape::link(relation.clone(), self.redact(shape)),
            Shape::Guard { axis, values, then } => {
                if *axis != self.axis {
                    Shape::Guard {
                        axis: axis.clone(),
                        values: values.clone(),
                        then: Box::new(self.redact(then)),
                    }
                } else if self.accept.accepts(values) {
                    self.redact(then)
                } else {
                    Shape::Or(Vec::new())
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
            | Shape::Meta { .. } => shape.clone(),
        }
    }

    /// Applies a sequence of redactions, then optimizes the result.
    ///
    /// This is the way authorization envelopes are computed, with bindings for the
    /// `role`, `task`, `area` and `mode` axes in this order.
    ///
    /// ```
    /// use oxshape::{Accept, Shape, guard};
    /// use shapeopt::Redactor;
    ///
    /// let shape = guard::role(["admin"], guard::member(Shape::min_count(1)));
    /// assert_eq!(
    ///     Redactor::throttle(
    ///         &shape,
    ///         [("role", Accept::values(["admin"])), ("area", Accept::values(["detail"]))]
    ///     ),
    ///     Shape::min_count(1)
    /// );
    /// ```
    pub fn throttle<A: Into<String>>(
        shape: &Shape,
        bindings: impl IntoIterator<Item = (A, Accept)>,
    ) -> Shape {
        let mut shape = shape.clone();
        for (axis, accept) in bindings {
            shape = Self::new(axis, accept).redact(&shape);
        }
        Optimizer::optimize(shape)
    }
}

impl Probe for Redactor {
    type Output = Shape;

    fn probe(&mut self, shape: &Shape) -> Shape {
        debug!(axis = %self.axis, accept = ?self.accept, "redacting shape");
        self.redact(shape)
    }
}

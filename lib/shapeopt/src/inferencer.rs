use oxrdf::Literal;
use oxrdf::vocab::{rdf, xsd};
use oxshape::{Probe, Shape, datatype_of, vocab};

/// Expands shapes with the constraints they structurally imply.
///
/// Each constraint is conjoined with its consequences, containers are rebuilt with expanded
/// members: the result is always implied by the original shape and may be simplified
/// with the [`Optimizer`](crate::Optimizer).
///
/// ```
/// use oxrdf::Literal;
/// use oxrdf::vocab::xsd;
/// use oxshape::Shape;
/// use shapeopt::{Inferencer, Optimizer};
///
/// assert_eq!(
///     Optimizer::optimize(Inferencer::expand(&Shape::datatype(xsd::BOOLEAN))),
///     Shape::And(vec![
///         Shape::datatype(xsd::BOOLEAN),
///         Shape::in_values([Literal::from(false), Literal::from(true)]),
///         Shape::max_count(1),
///     ])
/// );
/// ```
pub struct Inferencer;

impl Inferencer {
    pub fn expand(shape: &Shape) -> Shape {
        match shape {
            Shape::And(shapes) => {
                let mut expanded = shapes.iter().map(Self::expand).collect::<Vec<_>>();
                if shapes.contains(&Shape::Localized) {
                    for shape in shapes {
                        if let Shape::Lang(tags) = shape {
                            if !tags.is_empty() {
                                expanded.push(Shape::MaxCount(tags.len()));
                            }
                        }
                    }
                }
                Shape::And(expanded)
            }
            Shape::Or(shapes) => Shape::Or(shapes.iter().map(Self::expand).collect()),
            Shape::Field { step, shape } => {
                let mut nested = Self::expand(shape);
                if (step.is_inverse() || step.iri() == rdf::TYPE)
                    && shape.declared_datatype().is_none()
                {
                    nested = Shape::And(vec![nested, Shape::datatype(vocab::RESOURCE)]);
                }
                let field = Shape::field(step.clone(), nested);
                if step.is_inverse() {
                    field
                } else {
                    Shape::And(vec![Shape::datatype(vocab::RESOURCE), field])
                }
            }
            Shape::Link { relation, shape } => Shape::And(vec![
                Shape::datatype(vocab::RESOURCE),
                Shape::link(
                    relation.clone(),
                    Shape::And(vec![Self::expand(shape), Shape::datatype(vocab::RESOURCE)]),
                ),
            ]),
            Shape::Guard { axis, values, then } => Shape::Guard {
                axis: axis.clone(),
                values: values.clone(),
                then: Box::new(Self::expand(then)),
            },
            Shape::Datatype(datatype) => {
                if *datatype == xsd::BOOLEAN {
                    Shape::And(vec![
                        shape.clone(),
                        Shape::MaxCount(1),
                        Shape::in_values([Literal::from(false), Literal::from(true)]),
                    ])
                } else {
                    shape.clone()
                }
            }
            Shape::Clazz(_) => {
                Shape::And(vec![shape.clone(), Shape::datatype(vocab::RESOURCE)])
            }
            Shape::In(values) => {
                let mut implied = vec![shape.clone(), Shape::MaxCount(values.len())];
                let mut datatypes = values.iter().map(datatype_of);
                if let Some(first) = datatypes.next() {
                    if datatypes.all(|datatype| datatype == first) {
                        implied.push(Shape::datatype(first));
                    }
                }
                Shape::And(implied)
            }
            Shape::All(values) => Shape::And(vec![shape.clone(), Shape::MinCount(values.len())]),
            Shape::Any(_) => Shape::And(vec![shape.clone(), Shape::MinCount(1)]),
            Shape::Lang(_) | Shape::Localized => {
                Shape::And(vec![shape.clone(), Shape::datatype(rdf::LANG_STRING)])
            }
            Shape::MinCount(_)
            | Shape::MaxCount(_)
            | Shape::MinInclusive(_)
            | Shape::MaxInclusive(_)
            | Shape::MinExclusive(_)
            | Shape::MaxExclusive(_)
            | Shape::MinLength(_)
            | Shape::MaxLength(_)
            | Shape::Pattern(_)
            | Shape::Like(_)
            | Shape::Meta { .. } => shape.clone(),
        }
    }
}

impl Probe for Inferencer {
    type Output = Shape;

    fn probe(&mut self, shape: &Shape) -> Shape {
        Self::expand(shape)
    }
}

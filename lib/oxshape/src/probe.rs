//! Operations over shapes.
//!
//! A [`Probe`] is a total function over the shape variants.
//! Implementations match on every variant without wildcard arms.

use crate::shape::Shape;
use crate::step::Step;
use crate::vocab;
use oxrdf::NamedNode;
use std::collections::BTreeMap;

/// A function over shapes, applied with [`Shape::map`].
pub trait Probe {
    type Output;

    fn probe(&mut self, shape: &Shape) -> Self::Output;
}

impl<P: Probe + ?Sized> Probe for &mut P {
    type Output = P::Output;

    #[inline]
    fn probe(&mut self, shape: &Shape) -> Self::Output {
        (**self).probe(shape)
    }
}

/// Collects the field envelope of a shape.
pub struct FieldsProbe;

impl Probe for FieldsProbe {
    type Output = BTreeMap<Step, Shape>;

    fn probe(&mut self, shape: &Shape) -> Self::Output {
        match shape {
            Shape::And(shapes) | Shape::Or(shapes) => {
                let mut fields = BTreeMap::new();
                for shape in shapes {
                    merge_fields(&mut fields, self.probe(shape));
                }
                fields
            }
            Shape::Field { step, shape } => {
                BTreeMap::from([(step.clone(), shape.as_ref().clone())])
            }
            Shape::Link { shape, .. } => self.probe(shape),
            Shape::Guard { then, .. } => self.probe(then),
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
            | Shape::Meta { .. } => BTreeMap::new(),
        }
    }
}

fn merge_fields(target: &mut BTreeMap<Step, Shape>, source: BTreeMap<Step, Shape>) {
    for (step, shape) in source {
        let merged = match target.remove(&step) {
            Some(Shape::And(mut shapes)) => {
                shapes.push(shape);
                Shape::And(shapes)
            }
            Some(existing) => Shape::And(vec![existing, shape]),
            None => shape,
        };
        target.insert(step, merged);
    }
}

/// Finds the datatype declared for the focus values.
///
/// Within conjunctions the most specific datatype wins; disjunctions declare a datatype only if
/// all their branches declare the same one.
pub struct DatatypeProbe;

impl Probe for DatatypeProbe {
    type Output = Option<NamedNode>;

    fn probe(&mut self, shape: &Shape) -> Self::Output {
        match shape {
            Shape::And(shapes) => shapes
                .iter()
                .filter_map(|shape| self.probe(shape))
                .reduce(|upper, lower| {
                    if vocab::derives(upper.as_ref(), lower.as_ref()) {
                        lower
                    } else {
                        upper
                    }
                }),
            Shape::Or(shapes) => {
                let mut datatypes = shapes.iter().map(|shape| self.probe(shape));
                let first = datatypes.next()??;
                datatypes
                    .all(|datatype| datatype.as_ref() == Some(&first))
                    .then_some(first)
            }
            Shape::Datatype(datatype) => Some(datatype.clone()),
            Shape::Guard { then, .. } => self.probe(then),
            Shape::Field { .. }
            | Shape::Link { .. }
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
            | Shape::Meta { .. } => None,
        }
    }
}

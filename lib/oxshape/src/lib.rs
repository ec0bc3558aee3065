#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod guard;
mod interning;
mod probe;
mod shape;
mod step;
mod value;
pub mod vocab;

pub use guard::Accept;
pub use interning::ShapeInterner;
pub use probe::{DatatypeProbe, FieldsProbe, Probe};
pub use shape::Shape;
pub use step::Step;
pub use value::{
    Frame, Value, compare, datatype_of, is_resource, normalize, numeric_value, text,
};

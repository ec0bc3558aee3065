#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod focus;
mod report;
mod validator;

pub use error::ValidationError;
pub use focus::Focus;
pub use report::{ValidationReport, Violation};
pub use validator::{Validator, validate};

#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod compiler;
mod error;
mod query;

pub use compiler::{compile, compile_json};
pub use error::QueryError;
pub use query::{Order, Query};

#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod cache;
mod inferencer;
mod optimizer;
mod outliner;
mod pruner;
mod redactor;

pub use cache::ShapeCache;
pub use inferencer::Inferencer;
pub use optimizer::Optimizer;
pub use outliner::Outliner;
pub use pruner::Pruner;
pub use redactor::Redactor;

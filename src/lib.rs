#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use sg_models as models;
pub use sg_reflect as reflect;
pub use sg_utils as utils;

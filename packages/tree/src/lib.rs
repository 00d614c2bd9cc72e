//! Element tree for documentation XML.
//!
//! This crate provides the mutable tree the adjust and render passes operate
//! on: an arena of tagged elements following the lxml text/tail model, plus
//! loading from and serializing to XML.

pub mod error;
pub mod tree;
pub mod xml;

pub use error::{TreeError, TreeResult};
pub use tree::{Ancestors, Attributes, Namespaces, NodeId, Tree};
pub use xml::ParseOptions;

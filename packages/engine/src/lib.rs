//! Rule dispatch for documentation trees.
//!
//! Two passes share one abstraction: an ordered list of guarded [`Rule`]s
//! where the first rule accepting a node handles it. The [`MutationEngine`]
//! canonicalizes a tree in place through a [`MutationCursor`]; the
//! [`RenderEngine`] turns a canonical tree into markup text.

pub mod cursor;
pub mod engine;
pub mod error;
pub mod mutation;
pub mod query;
pub mod render;
pub mod rule;
pub mod schema;
pub mod xref;

pub use cursor::MutationCursor;
pub use engine::{Position, RuleEngine};
pub use error::{AerateError, AerateResult};
pub use mutation::{MutationAction, MutationEngine, DEFAULT_MAX_STEPS};
pub use query::PathQuery;
pub use render::{RenderAction, RenderEngine, RenderFallback};
pub use rule::{Guard, NodePredicate, Rule};
pub use schema::MarkupClass;
pub use xref::{CrossReferenceIndex, NullIndex, Target, TargetKind};

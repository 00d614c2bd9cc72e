use aerate_tree::TreeError;
use thiserror::Error;

pub type AerateResult<T> = Result<T, AerateError>;

#[derive(Error, Debug)]
pub enum AerateError {
    /// The documentation tree holds a shape the recipe doesn't recognize
    #[error("Can't handle <{tag}> inside <{context}>")]
    Schema { tag: String, context: String },

    /// A required child element is absent
    #[error("Missing <{tag}> in <{context}>")]
    Missing { tag: String, context: String },

    /// A cursor primitive was used outside its preconditions
    #[error("Cannot {operation} <{tag}>: {reason}")]
    Contract {
        operation: &'static str,
        tag: String,
        reason: String,
    },

    #[error("No rule named '{0}'")]
    UnknownRule(String),

    #[error("Invalid path query '{query}': {message}")]
    Query { query: String, message: String },

    #[error("Mutation pass made no progress after {steps} steps (on <{tag}>)")]
    NoProgress { steps: usize, tag: String },

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
}

impl AerateError {
    pub fn schema(tag: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Schema {
            tag: tag.into(),
            context: context.into(),
        }
    }

    pub fn missing(tag: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Missing {
            tag: tag.into(),
            context: context.into(),
        }
    }

    pub fn contract(operation: &'static str, tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Contract {
            operation,
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    pub fn query(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            query: query.into(),
            message: message.into(),
        }
    }
}

use aerate_tree::TreeError;
use thiserror::Error;

pub type IndexResult<T> = Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    /// An identifier that doesn't resolve to exactly one definition
    #[error("Lookup failed: {0}")]
    Lookup(String),
}

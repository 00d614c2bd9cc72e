use thiserror::Error;

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Malformed XML at {pos}: {source}")]
    Xml {
        pos: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Unexpected end tag </{found}> at {pos}, expected </{expected}>")]
    UnbalancedEndTag {
        pos: u64,
        expected: String,
        found: String,
    },

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Document has more than one root element (found <{tag}> at {pos})")]
    MultipleRoots { pos: u64, tag: String },

    #[error("Unclosed element <{tag}> at end of document")]
    Unclosed { tag: String },

    #[error("Invalid tree edit: {0}")]
    Structure(String),
}

impl TreeError {
    pub fn xml(pos: u64, source: impl Into<quick_xml::Error>) -> Self {
        Self::Xml {
            pos,
            source: source.into(),
        }
    }

    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure(message.into())
    }
}

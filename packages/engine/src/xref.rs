//! Cross-reference lookup used by the render pass.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// What a reference points at, as far as choosing a role goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Function,
    Macro,
    Typedef,
    Struct,
    Union,
    Enum,
    Enumerator,
    Variable,
    Other,
}

impl TargetKind {
    /// Map a Doxygen `kind` attribute (`function`, `define`, `typedef`, ...)
    pub fn from_doxygen(kind: &str) -> Self {
        match kind {
            "function" => TargetKind::Function,
            "define" => TargetKind::Macro,
            "typedef" => TargetKind::Typedef,
            "struct" => TargetKind::Struct,
            "union" => TargetKind::Union,
            "enum" => TargetKind::Enum,
            "enumvalue" => TargetKind::Enumerator,
            "variable" => TargetKind::Variable,
            _ => TargetKind::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::Function => "function",
            TargetKind::Macro => "macro",
            TargetKind::Typedef => "typedef",
            TargetKind::Struct => "struct",
            TargetKind::Union => "union",
            TargetKind::Enum => "enum",
            TargetKind::Enumerator => "enumerator",
            TargetKind::Variable => "variable",
            TargetKind::Other => "other",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: TargetKind,
    pub name: String,
}

impl Target {
    pub fn new(kind: TargetKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// Resolves a reference identifier to its target. A miss is not an error;
/// the renderer falls back to an unresolved literal.
pub trait CrossReferenceIndex {
    fn resolve(&self, refid: &str) -> Option<Target>;
}

/// An index that resolves nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullIndex;

impl CrossReferenceIndex for NullIndex {
    fn resolve(&self, _refid: &str) -> Option<Target> {
        None
    }
}

impl CrossReferenceIndex for HashMap<String, Target> {
    fn resolve(&self, refid: &str) -> Option<Target> {
        self.get(refid).cloned()
    }
}

/// Lets one index back a render engine while its owner keeps using it
impl<T: CrossReferenceIndex + ?Sized> CrossReferenceIndex for Rc<T> {
    fn resolve(&self, refid: &str) -> Option<Target> {
        (**self).resolve(refid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doxygen_kinds() {
        assert_eq!(TargetKind::from_doxygen("define"), TargetKind::Macro);
        assert_eq!(TargetKind::from_doxygen("enumvalue"), TargetKind::Enumerator);
        assert_eq!(TargetKind::from_doxygen("file"), TargetKind::Other);
    }

    #[test]
    fn test_map_index() {
        let mut index = HashMap::new();
        index.insert("a1".to_string(), Target::new(TargetKind::Function, "f"));
        assert_eq!(index.resolve("a1").map(|t| t.name), Some("f".to_string()));
        assert_eq!(index.resolve("a2"), None);
        assert_eq!(NullIndex.resolve("a1"), None);
    }

    #[test]
    fn test_shared_index() {
        let mut map = HashMap::new();
        map.insert("t".to_string(), Target::new(TargetKind::Typedef, "t_t"));
        let shared = Rc::new(map);
        let boxed: Box<dyn CrossReferenceIndex> = Box::new(Rc::clone(&shared));
        assert_eq!(boxed.resolve("t"), shared.resolve("t"));
    }
}

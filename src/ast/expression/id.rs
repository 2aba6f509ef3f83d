use serde::{Deserialize, Serialize};

use crate::ast::Span;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Id {
    pub name: String,
    pub position: Span,
}

impl Id {
    /// The underscore is a write-only placeholder: it can appear as a
    /// `for` loop variable but never as a value.
    pub fn is_underscore(&self) -> bool {
        self.name == "_"
    }
}

/// `@name` identifier used for refinement predicates, only valid in
/// callee position (`@sorted(arr)`) or after `|-`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaId {
    pub name: String,
    pub position: Span,
}

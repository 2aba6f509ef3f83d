use serde::{Deserialize, Serialize};

use crate::ast::Span;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Str {
    pub value: String,
    pub position: Span,
}

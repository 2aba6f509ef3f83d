use serde::{Deserialize, Serialize};

use crate::ast::Span;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bool {
    pub value: bool,
    pub position: Span,
}

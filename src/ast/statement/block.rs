use serde::{Deserialize, Serialize};

use crate::ast::{Span, Statement};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub position: Span,
}

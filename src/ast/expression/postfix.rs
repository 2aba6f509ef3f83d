use serde::{Deserialize, Serialize};

use crate::ast::Span;

use super::{Expression, Id};

/// Postfix forms: calls, indexing, and member access. Grouped because
/// they share the leading operand and chain freely (`g.getNeighbors(v)[0]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Postfix {
    Call {
        expr: Box<Expression>,
        args: Vec<Expression>,
        position: Span,
    },
    Index {
        expr: Box<Expression>,
        index: Box<Expression>,
        position: Span,
    },
    PropertyAccess {
        expr: Box<Expression>,
        property: Id,
        position: Span,
    },
}

impl Postfix {
    pub fn position(&self) -> Span {
        match self {
            Postfix::Call { position, .. } => position.clone(),
            Postfix::Index { position, .. } => position.clone(),
            Postfix::PropertyAccess { position, .. } => position.clone(),
        }
    }
}

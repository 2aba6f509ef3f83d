use serde::{Deserialize, Serialize};

use crate::ast::Span;

use super::Expression;

/// `typeof e` — evaluates to the runtime rendering of the static type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeOf {
    pub operand: Box<Expression>,
    pub position: Span,
}

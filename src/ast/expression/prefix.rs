use serde::{Deserialize, Serialize};

use crate::ast::Span;

use super::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixOperator {
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "!")]
    Not,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixExpression {
    pub operator: PrefixOperator,
    pub operand: Box<Expression>,
    pub position: Span,
}

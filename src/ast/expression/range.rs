use serde::{Deserialize, Serialize};

use crate::ast::Span;

use super::Expression;

/// Range expression. Both endpoints are optional (`a..b`, `a..`, `..b`),
/// though at least one must be present; `inclusive` distinguishes `...`
/// from `..`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeExpression {
    pub start: Option<Box<Expression>>,
    pub end: Option<Box<Expression>>,
    pub inclusive: bool,
    pub position: Span,
}

use serde::{Deserialize, Serialize};

use crate::ast::{Expression, Span};

/// `@invariant cond, "message";` — a runtime-checked loop or function
/// invariant. Only legal inside a loop or function body; the placement
/// rule is enforced by the checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvariantStatement {
    pub condition: Expression,
    #[serde(default)]
    pub message: Option<Expression>,
    pub position: Span,
}

/// `assert cond, "message";`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertStatement {
    pub condition: Expression,
    #[serde(default)]
    pub message: Option<Expression>,
    pub position: Span,
}

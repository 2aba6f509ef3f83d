use serde::{Deserialize, Serialize};

use crate::ast::{Block, Expression, Span};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileLoop {
    pub condition: Expression,
    pub body: Block,
    pub position: Span,
}

/// `until cond { ... }` — loops while the condition is false. Statically
/// identical to a while loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UntilLoop {
    pub condition: Expression,
    pub body: Block,
    pub position: Span,
}

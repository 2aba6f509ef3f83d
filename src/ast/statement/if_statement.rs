use serde::{Deserialize, Serialize};

use crate::ast::{Block, Expression, Span};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    pub condition: Expression,
    #[serde(rename = "thenBranch")]
    pub then_branch: Block,
    #[serde(default, rename = "elseBranch")]
    pub else_branch: Option<Block>,
    pub position: Span,
}

use serde::{Deserialize, Serialize};

use crate::ast::{Expression, Span};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    #[serde(default)]
    pub value: Option<Expression>,
    pub position: Span,
}

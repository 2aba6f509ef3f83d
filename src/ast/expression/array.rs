use serde::{Deserialize, Serialize};

use crate::ast::Span;

use super::Expression;

/// Array literal `[a, b, c]`. The element type is established by the
/// type checker; an empty literal starts out with a weak element slot
/// that later use sites sharpen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
    pub position: Span,
}

use serde::{Deserialize, Serialize};

use crate::ast::Span;

use super::Expression;

/// `e |- @p(args...)` — asks whether a refinement predicate holds for a
/// value. Statically this is just a boolean; the predicate itself is
/// evaluated by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateCheck {
    pub subject: Box<Expression>,
    pub predicate: String,
    #[serde(default)]
    pub predicate_args: Vec<Expression>,
    pub position: Span,
}

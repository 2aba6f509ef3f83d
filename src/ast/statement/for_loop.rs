use serde::{Deserialize, Serialize};

use crate::ast::{Block, Expression, Id, Span};

/// `for x in iterable { ... }`. The loop variable is bound per element
/// kind of the iterable (array/set element, map key, heap element, `int`
/// for ranges); an underscore variable is not bound at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForLoop {
    pub variable: Id,
    pub iterable: Expression,
    pub body: Block,
    pub position: Span,
}

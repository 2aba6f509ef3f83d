use serde::{Deserialize, Serialize};

use crate::ast::Span;

/// Numeric literal. Integers and floats are distinct types in Mira, so
/// the distinction is made at the literal level already.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Num {
    Integer(i64, Span),
    FloatingPoint(f64, Span),
}

impl Num {
    pub fn position(&self) -> Span {
        match self {
            Num::Integer(_, position) => position.clone(),
            Num::FloatingPoint(_, position) => position.clone(),
        }
    }
}

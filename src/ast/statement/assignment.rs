use serde::{Deserialize, Serialize};

use crate::ast::{Expression, Span};

/// `target = value;` where target is a plain identifier or an index
/// expression (`arr[i] = v`, `m[k] = v`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub target: Expression,
    pub value: Expression,
    pub position: Span,
}

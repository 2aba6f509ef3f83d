use serde::{Deserialize, Serialize};

use crate::ast::{Expression, Id, Span, TypeAnnotation};
use crate::typechecker::TypeInformation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclarator {
    pub name: Id,
    #[serde(default, rename = "typeAnnotation")]
    pub type_annotation: Option<TypeAnnotation>,
    pub initializer: Expression,
    /// Resolved type slot, attached by the inference pass. The same slot
    /// is stored in the type environment, so sharpening it during
    /// refinement updates every view of the variable at once.
    #[serde(skip)]
    pub info: Option<TypeInformation>,
    pub position: Span,
}

/// `let a = 1, b: int = 2;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub declarations: Vec<VariableDeclarator>,
    pub position: Span,
}

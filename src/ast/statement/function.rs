use serde::{Deserialize, Serialize};

use crate::ast::{Block, Id, Span, TypeAnnotation};
use crate::typechecker::TypeInformation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Id,
    #[serde(default, rename = "typeAnnotation")]
    pub type_annotation: Option<TypeAnnotation>,
    /// Resolved type slot, attached by the inference pass.
    #[serde(skip)]
    pub info: Option<TypeInformation>,
    pub position: Span,
}

/// `do name(params) -> type { body }`. The return annotation is optional;
/// a missing one is inferred from the `return` statements in the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: Id,
    pub parameters: Vec<Parameter>,
    #[serde(default, rename = "returnType")]
    pub return_type: Option<TypeAnnotation>,
    pub body: Block,
    /// Resolved return type slot, attached by the inference pass.
    #[serde(skip)]
    pub info: Option<TypeInformation>,
    pub position: Span,
}

use std::{error::Error, fmt::Display};

use crate::ast::Span;

use super::types::Type;

/// All errors the pipeline can surface. Rendered messages begin with their
/// category (`Type mismatch`, `Return type mismatch`, `Type inference
/// error`, `Type checking: ...`, `array elements must be of the same
/// type`); the prefix is part of the external contract and matched on by
/// consumers.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeCheckError {
    TypeMismatch(TypeMismatch, Span),
    ReturnTypeMismatch(ReturnTypeMismatch, Span),
    ConflictingReturnTypes(ConflictingReturnTypes, Span),
    HeterogeneousArray(HeterogeneousArray, Span),
    UndefinedVariable(UndefinedVariable, Span),
    UndefinedFunction(UndefinedFunction, Span),
    UndefinedType(UndefinedType, Span),
    UnknownMethod(UnknownMethod, Span),
    ArityMismatch(ArityMismatch, Span),
    UnsupportedOperation(UnsupportedOperation, Span),
    NotIterable(NotIterable, Span),
    InvalidIndex(InvalidIndex, Span),
    InvariantPlacement(InvariantPlacement, Span),
    /// Arity errors from annotation resolution carry no coordinates; the
    /// full message is fixed.
    Annotation(AnnotationError),
    Check(CheckDetail, Span),
}

impl TypeCheckError {
    pub fn span(&self) -> Span {
        match self {
            TypeCheckError::TypeMismatch(_, span) => span.clone(),
            TypeCheckError::ReturnTypeMismatch(_, span) => span.clone(),
            TypeCheckError::ConflictingReturnTypes(_, span) => span.clone(),
            TypeCheckError::HeterogeneousArray(_, span) => span.clone(),
            TypeCheckError::UndefinedVariable(_, span) => span.clone(),
            TypeCheckError::UndefinedFunction(_, span) => span.clone(),
            TypeCheckError::UndefinedType(_, span) => span.clone(),
            TypeCheckError::UnknownMethod(_, span) => span.clone(),
            TypeCheckError::ArityMismatch(_, span) => span.clone(),
            TypeCheckError::UnsupportedOperation(_, span) => span.clone(),
            TypeCheckError::NotIterable(_, span) => span.clone(),
            TypeCheckError::InvalidIndex(_, span) => span.clone(),
            TypeCheckError::InvariantPlacement(_, span) => span.clone(),
            TypeCheckError::Annotation(_) => Span::default(),
            TypeCheckError::Check(_, span) => span.clone(),
        }
    }

    fn err(&self) -> Box<dyn Error> {
        match self {
            TypeCheckError::TypeMismatch(e, _) => Box::new(e.clone()),
            TypeCheckError::ReturnTypeMismatch(e, _) => Box::new(e.clone()),
            TypeCheckError::ConflictingReturnTypes(e, _) => Box::new(e.clone()),
            TypeCheckError::HeterogeneousArray(e, _) => Box::new(e.clone()),
            TypeCheckError::UndefinedVariable(e, _) => Box::new(e.clone()),
            TypeCheckError::UndefinedFunction(e, _) => Box::new(e.clone()),
            TypeCheckError::UndefinedType(e, _) => Box::new(e.clone()),
            TypeCheckError::UnknownMethod(e, _) => Box::new(e.clone()),
            TypeCheckError::ArityMismatch(e, _) => Box::new(e.clone()),
            TypeCheckError::UnsupportedOperation(e, _) => Box::new(e.clone()),
            TypeCheckError::NotIterable(e, _) => Box::new(e.clone()),
            TypeCheckError::InvalidIndex(e, _) => Box::new(e.clone()),
            TypeCheckError::InvariantPlacement(e, _) => Box::new(e.clone()),
            TypeCheckError::Annotation(e) => Box::new(e.clone()),
            TypeCheckError::Check(e, _) => Box::new(e.clone()),
        }
    }
}

impl Display for TypeCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // the exact annotation messages are the whole contract; no
            // coordinates are appended
            TypeCheckError::Annotation(e) => f.write_str(&e.to_string()),
            _ => f.write_str(self.span().to_string(self.err()).as_str()),
        }
    }
}

impl Error for TypeCheckError {}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeMismatch {
    pub expected: Type,
    pub actual: Type,
}

impl Display for TypeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Type mismatch: expected '{}' but got '{}'",
            self.expected, self.actual
        ))
    }
}

impl Error for TypeMismatch {}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnTypeMismatch {
    pub expected: Type,
    pub actual: Type,
}

impl Display for ReturnTypeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Return type mismatch: expected '{}' but got '{}'",
            self.expected, self.actual
        ))
    }
}

impl Error for ReturnTypeMismatch {}

#[derive(Clone, Debug, PartialEq)]
pub struct ConflictingReturnTypes {
    pub first: Type,
    pub second: Type,
}

impl Display for ConflictingReturnTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Type inference error: conflicting return types '{}' and '{}'",
            self.first, self.second
        ))
    }
}

impl Error for ConflictingReturnTypes {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeterogeneousArray;

impl Display for HeterogeneousArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("array elements must be of the same type")
    }
}

impl Error for HeterogeneousArray {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndefinedVariable {
    pub variable_name: String,
}

impl Display for UndefinedVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Type checking: undefined variable '{}'",
            self.variable_name
        ))
    }
}

impl Error for UndefinedVariable {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndefinedFunction {
    pub function_name: String,
}

impl Display for UndefinedFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Type checking: undefined function '{}'",
            self.function_name
        ))
    }
}

impl Error for UndefinedFunction {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndefinedType {
    pub type_name: String,
}

impl Display for UndefinedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Type checking: undefined type '{}'",
            self.type_name
        ))
    }
}

impl Error for UndefinedType {}

#[derive(Clone, Debug, PartialEq)]
pub struct UnknownMethod {
    pub receiver: Type,
    pub method_name: String,
}

impl Display for UnknownMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Type checking: no method '{}' on '{}'",
            self.method_name, self.receiver
        ))
    }
}

impl Error for UnknownMethod {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArityMismatch {
    pub name: String,
    pub expected: usize,
    pub actual: usize,
}

impl Display for ArityMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Type checking: '{}' expects {} arguments but got {}",
            self.name, self.expected, self.actual
        ))
    }
}

impl Error for ArityMismatch {}

#[derive(Clone, Debug, PartialEq)]
pub struct UnsupportedOperation {
    pub operator: String,
    pub operands: Vec<Type>,
}

impl Display for UnsupportedOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Type checking: operator '{}' is not defined for {}",
            self.operator,
            self.operands
                .iter()
                .map(|operand| format!("'{operand}'"))
                .collect::<Vec<_>>()
                .join(" and ")
        ))
    }
}

impl Error for UnsupportedOperation {}

#[derive(Clone, Debug, PartialEq)]
pub struct NotIterable {
    pub actual: Type,
}

impl Display for NotIterable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Type checking: '{}' is not iterable",
            self.actual
        ))
    }
}

impl Error for NotIterable {}

#[derive(Clone, Debug, PartialEq)]
pub struct InvalidIndex {
    pub container: Type,
    pub index: Type,
}

impl Display for InvalidIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Type checking: cannot index '{}' with '{}'",
            self.container, self.index
        ))
    }
}

impl Error for InvalidIndex {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvariantPlacement;

impl Display for InvariantPlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Type checking: @invariant is only allowed inside a loop or function")
    }
}

impl Error for InvariantPlacement {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationError {
    pub message: String,
}

impl Display for AnnotationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for AnnotationError {}

/// Catch-all for structural violations that have no dedicated category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckDetail {
    pub detail: String,
}

impl Display for CheckDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("Type checking: {}", self.detail))
    }
}

impl Error for CheckDetail {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_prefixes() {
        let mismatch = TypeCheckError::TypeMismatch(
            TypeMismatch {
                expected: Type::Integer,
                actual: Type::Float,
            },
            Span::default(),
        );
        assert!(mismatch.to_string().starts_with("Type mismatch"));

        let conflict = TypeCheckError::ConflictingReturnTypes(
            ConflictingReturnTypes {
                first: Type::Integer,
                second: Type::String,
            },
            Span::default(),
        );
        assert!(conflict.to_string().starts_with("Type inference error"));

        let array = TypeCheckError::HeterogeneousArray(HeterogeneousArray, Span::default());
        assert!(array
            .to_string()
            .starts_with("array elements must be of the same type"));
    }

    #[test]
    fn test_annotation_message_is_exact() {
        let error = TypeCheckError::Annotation(AnnotationError {
            message: "HeapMap type requires exactly two type parameters".into(),
        });
        assert_eq!(
            error.to_string(),
            "HeapMap type requires exactly two type parameters"
        );
    }

    #[test]
    fn test_coordinates_are_appended() {
        let span = Span {
            start: (2, 4),
            end: (2, 9),
        };
        let mismatch = TypeCheckError::TypeMismatch(
            TypeMismatch {
                expected: Type::Integer,
                actual: Type::Float,
            },
            span,
        );
        assert_eq!(
            mismatch.to_string(),
            "Type mismatch: expected 'int' but got 'float' at 3:5"
        );
    }
}

//! Syntactic type annotations as they arrive from the parser. An
//! annotation is a small tree of simple names, generic applications and
//! union/intersection combinations; resolving it into a semantic [`Type`]
//! happens in the type checker.
//!
//! [`Type`]: crate::typechecker::Type

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAnnotation {
    #[serde(flatten)]
    pub kind: AnnotationKind,
    /// Whether this annotation was written by the inference pass rather
    /// than the programmer. Inferred annotations may widen later;
    /// explicit ones are enforced strictly.
    #[serde(default, rename = "isInferred")]
    pub is_inferred: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnnotationKind {
    /// A bare type name, e.g. `int` or `range`.
    Simple { name: String },
    /// A parameterised container name, e.g. `Map<string, int>`.
    Generic {
        name: String,
        parameters: Vec<TypeAnnotation>,
    },
    /// An inclusive disjunction, e.g. `int | boolean`.
    Union { types: Vec<TypeAnnotation> },
    /// A conjunction, e.g. `int & float`.
    Intersection { types: Vec<TypeAnnotation> },
    /// A named-field product, e.g. `record { to: int, weight: int }`.
    /// Not part of the surface annotation syntax, but the refiner writes
    /// record annotations back when a record type was inferred.
    Record { fields: Vec<(String, TypeAnnotation)> },
}

impl TypeAnnotation {
    pub fn simple(name: impl ToString) -> TypeAnnotation {
        TypeAnnotation {
            kind: AnnotationKind::Simple {
                name: name.to_string(),
            },
            is_inferred: false,
        }
    }

    pub fn generic(name: impl ToString, parameters: Vec<TypeAnnotation>) -> TypeAnnotation {
        TypeAnnotation {
            kind: AnnotationKind::Generic {
                name: name.to_string(),
                parameters,
            },
            is_inferred: false,
        }
    }

    pub fn union(types: Vec<TypeAnnotation>) -> TypeAnnotation {
        TypeAnnotation {
            kind: AnnotationKind::Union { types },
            is_inferred: false,
        }
    }

    pub fn inferred(mut self) -> TypeAnnotation {
        self.is_inferred = true;
        self
    }
}

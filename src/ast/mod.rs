//! # Syntax Tree
//!
//! The fully parsed representation of a Mira program, as handed over by
//! the parser. The type checker consumes this tree, fills in the optional
//! `typeAnnotation` slots, and verifies every operation; nothing here
//! performs any analysis on its own.
//!
//! The whole tree is serde-(de)serializable: the parser lives in a
//! separate process and transfers programs as JSON.

mod expression;
mod span;
mod statement;
mod type_annotation;

use serde::{Deserialize, Serialize};

pub use self::expression::{
    ArrayLiteral, BinaryExpression, BinaryOperator, Bool, Expression, Id, MetaId, Num, Postfix,
    PredicateCheck, PrefixExpression, PrefixOperator, RangeExpression, Str, TypeOf,
};
pub use self::span::Span;
pub use self::statement::{
    AssertStatement, Assignment, Block, ForLoop, FunctionDeclaration, IfStatement,
    InvariantStatement, Parameter, ReturnStatement, Statement, UntilLoop, VariableDeclaration,
    VariableDeclarator, WhileLoop,
};
pub use self::type_annotation::{AnnotationKind, TypeAnnotation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

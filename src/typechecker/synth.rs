//! The expression synthesizer: a single pure function computing the type
//! of an expression against the current environments. All three passes
//! share it; `SynthMode` selects the per-pass behaviours the passes do
//! not have in common (error strictness, union widening of literals).

use crate::ast::{BinaryOperator, Expression, Num, Postfix, PrefixOperator, RangeExpression};

use super::builtins;
use super::context::Context;
use super::error::{
    ArityMismatch, CheckDetail, HeterogeneousArray, InvalidIndex, TypeCheckError, TypeMismatch,
    UndefinedFunction, UndefinedVariable, UnknownMethod, UnsupportedOperation,
};
use super::types::{compatible, Type, TypeSlot};
use super::TypeResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthMode {
    /// Inference: structural errors (heterogeneous literals, unions in
    /// arithmetic) are raised eagerly.
    Infer,
    /// Refinement: never errors; anything unknown synthesizes `weak` so
    /// reporting stays with the checker.
    Refine,
    /// Checking: strict on arguments and indices, widens heterogeneous
    /// literals to unions.
    Check,
}

impl SynthMode {
    fn lenient(&self) -> bool {
        matches!(self, SynthMode::Refine)
    }
}

/// Compute the type of an expression. Identifier lookups return the
/// environment's shared slot itself, so callers observe later sharpening
/// of the same variable; fresh types get fresh slots.
pub fn synth(expr: &Expression, ctx: &mut Context, mode: SynthMode) -> TypeResult<TypeSlot> {
    match expr {
        Expression::Num(Num::Integer(..)) => Ok(Type::Integer.into_slot()),
        Expression::Num(Num::FloatingPoint(..)) => Ok(Type::Float.into_slot()),
        Expression::Str(_) => Ok(Type::String.into_slot()),
        Expression::Bool(_) => Ok(Type::Boolean.into_slot()),
        Expression::Array(literal) => synth_array(literal, ctx, mode),
        Expression::Id(id) => {
            if id.is_underscore() {
                return fail(
                    mode,
                    TypeCheckError::Check(
                        CheckDetail {
                            detail: "'_' cannot be used as a value".into(),
                        },
                        id.position.clone(),
                    ),
                );
            }
            match ctx.scope.resolve_name(&id.name) {
                Some(slot) => Ok(slot),
                None => fail(
                    mode,
                    TypeCheckError::UndefinedVariable(
                        UndefinedVariable {
                            variable_name: id.name.clone(),
                        },
                        id.position.clone(),
                    ),
                ),
            }
        }
        Expression::MetaId(meta) => fail(
            mode,
            TypeCheckError::Check(
                CheckDetail {
                    detail: format!("'@{}' can only be used as a predicate", meta.name),
                },
                meta.position.clone(),
            ),
        ),
        Expression::Range(range) => synth_range(range, ctx, mode),
        Expression::Binary(binary) => {
            let left = synth(&binary.left, ctx, mode)?;
            let right = synth(&binary.right, ctx, mode)?;
            let left = left.borrow().clone();
            let right = right.borrow().clone();
            synth_binary(binary.operator, &left, &right, expr, ctx, mode)
        }
        Expression::Prefix(prefix) => {
            let operand = synth(&prefix.operand, ctx, mode)?;
            let operand = operand.borrow().clone();
            match prefix.operator {
                PrefixOperator::Minus => match numeric_kind(&operand) {
                    Some(kind) => Ok(kind.into_slot()),
                    None => match operand {
                        Type::Weak | Type::Poly => Ok(Type::weak_slot()),
                        Type::Dynamic => Ok(Type::Dynamic.into_slot()),
                        other => fail(
                            mode,
                            TypeCheckError::UnsupportedOperation(
                                UnsupportedOperation {
                                    operator: "-".into(),
                                    operands: vec![other],
                                },
                                prefix.position.clone(),
                            ),
                        ),
                    },
                },
                PrefixOperator::Not => match operand {
                    Type::Boolean | Type::Weak | Type::Poly | Type::Dynamic => {
                        Ok(Type::Boolean.into_slot())
                    }
                    other => fail(
                        mode,
                        TypeCheckError::UnsupportedOperation(
                            UnsupportedOperation {
                                operator: "!".into(),
                                operands: vec![other],
                            },
                            prefix.position.clone(),
                        ),
                    ),
                },
            }
        }
        Expression::Postfix(postfix) => synth_postfix(postfix, ctx, mode),
        Expression::TypeOf(type_of) => {
            synth(&type_of.operand, ctx, mode)?;
            Ok(Type::String.into_slot())
        }
        Expression::PredicateCheck(check) => {
            synth(&check.subject, ctx, mode)?;
            for arg in &check.predicate_args {
                synth(arg, ctx, mode)?;
            }
            Ok(Type::Boolean.into_slot())
        }
    }
}

/// In refinement mode nothing is reported; unknowns synthesize `weak` and
/// the checker surfaces the error later.
fn fail(mode: SynthMode, error: TypeCheckError) -> TypeResult<TypeSlot> {
    if mode.lenient() {
        Ok(Type::weak_slot())
    } else {
        Err(error)
    }
}

/// The numeric-kind helper: unwraps intersections (preferring `int`) and
/// recognises all-numeric unions (`float` wins if any member is float).
pub fn numeric_kind(ty: &Type) -> Option<Type> {
    match ty {
        Type::Integer => Some(Type::Integer),
        Type::Float => Some(Type::Float),
        Type::Intersection(members) => {
            let kinds: Vec<Type> = members
                .iter()
                .filter_map(|member| numeric_kind(&member.borrow()))
                .collect();
            if kinds.iter().any(|kind| matches!(kind, Type::Integer)) {
                Some(Type::Integer)
            } else {
                kinds.first().cloned()
            }
        }
        Type::Union(members) => {
            let members = Type::union_members(members);
            let kinds: Vec<Type> = members.iter().filter_map(numeric_kind).collect();
            if kinds.len() != members.len() || kinds.is_empty() {
                return None;
            }
            if kinds.iter().any(|kind| matches!(kind, Type::Float)) {
                Some(Type::Float)
            } else {
                Some(Type::Integer)
            }
        }
        _ => None,
    }
}

/// A weak operand defers binary typing: comparisons and logicals still
/// produce `boolean`, arithmetic produces `weak`.
fn is_weak_operand(ty: &Type) -> bool {
    match ty {
        Type::Weak | Type::Poly => true,
        Type::Union(members) => Type::union_members(members)
            .iter()
            .any(is_weak_operand),
        _ => false,
    }
}

fn synth_binary(
    operator: BinaryOperator,
    left: &Type,
    right: &Type,
    expr: &Expression,
    ctx: &mut Context,
    mode: SynthMode,
) -> TypeResult<TypeSlot> {
    use BinaryOperator::*;

    let comparison = matches!(
        operator,
        LessThan | LessOrEqual | GreaterThan | GreaterOrEqual | Equals | NotEquals | And | Or
    );

    if is_weak_operand(left) || is_weak_operand(right) {
        return if comparison {
            Ok(Type::Boolean.into_slot())
        } else {
            Ok(Type::weak_slot())
        };
    }
    if matches!(left, Type::Dynamic) || matches!(right, Type::Dynamic) {
        return if comparison {
            Ok(Type::Boolean.into_slot())
        } else {
            Ok(Type::Dynamic.into_slot())
        };
    }

    let kinds = (numeric_kind(left), numeric_kind(right));

    let result = match operator {
        Add if matches!(left, Type::String) && matches!(right, Type::String) => Some(Type::String),
        Add | Subtract | Multiply | Modulo => match kinds {
            (Some(Type::Integer), Some(Type::Integer)) => Some(Type::Integer),
            (Some(_), Some(_)) => Some(Type::Float),
            _ => None,
        },
        IntDivide => match kinds {
            (Some(Type::Integer), Some(Type::Integer)) => Some(Type::Integer),
            _ => None,
        },
        FloatDivide => match kinds {
            (Some(_), Some(_)) => Some(Type::Float),
            _ => None,
        },
        ShiftLeft | ShiftRight => match kinds {
            (Some(Type::Integer), Some(Type::Integer)) => Some(Type::Integer),
            _ => None,
        },
        LessThan | LessOrEqual | GreaterThan | GreaterOrEqual => match kinds {
            (Some(_), Some(_)) => Some(Type::Boolean),
            _ => None,
        },
        Equals | NotEquals => {
            if ctx.cache.equal(left, right) || matches!(kinds, (Some(_), Some(_))) {
                Some(Type::Boolean)
            } else {
                None
            }
        }
        And | Or => match (left, right) {
            (Type::Boolean, Type::Boolean) => Some(Type::Boolean),
            _ => None,
        },
    };

    if let Some(result) = result {
        return Ok(result.into_slot());
    }

    // a union operand that matched no rule is dispatched at runtime; the
    // inferencer alone treats it as an error
    if matches!(left, Type::Union(_)) || matches!(right, Type::Union(_)) {
        if mode == SynthMode::Infer {
            return Err(TypeCheckError::UnsupportedOperation(
                UnsupportedOperation {
                    operator: operator.as_str().into(),
                    operands: vec![left.clone(), right.clone()],
                },
                expr.position(),
            ));
        }
        return Ok(Type::weak_slot());
    }

    fail(
        mode,
        TypeCheckError::UnsupportedOperation(
            UnsupportedOperation {
                operator: operator.as_str().into(),
                operands: vec![left.clone(), right.clone()],
            },
            expr.position(),
        ),
    )
}

fn synth_array(
    literal: &crate::ast::ArrayLiteral,
    ctx: &mut Context,
    mode: SynthMode,
) -> TypeResult<TypeSlot> {
    if literal.elements.is_empty() {
        return Ok(Type::Array(Type::weak_slot()).into_slot());
    }

    let mut slots = vec![];
    for element in &literal.elements {
        slots.push(synth(element, ctx, mode)?);
    }

    let first = slots[0].borrow().clone();
    let homogeneous = slots
        .iter()
        .all(|slot| slot.borrow().does_eq(&first));

    if homogeneous {
        // share the first element's slot as the array's element slot
        return Ok(Type::Array(slots[0].clone()).into_slot());
    }

    match mode {
        SynthMode::Infer => Err(TypeCheckError::HeterogeneousArray(
            HeterogeneousArray,
            literal.position.clone(),
        )),
        SynthMode::Check => Ok(Type::Array(union_of(&slots).into_slot()).into_slot()),
        SynthMode::Refine => {
            if ctx.options.union_widening {
                Ok(Type::Array(union_of(&slots).into_slot()).into_slot())
            } else {
                Ok(Type::Array(Type::weak_slot()).into_slot())
            }
        }
    }
}

/// Build a union over the distinct types among `slots`, flattening nested
/// unions and collapsing duplicates.
pub(crate) fn union_of(slots: &[TypeSlot]) -> Type {
    let mut members: Vec<Type> = vec![];
    for slot in slots {
        let candidates = match &*slot.borrow() {
            Type::Union(inner) => Type::union_members(inner),
            other => vec![other.clone()],
        };
        for candidate in candidates {
            if !members.iter().any(|member| member.does_eq(&candidate)) {
                members.push(candidate);
            }
        }
    }
    if members.len() == 1 {
        members.pop().unwrap()
    } else {
        Type::Union(members.into_iter().map(Type::into_slot).collect())
    }
}

fn synth_range(
    range: &RangeExpression,
    ctx: &mut Context,
    mode: SynthMode,
) -> TypeResult<TypeSlot> {
    let start = match &range.start {
        Some(start) => Some(synth(start, ctx, mode)?.borrow().clone()),
        None => None,
    };
    let end = match &range.end {
        Some(end) => Some(synth(end, ctx, mode)?.borrow().clone()),
        None => None,
    };

    match (start, end) {
        (None, None) => fail(
            mode,
            TypeCheckError::Check(
                CheckDetail {
                    detail: "range requires at least one endpoint".into(),
                },
                range.position.clone(),
            ),
        ),
        (Some(start), Some(end)) => match (&start, &end) {
            _ if start.is_weak() || end.is_weak() => {
                Ok(Type::Array(Type::weak_slot()).into_slot())
            }
            (Type::Integer, Type::Integer) => {
                Ok(Type::Array(Type::Integer.into_slot()).into_slot())
            }
            (Type::String, Type::String) => {
                Ok(Type::Array(Type::String.into_slot()).into_slot())
            }
            _ => fail(
                mode,
                TypeCheckError::TypeMismatch(
                    TypeMismatch {
                        expected: start,
                        actual: end,
                    },
                    range.position.clone(),
                ),
            ),
        },
        (Some(endpoint), None) | (None, Some(endpoint)) => match endpoint {
            Type::Integer => Ok(Type::Range.into_slot()),
            Type::Weak | Type::Poly => Ok(Type::Range.into_slot()),
            other => fail(
                mode,
                TypeCheckError::Check(
                    CheckDetail {
                        detail: format!(
                            "open-ended ranges require integer endpoints, found '{other}'"
                        ),
                    },
                    range.position.clone(),
                ),
            ),
        },
    }
}

fn synth_postfix(postfix: &Postfix, ctx: &mut Context, mode: SynthMode) -> TypeResult<TypeSlot> {
    match postfix {
        Postfix::Call {
            expr,
            args,
            position,
        } => match expr.as_ref() {
            Expression::Id(id) => synth_call(id, args, position, ctx, mode),
            Expression::MetaId(_) => {
                // predicate arguments are only checked for well-formedness
                for arg in args {
                    synth(arg, ctx, mode)?;
                }
                Ok(Type::Predicate.into_slot())
            }
            Expression::Postfix(Postfix::PropertyAccess {
                expr: receiver,
                property,
                ..
            }) => {
                let receiver_slot = synth(receiver, ctx, mode)?;
                let receiver_type = receiver_slot.borrow().clone();

                match &receiver_type {
                    Type::Weak | Type::Poly => return Ok(Type::weak_slot()),
                    Type::Dynamic => {
                        for arg in args {
                            synth(arg, ctx, mode)?;
                        }
                        return Ok(Type::Dynamic.into_slot());
                    }
                    _ => {}
                }

                let Some(signature) = builtins::method_signature(&receiver_type, &property.name)
                else {
                    return fail(
                        mode,
                        TypeCheckError::UnknownMethod(
                            UnknownMethod {
                                receiver: receiver_type,
                                method_name: property.name.clone(),
                            },
                            property.position.clone(),
                        ),
                    );
                };

                if signature.params.len() != args.len() {
                    return fail(
                        mode,
                        TypeCheckError::ArityMismatch(
                            ArityMismatch {
                                name: property.name.clone(),
                                expected: signature.params.len(),
                                actual: args.len(),
                            },
                            position.clone(),
                        ),
                    );
                }

                for (param, arg) in signature.params.iter().zip(args.iter()) {
                    let arg_slot = synth(arg, ctx, mode)?;
                    if mode == SynthMode::Check {
                        let expected = param.borrow().clone();
                        let actual = arg_slot.borrow().clone();
                        if !compatible(&mut ctx.cache, &expected, &actual) {
                            return Err(TypeCheckError::TypeMismatch(
                                TypeMismatch { expected, actual },
                                arg.position(),
                            ));
                        }
                    }
                }

                Ok(signature.return_type)
            }
            other => {
                synth(other, ctx, mode)?;
                fail(
                    mode,
                    TypeCheckError::Check(
                        CheckDetail {
                            detail: "expression is not callable".into(),
                        },
                        position.clone(),
                    ),
                )
            }
        },
        Postfix::Index {
            expr,
            index,
            position,
        } => synth_index(expr, index, position, ctx, mode),
        Postfix::PropertyAccess {
            expr,
            property,
            ..
        } => {
            let receiver_slot = synth(expr, ctx, mode)?;
            let receiver_type = receiver_slot.borrow().clone();

            match &receiver_type {
                Type::Weak | Type::Poly => return Ok(Type::weak_slot()),
                Type::Dynamic => return Ok(Type::Dynamic.into_slot()),
                _ => {}
            }

            match builtins::method_signature(&receiver_type, &property.name) {
                Some(signature) => Ok(Type::Function {
                    params: signature.params,
                    return_type: signature.return_type,
                    variadic: false,
                }
                .into_slot()),
                None => fail(
                    mode,
                    TypeCheckError::UnknownMethod(
                        UnknownMethod {
                            receiver: receiver_type,
                            method_name: property.name.clone(),
                        },
                        property.position.clone(),
                    ),
                ),
            }
        }
    }
}

fn synth_call(
    id: &crate::ast::Id,
    args: &[Expression],
    position: &crate::ast::Span,
    ctx: &mut Context,
    mode: SynthMode,
) -> TypeResult<TypeSlot> {
    // constructors produce containers with fresh weak slots
    if let Some(kind) = builtins::constructor(&id.name) {
        if kind == builtins::ConstructorKind::Graph {
            if args.len() != 1 && !mode.lenient() {
                return Err(TypeCheckError::ArityMismatch(
                    ArityMismatch {
                        name: id.name.clone(),
                        expected: 1,
                        actual: args.len(),
                    },
                    position.clone(),
                ));
            }
            if let Some(arg) = args.first() {
                let directed = synth(arg, ctx, mode)?;
                let directed = directed.borrow().clone();
                if !matches!(directed, Type::Boolean | Type::Weak | Type::Poly | Type::Dynamic)
                    && !mode.lenient()
                {
                    return Err(TypeCheckError::TypeMismatch(
                        TypeMismatch {
                            expected: Type::Boolean,
                            actual: directed,
                        },
                        arg.position(),
                    ));
                }
            }
        } else if !args.is_empty() && !mode.lenient() {
            return Err(TypeCheckError::ArityMismatch(
                ArityMismatch {
                    name: id.name.clone(),
                    expected: 0,
                    actual: args.len(),
                },
                position.clone(),
            ));
        }
        return Ok(builtins::instantiate(kind).into_slot());
    }

    let Some(signature) = ctx.functions.resolve(&id.name) else {
        for arg in args {
            synth(arg, ctx, mode)?;
        }
        return fail(
            mode,
            TypeCheckError::UndefinedFunction(
                UndefinedFunction {
                    function_name: id.name.clone(),
                },
                id.position.clone(),
            ),
        );
    };

    let arity_ok = if signature.variadic {
        args.len() + 1 >= signature.params.len()
    } else {
        args.len() == signature.params.len()
    };
    if !arity_ok && !mode.lenient() {
        return Err(TypeCheckError::ArityMismatch(
            ArityMismatch {
                name: id.name.clone(),
                expected: signature.params.len(),
                actual: args.len(),
            },
            position.clone(),
        ));
    }

    for (i, arg) in args.iter().enumerate() {
        let arg_slot = synth(arg, ctx, mode)?;
        if mode == SynthMode::Check {
            // variadic functions repeat the last parameter for extras
            let param = if i < signature.params.len() {
                &signature.params[i]
            } else {
                match signature.params.last() {
                    Some(last) => last,
                    None => continue,
                }
            };
            let expected = param.borrow().clone();
            let actual = arg_slot.borrow().clone();
            if !compatible(&mut ctx.cache, &expected, &actual) {
                return Err(TypeCheckError::TypeMismatch(
                    TypeMismatch { expected, actual },
                    arg.position(),
                ));
            }
        }
    }

    Ok(signature.return_type)
}

fn synth_index(
    object: &Expression,
    index: &Expression,
    position: &crate::ast::Span,
    ctx: &mut Context,
    mode: SynthMode,
) -> TypeResult<TypeSlot> {
    let object_slot = synth(object, ctx, mode)?;
    let index_slot = synth(index, ctx, mode)?;
    let object_type = object_slot.borrow().clone();
    let index_type = index_slot.borrow().clone();

    match &object_type {
        Type::Array(element) => match &index_type {
            Type::Integer | Type::Weak | Type::Poly => Ok(element.clone()),
            // slices return a fresh array sharing the element slot
            Type::Array(inner) if matches!(&*inner.borrow(), Type::Integer | Type::Weak) => {
                Ok(Type::Array(element.clone()).into_slot())
            }
            Type::Range => Ok(Type::Array(element.clone()).into_slot()),
            _ => fail(
                mode,
                TypeCheckError::InvalidIndex(
                    InvalidIndex {
                        container: object_type.clone(),
                        index: index_type,
                    },
                    position.clone(),
                ),
            ),
        },
        Type::Map { key, value } => {
            if mode == SynthMode::Check {
                let expected = key.borrow().clone();
                if !compatible(&mut ctx.cache, &expected, &index_type) {
                    return Err(TypeCheckError::TypeMismatch(
                        TypeMismatch {
                            expected,
                            actual: index_type,
                        },
                        index.position(),
                    ));
                }
            }
            Ok(value.clone())
        }
        Type::Tuple(members) => match &index_type {
            Type::Integer => match index {
                Expression::Num(Num::Integer(i, _)) => {
                    let i = *i;
                    if i < 0 || i as usize >= members.len() {
                        fail(
                            mode,
                            TypeCheckError::Check(
                                CheckDetail {
                                    detail: format!("tuple index {i} is out of range"),
                                },
                                position.clone(),
                            ),
                        )
                    } else {
                        Ok(members[i as usize].clone())
                    }
                }
                _ => Ok(Type::Dynamic.into_slot()),
            },
            Type::Weak | Type::Poly => Ok(Type::Dynamic.into_slot()),
            _ => fail(
                mode,
                TypeCheckError::InvalidIndex(
                    InvalidIndex {
                        container: object_type.clone(),
                        index: index_type,
                    },
                    position.clone(),
                ),
            ),
        },
        Type::Record(fields) => match &index_type {
            Type::String => match index {
                Expression::Str(key) => match fields
                    .iter()
                    .find(|(name, _)| *name == key.value)
                {
                    Some((_, slot)) => Ok(slot.clone()),
                    None => fail(
                        mode,
                        TypeCheckError::Check(
                            CheckDetail {
                                detail: format!("record has no field '{}'", key.value),
                            },
                            position.clone(),
                        ),
                    ),
                },
                _ => Ok(Type::Dynamic.into_slot()),
            },
            Type::Weak | Type::Poly => Ok(Type::Dynamic.into_slot()),
            _ => fail(
                mode,
                TypeCheckError::InvalidIndex(
                    InvalidIndex {
                        container: object_type.clone(),
                        index: index_type,
                    },
                    position.clone(),
                ),
            ),
        },
        Type::Weak | Type::Poly => Ok(Type::weak_slot()),
        Type::Dynamic => Ok(Type::Dynamic.into_slot()),
        _ => fail(
            mode,
            TypeCheckError::InvalidIndex(
                InvalidIndex {
                    container: object_type.clone(),
                    index: index_type,
                },
                position.clone(),
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use crate::typechecker::error::TypeCheckError;
    type Result<T> = std::result::Result<T, TypeCheckError>;

    use crate::ast::{
        ArrayLiteral, BinaryExpression, BinaryOperator, Bool, Expression, Id, Num, Postfix,
        RangeExpression, Span, Str,
    };
    use crate::typechecker::builtins::setup_context;
    use crate::typechecker::types::Type;
    use crate::typechecker::TypecheckerOptions;

    use super::{synth, SynthMode};

    fn int(value: i64) -> Expression {
        Expression::Num(Num::Integer(value, Span::default()))
    }

    fn float(value: f64) -> Expression {
        Expression::Num(Num::FloatingPoint(value, Span::default()))
    }

    fn string(value: &str) -> Expression {
        Expression::Str(Str {
            value: value.into(),
            position: Span::default(),
        })
    }

    fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
        Expression::Binary(BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            position: Span::default(),
        })
    }

    #[test]
    fn test_literals() -> Result<()> {
        let mut ctx = setup_context(TypecheckerOptions::default());

        let ty = synth(&int(42), &mut ctx, SynthMode::Infer)?;
        assert_eq!(*ty.borrow(), Type::Integer);

        let ty = synth(&float(13.37), &mut ctx, SynthMode::Infer)?;
        assert_eq!(*ty.borrow(), Type::Float);

        Ok(())
    }

    #[test]
    fn test_arithmetic_kinds() -> Result<()> {
        let mut ctx = setup_context(TypecheckerOptions::default());

        let ty = synth(
            &binary(BinaryOperator::Add, int(1), int(2)),
            &mut ctx,
            SynthMode::Infer,
        )?;
        assert_eq!(*ty.borrow(), Type::Integer);

        let ty = synth(
            &binary(BinaryOperator::Add, int(1), float(2.0)),
            &mut ctx,
            SynthMode::Infer,
        )?;
        assert_eq!(*ty.borrow(), Type::Float);

        let ty = synth(
            &binary(BinaryOperator::Add, string("a"), string("b")),
            &mut ctx,
            SynthMode::Infer,
        )?;
        assert_eq!(*ty.borrow(), Type::String);

        Ok(())
    }

    #[test]
    fn test_integer_division_requires_ints() {
        let mut ctx = setup_context(TypecheckerOptions::default());

        assert!(synth(
            &binary(BinaryOperator::IntDivide, int(4), float(2.0)),
            &mut ctx,
            SynthMode::Check,
        )
        .is_err());

        let ty = synth(
            &binary(BinaryOperator::FloatDivide, int(4), int(2)),
            &mut ctx,
            SynthMode::Check,
        )
        .unwrap();
        assert_eq!(*ty.borrow(), Type::Float);
    }

    #[test]
    fn test_inf_participates_as_numeric() -> Result<()> {
        let mut ctx = setup_context(TypecheckerOptions::default());

        let inf = Expression::Id(Id {
            name: "inf".into(),
            position: Span::default(),
        });
        let ty = synth(
            &binary(BinaryOperator::Add, int(1), inf),
            &mut ctx,
            SynthMode::Check,
        )?;
        assert_eq!(*ty.borrow(), Type::Integer);

        Ok(())
    }

    #[test]
    fn test_comparison_with_weak_operand() -> Result<()> {
        let mut ctx = setup_context(TypecheckerOptions::default());
        ctx.scope.add_variable("x", Type::weak_slot(), true);

        let x = Expression::Id(Id {
            name: "x".into(),
            position: Span::default(),
        });
        let ty = synth(
            &binary(BinaryOperator::LessThan, x.clone(), int(5)),
            &mut ctx,
            SynthMode::Check,
        )?;
        assert_eq!(*ty.borrow(), Type::Boolean);

        let ty = synth(
            &binary(BinaryOperator::Add, x, int(5)),
            &mut ctx,
            SynthMode::Check,
        )?;
        assert_eq!(*ty.borrow(), Type::Weak);

        Ok(())
    }

    #[test]
    fn test_empty_array_literal_is_weak() -> Result<()> {
        let mut ctx = setup_context(TypecheckerOptions::default());

        let ty = synth(
            &Expression::Array(ArrayLiteral {
                elements: vec![],
                position: Span::default(),
            }),
            &mut ctx,
            SynthMode::Infer,
        )?;
        assert_eq!(ty.borrow().to_string(), "Array<weak>");

        Ok(())
    }

    #[test]
    fn test_heterogeneous_array_is_an_inference_error() {
        let mut ctx = setup_context(TypecheckerOptions::default());

        let literal = Expression::Array(ArrayLiteral {
            elements: vec![int(1), string("two")],
            position: Span::default(),
        });

        let result = synth(&literal, &mut ctx, SynthMode::Infer);
        assert!(result
            .unwrap_err()
            .to_string()
            .starts_with("array elements must be of the same type"));

        // the checker widens instead
        let ty = synth(&literal, &mut ctx, SynthMode::Check).unwrap();
        assert_eq!(ty.borrow().to_string(), "Array<int | string>");
    }

    #[test]
    fn test_ranges() -> Result<()> {
        let mut ctx = setup_context(TypecheckerOptions::default());

        let finite = Expression::Range(RangeExpression {
            start: Some(Box::new(int(0))),
            end: Some(Box::new(int(3))),
            inclusive: false,
            position: Span::default(),
        });
        assert_eq!(
            synth(&finite, &mut ctx, SynthMode::Infer)?.borrow().to_string(),
            "Array<int>"
        );

        let open = Expression::Range(RangeExpression {
            start: Some(Box::new(int(0))),
            end: None,
            inclusive: false,
            position: Span::default(),
        });
        assert_eq!(*synth(&open, &mut ctx, SynthMode::Infer)?.borrow(), Type::Range);

        let empty = Expression::Range(RangeExpression {
            start: None,
            end: None,
            inclusive: false,
            position: Span::default(),
        });
        assert!(synth(&empty, &mut ctx, SynthMode::Infer).is_err());

        let mismatched = Expression::Range(RangeExpression {
            start: Some(Box::new(int(0))),
            end: Some(Box::new(string("z"))),
            inclusive: false,
            position: Span::default(),
        });
        assert!(synth(&mismatched, &mut ctx, SynthMode::Infer).is_err());

        Ok(())
    }

    #[test]
    fn test_constructors() -> Result<()> {
        let mut ctx = setup_context(TypecheckerOptions::default());

        let map = Expression::Postfix(Postfix::Call {
            expr: Box::new(Expression::Id(Id {
                name: "Map".into(),
                position: Span::default(),
            })),
            args: vec![],
            position: Span::default(),
        });
        assert_eq!(
            synth(&map, &mut ctx, SynthMode::Infer)?.borrow().to_string(),
            "Map<weak, weak>"
        );

        let graph_without_flag = Expression::Postfix(Postfix::Call {
            expr: Box::new(Expression::Id(Id {
                name: "Graph".into(),
                position: Span::default(),
            })),
            args: vec![],
            position: Span::default(),
        });
        assert!(synth(&graph_without_flag, &mut ctx, SynthMode::Infer).is_err());

        let graph = Expression::Postfix(Postfix::Call {
            expr: Box::new(Expression::Id(Id {
                name: "Graph".into(),
                position: Span::default(),
            })),
            args: vec![Expression::Bool(Bool {
                value: true,
                position: Span::default(),
            })],
            position: Span::default(),
        });
        assert_eq!(
            synth(&graph, &mut ctx, SynthMode::Infer)?.borrow().to_string(),
            "Graph<weak>"
        );

        Ok(())
    }

    #[test]
    fn test_method_argument_mismatch_in_check_mode() {
        let mut ctx = setup_context(TypecheckerOptions::default());
        ctx.scope.add_variable(
            "m",
            Type::Map {
                key: Type::String.into_slot(),
                value: Type::Integer.into_slot(),
            }
            .into_slot(),
            false,
        );

        let call = Expression::Postfix(Postfix::Call {
            expr: Box::new(Expression::Postfix(Postfix::PropertyAccess {
                expr: Box::new(Expression::Id(Id {
                    name: "m".into(),
                    position: Span::default(),
                })),
                property: Id {
                    name: "set".into(),
                    position: Span::default(),
                },
                position: Span::default(),
            })),
            args: vec![int(1), int(2)],
            position: Span::default(),
        });

        let error = synth(&call, &mut ctx, SynthMode::Check).unwrap_err();
        assert!(error.to_string().starts_with("Type mismatch"));

        // refinement mode never reports
        assert!(synth(&call, &mut ctx, SynthMode::Refine).is_ok());
    }

    #[test]
    fn test_variadic_print() -> Result<()> {
        let mut ctx = setup_context(TypecheckerOptions::default());

        let call = Expression::Postfix(Postfix::Call {
            expr: Box::new(Expression::Id(Id {
                name: "print".into(),
                position: Span::default(),
            })),
            args: vec![int(1), string("two"), float(3.0)],
            position: Span::default(),
        });

        assert_eq!(*synth(&call, &mut ctx, SynthMode::Check)?.borrow(), Type::Void);

        Ok(())
    }

    #[test]
    fn test_indexing() -> Result<()> {
        let mut ctx = setup_context(TypecheckerOptions::default());
        ctx.scope.add_variable(
            "arr",
            Type::Array(Type::String.into_slot()).into_slot(),
            true,
        );
        ctx.scope.add_variable(
            "pair",
            Type::Tuple(vec![Type::Integer.into_slot(), Type::String.into_slot()]).into_slot(),
            true,
        );

        let arr = Expression::Id(Id {
            name: "arr".into(),
            position: Span::default(),
        });

        let indexed = Expression::Postfix(Postfix::Index {
            expr: Box::new(arr.clone()),
            index: Box::new(int(0)),
            position: Span::default(),
        });
        assert_eq!(
            *synth(&indexed, &mut ctx, SynthMode::Check)?.borrow(),
            Type::String
        );

        let sliced = Expression::Postfix(Postfix::Index {
            expr: Box::new(arr),
            index: Box::new(Expression::Array(ArrayLiteral {
                elements: vec![int(0), int(2)],
                position: Span::default(),
            })),
            position: Span::default(),
        });
        assert_eq!(
            synth(&sliced, &mut ctx, SynthMode::Check)?.borrow().to_string(),
            "Array<string>"
        );

        let pair = Expression::Id(Id {
            name: "pair".into(),
            position: Span::default(),
        });
        let second = Expression::Postfix(Postfix::Index {
            expr: Box::new(pair.clone()),
            index: Box::new(int(1)),
            position: Span::default(),
        });
        assert_eq!(
            *synth(&second, &mut ctx, SynthMode::Check)?.borrow(),
            Type::String
        );

        let out_of_range = Expression::Postfix(Postfix::Index {
            expr: Box::new(pair),
            index: Box::new(int(7)),
            position: Span::default(),
        });
        assert!(synth(&out_of_range, &mut ctx, SynthMode::Check).is_err());

        Ok(())
    }

    #[test]
    fn test_underscore_is_not_a_value() {
        let mut ctx = setup_context(TypecheckerOptions::default());
        let underscore = Expression::Id(Id {
            name: "_".into(),
            position: Span::default(),
        });
        assert!(synth(&underscore, &mut ctx, SynthMode::Check).is_err());
    }
}

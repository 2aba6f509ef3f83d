//! Checking pass: the final walk over the refined tree. Synthesizes every
//! expression in strict mode and rejects whatever incompatibility is
//! left: non-boolean conditions, non-iterables in `for`, return type
//! violations, call arity and argument mismatches, and assignments that
//! contradict a non-inferred annotation. The first violation aborts the
//! walk.

use crate::ast::{Assignment, Block, Expression, Postfix, Program, Span, Statement};

use super::context::Context;
use super::error::{
    CheckDetail, InvariantPlacement, NotIterable, ReturnTypeMismatch, TypeCheckError,
    TypeMismatch, UndefinedVariable,
};
use super::infer::loop_variable_slot;
use super::scope::{FunEnv, Scope};
use super::synth::{synth, SynthMode};
use super::types::{compatible, Type, TypeSlot};
use super::TypeResult;

/// Final environments, returned for tooling (language servers, the
/// runtime) that wants to look up resolved types after checking.
#[derive(Clone, Debug)]
pub struct CheckerState {
    pub scope: Scope,
    pub functions: FunEnv,
}

pub(crate) struct Checker {
    loop_depth: usize,
    /// Stack of enclosing function return slots; empty at top level.
    function_returns: Vec<TypeSlot>,
}

impl Checker {
    pub fn run(program: &mut Program, ctx: &mut Context) -> TypeResult<CheckerState> {
        let mut checker = Checker {
            loop_depth: 0,
            function_returns: vec![],
        };
        for statement in &mut program.statements {
            checker.check_statement(statement, ctx)?;
        }
        Ok(CheckerState {
            scope: ctx.scope.clone(),
            functions: ctx.functions.clone(),
        })
    }

    fn check_statement(&mut self, statement: &mut Statement, ctx: &mut Context) -> TypeResult<()> {
        match statement {
            Statement::VariableDeclaration(decl) => {
                for declarator in &mut decl.declarations {
                    let init = synth(&declarator.initializer, ctx, SynthMode::Check)?;
                    let Some(info) = &declarator.info else {
                        continue;
                    };
                    let declared = info.type_id.borrow().clone();
                    let actual = init.borrow().clone();

                    if declared.is_weak() {
                        // adopt a concrete initializer into a weak slot
                        if !actual.is_weak() {
                            *info.type_id.borrow_mut() = actual;
                        }
                    } else if !compatible(&mut ctx.cache, &declared, &actual) {
                        return Err(TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: declared,
                                actual,
                            },
                            declarator.initializer.position(),
                        ));
                    }

                    ctx.scope.add_variable(
                        &declarator.name.name,
                        info.type_id.clone(),
                        info.is_inferred,
                    );
                }
                Ok(())
            }
            Statement::FunctionDeclaration(func) => {
                ctx.scope.enter_scope();
                for param in &func.parameters {
                    if param.name.is_underscore() {
                        continue;
                    }
                    if let Some(info) = &param.info {
                        ctx.scope.add_variable(
                            &param.name.name,
                            info.type_id.clone(),
                            info.is_inferred,
                        );
                    }
                }
                if let Some(info) = &func.info {
                    self.function_returns.push(info.type_id.clone());
                }
                // invariant placement counts the function body as depth
                // zero again; loops outside don't legitimise it
                let saved_depth = self.loop_depth;
                self.loop_depth = 0;

                let result = self.check_block(&mut func.body, ctx);

                self.loop_depth = saved_depth;
                if func.info.is_some() {
                    self.function_returns.pop();
                }
                ctx.scope.exit_scope();
                result
            }
            Statement::If(if_statement) => {
                self.require_boolean(&if_statement.condition, ctx)?;
                self.check_block(&mut if_statement.then_branch, ctx)?;
                if let Some(else_branch) = &mut if_statement.else_branch {
                    self.check_block(else_branch, ctx)?;
                }
                Ok(())
            }
            Statement::WhileLoop(while_loop) => {
                self.require_boolean(&while_loop.condition, ctx)?;
                self.loop_depth += 1;
                let result = self.check_block(&mut while_loop.body, ctx);
                self.loop_depth -= 1;
                result
            }
            Statement::UntilLoop(until_loop) => {
                self.require_boolean(&until_loop.condition, ctx)?;
                self.loop_depth += 1;
                let result = self.check_block(&mut until_loop.body, ctx);
                self.loop_depth -= 1;
                result
            }
            Statement::ForLoop(for_loop) => {
                let iterable = synth(&for_loop.iterable, ctx, SynthMode::Check)?;
                let iterable_type = iterable.borrow().clone();
                if !matches!(
                    iterable_type,
                    Type::Array(_)
                        | Type::Set(_)
                        | Type::Map { .. }
                        | Type::Heap(_)
                        | Type::HeapMap { .. }
                        | Type::Range
                        | Type::Weak
                        | Type::Poly
                ) {
                    return Err(TypeCheckError::NotIterable(
                        NotIterable {
                            actual: iterable_type,
                        },
                        for_loop.iterable.position(),
                    ));
                }

                let variable = loop_variable_slot(&iterable_type);
                ctx.scope.enter_scope();
                if !for_loop.variable.is_underscore() {
                    ctx.scope
                        .add_variable(&for_loop.variable.name, variable, true);
                }
                self.loop_depth += 1;
                let result = self.check_block(&mut for_loop.body, ctx);
                self.loop_depth -= 1;
                ctx.scope.exit_scope();
                result
            }
            Statement::Return(ret) => {
                let Some(declared) = self.function_returns.last().cloned() else {
                    return Err(TypeCheckError::Check(
                        CheckDetail {
                            detail: "return outside of a function".into(),
                        },
                        ret.position.clone(),
                    ));
                };
                let declared = declared.borrow().clone();

                match &ret.value {
                    None => {
                        // a bare return requires a void function
                        if !declared.does_eq(&Type::Void) && !declared.is_weak() {
                            return Err(TypeCheckError::ReturnTypeMismatch(
                                ReturnTypeMismatch {
                                    expected: declared,
                                    actual: Type::Void,
                                },
                                ret.position.clone(),
                            ));
                        }
                    }
                    Some(value) => {
                        let actual = synth(value, ctx, SynthMode::Check)?;
                        let actual = actual.borrow().clone();
                        if !compatible(&mut ctx.cache, &declared, &actual) {
                            return Err(TypeCheckError::ReturnTypeMismatch(
                                ReturnTypeMismatch {
                                    expected: declared,
                                    actual,
                                },
                                value.position(),
                            ));
                        }
                    }
                }
                Ok(())
            }
            Statement::Block(block) => self.check_block(block, ctx),
            Statement::Expression(expression) => {
                synth(expression, ctx, SynthMode::Check)?;
                Ok(())
            }
            Statement::Assignment(assignment) => self.check_assignment(assignment, ctx),
            Statement::Invariant(invariant) => {
                if self.loop_depth == 0 && self.function_returns.is_empty() {
                    return Err(TypeCheckError::InvariantPlacement(
                        InvariantPlacement,
                        invariant.position.clone(),
                    ));
                }
                self.require_boolean(&invariant.condition, ctx)?;
                if let Some(message) = &invariant.message {
                    self.require_string(message, ctx)?;
                }
                Ok(())
            }
            Statement::Assert(assert) => {
                self.require_boolean(&assert.condition, ctx)?;
                if let Some(message) = &assert.message {
                    self.require_string(message, ctx)?;
                }
                Ok(())
            }
        }
    }

    fn check_block(&mut self, block: &mut Block, ctx: &mut Context) -> TypeResult<()> {
        for statement in &mut block.statements {
            self.check_statement(statement, ctx)?;
        }
        Ok(())
    }

    fn check_assignment(&mut self, assignment: &mut Assignment, ctx: &mut Context) -> TypeResult<()> {
        let value = synth(&assignment.value, ctx, SynthMode::Check)?;
        let value_type = value.borrow().clone();

        match &assignment.target {
            Expression::Id(id) => {
                let Some(entry) = ctx.scope.resolve_variable(&id.name) else {
                    return Err(TypeCheckError::UndefinedVariable(
                        UndefinedVariable {
                            variable_name: id.name.clone(),
                        },
                        id.position.clone(),
                    ));
                };
                // inferred bindings may widen; explicit ones are strict
                if !entry.is_inferred {
                    let declared = entry.type_id.borrow().clone();
                    if !compatible(&mut ctx.cache, &declared, &value_type) {
                        return Err(TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: declared,
                                actual: value_type,
                            },
                            assignment.value.position(),
                        ));
                    }
                }
                Ok(())
            }
            Expression::Postfix(Postfix::Index { expr, .. }) => {
                // synthesizing the index expression validates the index
                // typing itself and yields the element type
                let element = synth(&assignment.target, ctx, SynthMode::Check)?;
                let element_type = element.borrow().clone();

                let strict = expr
                    .as_id()
                    .and_then(|id| ctx.scope.resolve_variable(&id.name))
                    .map(|entry| !entry.is_inferred)
                    .unwrap_or(false);
                if strict && !compatible(&mut ctx.cache, &element_type, &value_type) {
                    return Err(TypeCheckError::TypeMismatch(
                        TypeMismatch {
                            expected: element_type,
                            actual: value_type,
                        },
                        assignment.value.position(),
                    ));
                }
                Ok(())
            }
            other => Err(TypeCheckError::Check(
                CheckDetail {
                    detail: "invalid assignment target".into(),
                },
                other.position(),
            )),
        }
    }

    fn require_boolean(&mut self, condition: &Expression, ctx: &mut Context) -> TypeResult<()> {
        let ty = synth(condition, ctx, SynthMode::Check)?;
        let ty = ty.borrow().clone();
        self.expect_type(&Type::Boolean, ty, condition.position(), ctx)
    }

    fn require_string(&mut self, message: &Expression, ctx: &mut Context) -> TypeResult<()> {
        let ty = synth(message, ctx, SynthMode::Check)?;
        let ty = ty.borrow().clone();
        self.expect_type(&Type::String, ty, message.position(), ctx)
    }

    fn expect_type(
        &mut self,
        expected: &Type,
        actual: Type,
        position: Span,
        ctx: &mut Context,
    ) -> TypeResult<()> {
        if actual.contains_weak() || matches!(actual, Type::Dynamic) {
            return Ok(());
        }
        if !compatible(&mut ctx.cache, expected, &actual) {
            return Err(TypeCheckError::TypeMismatch(
                TypeMismatch {
                    expected: expected.clone(),
                    actual,
                },
                position,
            ));
        }
        Ok(())
    }
}

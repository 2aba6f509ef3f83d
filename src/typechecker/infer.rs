//! Inference pass. Fills every missing annotation with the synthesized
//! type of its initializer (flagged as inferred), registers all functions
//! up front so mutually recursive calls resolve, and unifies return
//! statements into a return type when none was declared. Unknowns are
//! seeded as `weak` for the refinement pass to sharpen.

use crate::ast::{
    Block, ForLoop, FunctionDeclaration, Program, Span, Statement, VariableDeclarator,
};

use super::annotation;
use super::context::Context;
use super::error::{ConflictingReturnTypes, TypeCheckError};
use super::scope::FunctionSignature;
use super::synth::{synth, SynthMode};
use super::types::{Type, TypeSlot};
use super::{TypeInformation, TypeResult};

/// The type a `for` loop variable binds to, per iterable kind. Element
/// and key slots are shared, not copied, so the loop variable aliases the
/// container slot.
pub(crate) fn loop_variable_slot(iterable: &Type) -> TypeSlot {
    match iterable {
        Type::Array(element) | Type::Set(element) | Type::Heap(element) => element.clone(),
        Type::Map { key, .. } | Type::HeapMap { key, .. } => key.clone(),
        Type::Range => Type::Integer.into_slot(),
        Type::Weak | Type::Poly => Type::weak_slot(),
        _ => Type::Dynamic.into_slot(),
    }
}

/// Unify the collected return types of a function body: no returns means
/// `void`, bare placeholders stay weak for the refiner, and two differing
/// concrete returns are a conflict. A structured type with weak slots
/// (`Array<weak>` from `return []`) is kept as the candidate shape — its
/// slots alias the return expression, so later sharpening flows through.
pub(crate) fn unify_returns(collected: &[(TypeSlot, Span)]) -> TypeResult<Type> {
    let mut candidate: Option<Type> = None;
    for (slot, span) in collected {
        let ty = slot.borrow().clone();
        if ty.is_weak() {
            continue;
        }
        match &candidate {
            None => candidate = Some(ty),
            Some(first) if first.does_eq(&ty) => {}
            Some(first) if first.contains_weak() || ty.contains_weak() => {
                // shapes still carrying weakness defer to refinement;
                // prefer the more concrete of the two
                if first.contains_weak() && !ty.contains_weak() {
                    candidate = Some(ty);
                }
            }
            Some(first) => {
                return Err(TypeCheckError::ConflictingReturnTypes(
                    ConflictingReturnTypes {
                        first: first.clone(),
                        second: ty,
                    },
                    span.clone(),
                ));
            }
        }
    }

    Ok(match candidate {
        Some(ty) => ty,
        None if collected.is_empty() => Type::Void,
        None => Type::Weak,
    })
}

pub(crate) struct Inferencer;

impl Inferencer {
    pub fn run(program: &mut Program, ctx: &mut Context) -> TypeResult<()> {
        Self::register_functions(&mut program.statements, ctx)?;
        for statement in &mut program.statements {
            Self::infer_statement(statement, ctx, &mut None)?;
        }
        Ok(())
    }

    /// Pre-pass: register every function (at any nesting depth) before
    /// the main walk, so mutual recursion and forward calls resolve.
    fn register_functions(statements: &mut [Statement], ctx: &mut Context) -> TypeResult<()> {
        for statement in statements {
            match statement {
                Statement::FunctionDeclaration(func) => {
                    Self::register_function(func, ctx)?;
                    Self::register_functions(&mut func.body.statements, ctx)?;
                }
                Statement::Block(block) => Self::register_functions(&mut block.statements, ctx)?,
                Statement::If(if_statement) => {
                    Self::register_functions(&mut if_statement.then_branch.statements, ctx)?;
                    if let Some(else_branch) = &mut if_statement.else_branch {
                        Self::register_functions(&mut else_branch.statements, ctx)?;
                    }
                }
                Statement::WhileLoop(while_loop) => {
                    Self::register_functions(&mut while_loop.body.statements, ctx)?
                }
                Statement::UntilLoop(until_loop) => {
                    Self::register_functions(&mut until_loop.body.statements, ctx)?
                }
                Statement::ForLoop(for_loop) => {
                    Self::register_functions(&mut for_loop.body.statements, ctx)?
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn register_function(func: &mut FunctionDeclaration, ctx: &mut Context) -> TypeResult<()> {
        let mut params = vec![];
        for param in &mut func.parameters {
            let (slot, is_inferred) = match &param.type_annotation {
                Some(annotation) => (
                    annotation::resolve(annotation, &param.position)?.into_slot(),
                    annotation.is_inferred,
                ),
                None => (Type::weak_slot(), true),
            };
            param.info = Some(TypeInformation {
                type_id: slot.clone(),
                is_inferred,
            });
            params.push(slot);
        }

        let (return_slot, return_inferred) = match &func.return_type {
            Some(annotation) => (
                annotation::resolve(annotation, &func.position)?.into_slot(),
                annotation.is_inferred,
            ),
            None => (Type::weak_slot(), true),
        };
        func.info = Some(TypeInformation {
            type_id: return_slot.clone(),
            is_inferred: return_inferred,
        });

        ctx.functions.add_declared(
            &func.name.name,
            FunctionSignature {
                params,
                return_type: return_slot,
                variadic: false,
            },
        );

        Ok(())
    }

    fn infer_statement(
        statement: &mut Statement,
        ctx: &mut Context,
        returns: &mut Option<&mut Vec<(TypeSlot, Span)>>,
    ) -> TypeResult<()> {
        match statement {
            Statement::VariableDeclaration(decl) => {
                for declarator in &mut decl.declarations {
                    Self::infer_declarator(declarator, ctx)?;
                }
                Ok(())
            }
            Statement::FunctionDeclaration(func) => Self::infer_function(func, ctx),
            Statement::If(if_statement) => {
                synth(&if_statement.condition, ctx, SynthMode::Infer)?;
                Self::infer_block(&mut if_statement.then_branch, ctx, returns)?;
                if let Some(else_branch) = &mut if_statement.else_branch {
                    Self::infer_block(else_branch, ctx, returns)?;
                }
                Ok(())
            }
            Statement::WhileLoop(while_loop) => {
                synth(&while_loop.condition, ctx, SynthMode::Infer)?;
                Self::infer_block(&mut while_loop.body, ctx, returns)
            }
            Statement::UntilLoop(until_loop) => {
                synth(&until_loop.condition, ctx, SynthMode::Infer)?;
                Self::infer_block(&mut until_loop.body, ctx, returns)
            }
            Statement::ForLoop(for_loop) => Self::infer_for(for_loop, ctx, returns),
            Statement::Return(ret) => {
                let slot = match &ret.value {
                    Some(value) => synth(value, ctx, SynthMode::Infer)?,
                    None => Type::Void.into_slot(),
                };
                if let Some(returns) = returns {
                    returns.push((slot, ret.position.clone()));
                }
                Ok(())
            }
            Statement::Block(block) => Self::infer_block(block, ctx, returns),
            Statement::Expression(expression) => {
                synth(expression, ctx, SynthMode::Infer)?;
                Ok(())
            }
            Statement::Assignment(assignment) => {
                synth(&assignment.value, ctx, SynthMode::Infer)?;
                synth(&assignment.target, ctx, SynthMode::Infer)?;
                Ok(())
            }
            Statement::Invariant(invariant) => {
                synth(&invariant.condition, ctx, SynthMode::Infer)?;
                if let Some(message) = &invariant.message {
                    synth(message, ctx, SynthMode::Infer)?;
                }
                Ok(())
            }
            Statement::Assert(assert) => {
                synth(&assert.condition, ctx, SynthMode::Infer)?;
                if let Some(message) = &assert.message {
                    synth(message, ctx, SynthMode::Infer)?;
                }
                Ok(())
            }
        }
    }

    fn infer_block(
        block: &mut Block,
        ctx: &mut Context,
        returns: &mut Option<&mut Vec<(TypeSlot, Span)>>,
    ) -> TypeResult<()> {
        for statement in &mut block.statements {
            Self::infer_statement(statement, ctx, returns)?;
        }
        Ok(())
    }

    fn infer_declarator(
        declarator: &mut VariableDeclarator,
        ctx: &mut Context,
    ) -> TypeResult<()> {
        let init_slot = synth(&declarator.initializer, ctx, SynthMode::Infer)?;

        match &declarator.type_annotation {
            Some(annotation) => {
                let declared =
                    annotation::resolve(annotation, &declarator.position)?.into_slot();
                declarator.info = Some(TypeInformation {
                    type_id: declared.clone(),
                    is_inferred: annotation.is_inferred,
                });
                ctx.scope
                    .add_variable(&declarator.name.name, declared, annotation.is_inferred);
            }
            None => {
                // attach the initializer's own slot, so the variable, its
                // annotation and the environment all alias one node
                declarator.type_annotation =
                    Some(annotation::from_type(&init_slot.borrow()).inferred());
                declarator.info = Some(TypeInformation {
                    type_id: init_slot.clone(),
                    is_inferred: true,
                });
                ctx.scope.add_variable(&declarator.name.name, init_slot, true);
            }
        }
        Ok(())
    }

    fn infer_function(func: &mut FunctionDeclaration, ctx: &mut Context) -> TypeResult<()> {
        ctx.scope.enter_scope();
        for param in &func.parameters {
            if param.name.is_underscore() {
                continue;
            }
            if let Some(info) = &param.info {
                ctx.scope
                    .add_variable(&param.name.name, info.type_id.clone(), info.is_inferred);
            }
        }

        let mut collected = vec![];
        let result = (|| -> TypeResult<()> {
            for statement in &mut func.body.statements {
                Self::infer_statement(statement, ctx, &mut Some(&mut collected))?;
            }
            Ok(())
        })();
        ctx.scope.exit_scope();
        result?;

        if func.return_type.is_none() {
            let unified = unify_returns(&collected)?;
            if let Some(info) = &func.info {
                *info.type_id.borrow_mut() = unified;
                func.return_type =
                    Some(annotation::from_type(&info.type_id.borrow()).inferred());
            }
        }

        Ok(())
    }

    fn infer_for(
        for_loop: &mut ForLoop,
        ctx: &mut Context,
        returns: &mut Option<&mut Vec<(TypeSlot, Span)>>,
    ) -> TypeResult<()> {
        let iterable = synth(&for_loop.iterable, ctx, SynthMode::Infer)?;
        let variable = loop_variable_slot(&iterable.borrow());

        ctx.scope.enter_scope();
        if !for_loop.variable.is_underscore() {
            ctx.scope
                .add_variable(&for_loop.variable.name, variable, true);
        }
        let result = Self::infer_block(&mut for_loop.body, ctx, returns);
        ctx.scope.exit_scope();
        result
    }

}

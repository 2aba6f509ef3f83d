//! Refinement pass: a bounded fixed point that replaces `weak`/`poly`
//! slots with the concrete types observed at their use sites.
//!
//! Slots are sharpened strictly in place, so every alias — environment
//! entries, container payloads, annotations — observes the update without
//! being rewritten. The only legal mutation is sharpening: a concrete
//! slot is never overwritten with a weaker type. Each pass clears the
//! equality cache and tracks a `changed` flag; iteration stops early at
//! the fixed point and is capped at [`MAX_REFINEMENT_PASSES`] regardless.
//!
//! The pass never surfaces checker-phase errors; a slow-to-converge
//! refinement must not be observable as one. The single error it can
//! raise is a return-type conflict discovered while re-analysing a
//! function body.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::ast::{
    Assignment, Block, Expression, ForLoop, FunctionDeclaration, Id, Postfix, Program, Span,
    Statement, VariableDeclarator,
};

use super::annotation;
use super::builtins;
use super::context::Context;
use super::infer::{loop_variable_slot, unify_returns};
use super::synth::{synth, union_of, SynthMode};
use super::types::{occurs_in, Type, TypeSlot};
use super::TypeResult;

/// Hard cap on refinement passes. Sharpening is monotone on a finite
/// lattice, so the fixed point arrives much earlier; the cap guarantees
/// termination even in the face of a non-monotonicity bug.
pub const MAX_REFINEMENT_PASSES: usize = 10;

pub(crate) struct Refiner {
    changed: bool,
}

impl Refiner {
    pub fn run(program: &mut Program, ctx: &mut Context) -> TypeResult<()> {
        for _ in 0..MAX_REFINEMENT_PASSES {
            ctx.cache.clear();
            let mut pass = Refiner { changed: false };
            for statement in &mut program.statements {
                pass.refine_statement(statement, ctx)?;
            }
            if !pass.changed {
                return Ok(());
            }
        }
        log::error!(
            "type refinement did not converge within {MAX_REFINEMENT_PASSES} passes; \
             a slot was re-widened instead of sharpened"
        );
        Ok(())
    }

    /// Overwrite a weak slot with a more specific type. No-ops when the
    /// slot is already concrete, when the replacement carries no
    /// information, or when it would embed the slot in itself.
    fn sharpen(&mut self, slot: &TypeSlot, ty: &Type) {
        if !slot.borrow().is_weak() {
            return;
        }
        if ty.is_weak() {
            return;
        }
        if occurs_in(slot, ty) {
            return;
        }
        *slot.borrow_mut() = ty.clone();
        self.changed = true;
    }

    /// Push an observed type into a container slot. Weak slots sharpen;
    /// concrete disagreeing slots widen to a union when the union option
    /// is on, and are left for the checker to reject otherwise.
    fn widen_or_sharpen(&mut self, slot: &TypeSlot, ty: &Type, union_widening: bool) {
        let current = slot.borrow().clone();
        if current.is_weak() {
            self.sharpen(slot, ty);
            return;
        }
        if ty.is_weak() || ty.contains_weak() || current.does_eq(ty) {
            return;
        }
        if union_widening && !occurs_in(slot, ty) {
            let widened = union_of(&[current.clone().into_slot(), ty.clone().into_slot()]);
            if !widened.does_eq(&current) {
                *slot.borrow_mut() = widened;
                self.changed = true;
            }
        }
    }

    /// Replace weak slots in `target` with concrete ones from a
    /// matching-shape `source`, strictly downward: a concrete target slot
    /// is never regressed.
    fn refine_nested(&mut self, target: &TypeSlot, source: &TypeSlot) {
        if Rc::ptr_eq(target, source) {
            return;
        }
        let target_type = target.borrow().clone();
        let source_type = source.borrow().clone();

        if target_type.is_weak() {
            self.sharpen(target, &source_type);
            return;
        }
        if !target_type.contains_weak() {
            return;
        }

        match (&target_type, &source_type) {
            (Type::Array(t), Type::Array(s))
            | (Type::Set(t), Type::Set(s))
            | (Type::Heap(t), Type::Heap(s))
            | (Type::BinaryTree(t), Type::BinaryTree(s))
            | (Type::AvlTree(t), Type::AvlTree(s))
            | (Type::Graph(t), Type::Graph(s)) => self.refine_nested(t, s),
            (
                Type::Map {
                    key: tk,
                    value: tv,
                },
                Type::Map {
                    key: sk,
                    value: sv,
                },
            )
            | (
                Type::HeapMap {
                    key: tk,
                    value: tv,
                },
                Type::HeapMap {
                    key: sk,
                    value: sv,
                },
            ) => {
                self.refine_nested(tk, sk);
                self.refine_nested(tv, sv);
            }
            (Type::Tuple(t), Type::Tuple(s)) if t.len() == s.len() => {
                for (target_member, source_member) in t.iter().zip(s.iter()) {
                    self.refine_nested(target_member, source_member);
                }
            }
            (Type::Record(t), Type::Record(s)) => {
                for (name, target_field) in t {
                    if let Some((_, source_field)) =
                        s.iter().find(|(source_name, _)| source_name == name)
                    {
                        self.refine_nested(target_field, source_field);
                    }
                }
            }
            (
                Type::Function {
                    params: t_params,
                    return_type: t_return,
                    ..
                },
                Type::Function {
                    params: s_params,
                    return_type: s_return,
                    ..
                },
            ) if t_params.len() == s_params.len() => {
                for (target_param, source_param) in t_params.iter().zip(s_params.iter()) {
                    self.refine_nested(target_param, source_param);
                }
                self.refine_nested(t_return, s_return);
            }
            _ => {}
        }
    }

    fn refine_statement(&mut self, statement: &mut Statement, ctx: &mut Context) -> TypeResult<()> {
        match statement {
            Statement::VariableDeclaration(decl) => {
                for declarator in &mut decl.declarations {
                    self.refine_declarator(declarator, ctx)?;
                }
                Ok(())
            }
            Statement::FunctionDeclaration(func) => self.refine_function(func, ctx),
            Statement::If(if_statement) => {
                self.refine_expression(&if_statement.condition, ctx)?;
                self.refine_block(&mut if_statement.then_branch, ctx)?;
                if let Some(else_branch) = &mut if_statement.else_branch {
                    self.refine_block(else_branch, ctx)?;
                }
                Ok(())
            }
            Statement::WhileLoop(while_loop) => {
                self.refine_expression(&while_loop.condition, ctx)?;
                self.refine_block(&mut while_loop.body, ctx)
            }
            Statement::UntilLoop(until_loop) => {
                self.refine_expression(&until_loop.condition, ctx)?;
                self.refine_block(&mut until_loop.body, ctx)
            }
            Statement::ForLoop(for_loop) => self.refine_for(for_loop, ctx),
            Statement::Return(ret) => {
                if let Some(value) = &ret.value {
                    self.refine_expression(value, ctx)?;
                }
                Ok(())
            }
            Statement::Block(block) => self.refine_block(block, ctx),
            Statement::Expression(expression) => self.refine_expression(expression, ctx),
            Statement::Assignment(assignment) => self.refine_assignment(assignment, ctx),
            Statement::Invariant(invariant) => {
                self.refine_expression(&invariant.condition, ctx)?;
                if let Some(message) = &invariant.message {
                    self.refine_expression(message, ctx)?;
                }
                Ok(())
            }
            Statement::Assert(assert) => {
                self.refine_expression(&assert.condition, ctx)?;
                if let Some(message) = &assert.message {
                    self.refine_expression(message, ctx)?;
                }
                Ok(())
            }
        }
    }

    fn refine_block(&mut self, block: &mut Block, ctx: &mut Context) -> TypeResult<()> {
        for statement in &mut block.statements {
            self.refine_statement(statement, ctx)?;
        }
        Ok(())
    }

    fn refine_declarator(
        &mut self,
        declarator: &mut VariableDeclarator,
        ctx: &mut Context,
    ) -> TypeResult<()> {
        self.refine_expression(&declarator.initializer, ctx)?;

        let Some(info) = declarator.info.clone() else {
            return Ok(());
        };

        let init = synth(&declarator.initializer, ctx, SynthMode::Refine)?;
        // the observed initializer shape flows into the declared slots;
        // the reverse only makes sense when the initializer is a variable
        // whose slot outlives this statement
        self.refine_nested(&info.type_id, &init);
        if declarator.initializer.as_id().is_some() {
            self.refine_nested(&init, &info.type_id);
        }

        ctx.scope
            .add_variable(&declarator.name.name, info.type_id.clone(), info.is_inferred);

        // keep the syntactic annotation in sync with the sharpened slot
        let is_inferred = declarator
            .type_annotation
            .as_ref()
            .map(|a| a.is_inferred)
            .unwrap_or(info.is_inferred);
        let mut rewritten = annotation::from_type(&info.type_id.borrow());
        rewritten.is_inferred = is_inferred;
        declarator.type_annotation = Some(rewritten);

        Ok(())
    }

    fn refine_assignment(&mut self, assignment: &mut Assignment, ctx: &mut Context) -> TypeResult<()> {
        self.refine_expression(&assignment.value, ctx)?;
        let value = synth(&assignment.value, ctx, SynthMode::Refine)?;

        match &assignment.target {
            Expression::Id(id) => {
                if let Some(target) = ctx.scope.resolve_name(&id.name) {
                    self.refine_nested(&target, &value);
                    if assignment.value.as_id().is_some() {
                        self.refine_nested(&value, &target);
                    }
                }
            }
            Expression::Postfix(Postfix::Index { expr, index, .. }) => {
                self.refine_expression(index, ctx)?;
                let Some(base_id) = expr.as_id() else {
                    return Ok(());
                };
                let Some(entry) = ctx.scope.resolve_variable(&base_id.name) else {
                    return Ok(());
                };
                // only inferred bindings may widen their element slots
                if !entry.is_inferred {
                    return Ok(());
                }
                let base = entry.type_id.borrow().clone();
                let value_type = value.borrow().clone();
                match base {
                    Type::Array(element) => {
                        self.widen_or_sharpen(&element, &value_type, ctx.options.union_widening);
                    }
                    Type::Map { key, value: val } => {
                        let index_type = synth(index, ctx, SynthMode::Refine)?;
                        let index_type = index_type.borrow().clone();
                        self.widen_or_sharpen(&key, &index_type, ctx.options.union_widening);
                        self.widen_or_sharpen(&val, &value_type, ctx.options.union_widening);
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Walk an expression and apply call-site refinement to every method
    /// call on an identifier receiver and every call of a declared
    /// function.
    fn refine_expression(&mut self, expr: &Expression, ctx: &mut Context) -> TypeResult<()> {
        match expr {
            Expression::Binary(binary) => {
                self.refine_expression(&binary.left, ctx)?;
                self.refine_expression(&binary.right, ctx)
            }
            Expression::Prefix(prefix) => self.refine_expression(&prefix.operand, ctx),
            Expression::Array(array) => {
                for element in &array.elements {
                    self.refine_expression(element, ctx)?;
                }
                Ok(())
            }
            Expression::Range(range) => {
                if let Some(start) = &range.start {
                    self.refine_expression(start, ctx)?;
                }
                if let Some(end) = &range.end {
                    self.refine_expression(end, ctx)?;
                }
                Ok(())
            }
            Expression::TypeOf(type_of) => self.refine_expression(&type_of.operand, ctx),
            Expression::PredicateCheck(check) => {
                self.refine_expression(&check.subject, ctx)?;
                for arg in &check.predicate_args {
                    self.refine_expression(arg, ctx)?;
                }
                Ok(())
            }
            Expression::Postfix(postfix) => match postfix {
                Postfix::Call {
                    expr: callee,
                    args,
                    ..
                } => {
                    for arg in args {
                        self.refine_expression(arg, ctx)?;
                    }
                    match callee.as_ref() {
                        Expression::Id(id) => self.refine_function_call(id, args, ctx),
                        Expression::Postfix(Postfix::PropertyAccess {
                            expr: receiver,
                            property,
                            ..
                        }) => {
                            self.refine_expression(receiver, ctx)?;
                            self.refine_method_call(receiver, property, args, ctx)
                        }
                        Expression::MetaId(_) => Ok(()),
                        other => self.refine_expression(other, ctx),
                    }
                }
                Postfix::Index { expr, index, .. } => {
                    self.refine_expression(expr, ctx)?;
                    self.refine_expression(index, ctx)
                }
                Postfix::PropertyAccess { expr, .. } => self.refine_expression(expr, ctx),
            },
            _ => Ok(()),
        }
    }

    /// `recv.method(args)`: push every argument type into the matching
    /// container slot, and conversely refine weak argument identifiers
    /// from the slot.
    fn refine_method_call(
        &mut self,
        receiver: &Expression,
        property: &Id,
        args: &[Expression],
        ctx: &mut Context,
    ) -> TypeResult<()> {
        let Some(receiver_id) = receiver.as_id() else {
            return Ok(());
        };
        let Some(entry) = ctx.scope.resolve_variable(&receiver_id.name) else {
            return Ok(());
        };
        let receiver_type = entry.type_id.borrow().clone();
        let Some(signature) = builtins::method_signature(&receiver_type, &property.name) else {
            return Ok(());
        };
        if signature.params.len() != args.len() {
            return Ok(());
        }

        // weak slots always sharpen; widening to a union is reserved for
        // inferred bindings, a non-inferred annotation stays strict
        let union_widening = ctx.options.union_widening && entry.is_inferred;

        for (param, arg) in signature.params.iter().zip(args.iter()) {
            let arg_slot = synth(arg, ctx, SynthMode::Refine)?;
            let arg_type = arg_slot.borrow().clone();
            // only slots the receiver actually owns are refined; fixed
            // parameter positions (like an edge weight) are rebuilt fresh
            // on every signature lookup
            if occurs_in(param, &receiver_type) {
                self.widen_or_sharpen(param, &arg_type, union_widening);
            }

            if let Some(arg_id) = arg.as_id() {
                if let Some(arg_var) = ctx.scope.resolve_name(&arg_id.name) {
                    self.refine_nested(&arg_var, param);
                }
            }
        }
        Ok(())
    }

    /// `f(args)` for a function declared in the tree: refine the callee's
    /// parameter slots from the argument types, recursing into matching
    /// container shapes. Built-ins are skipped; their placeholders stay
    /// polymorphic.
    fn refine_function_call(
        &mut self,
        id: &Id,
        args: &[Expression],
        ctx: &mut Context,
    ) -> TypeResult<()> {
        if !ctx.functions.is_declared(&id.name) {
            return Ok(());
        }
        let Some(signature) = ctx.functions.resolve(&id.name) else {
            return Ok(());
        };

        for (i, arg) in args.iter().enumerate() {
            let Some(param) = signature.params.get(i) else {
                break;
            };
            let arg_slot = synth(arg, ctx, SynthMode::Refine)?;
            self.refine_nested(param, &arg_slot);
        }
        // a weak return type is re-analysed when the declaration is next
        // visited; parameter sharpening keeps the fixed point iterating
        Ok(())
    }

    fn refine_function(
        &mut self,
        func: &mut FunctionDeclaration,
        ctx: &mut Context,
    ) -> TypeResult<()> {
        self.apply_parameter_constraints(func, ctx)?;

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

        let result = (|| -> TypeResult<()> {
            self.refine_block(&mut func.body, ctx)?;

            if let Some(info) = &func.info {
                if info.type_id.borrow().is_weak() {
                    let mut collected = vec![];
                    self.collect_returns(&func.body, ctx, &mut collected)?;
                    let unified = unify_returns(&collected)?;
                    self.sharpen(&info.type_id, &unified);
                }
            }
            Ok(())
        })();
        ctx.scope.exit_scope();
        result?;

        // rewrite the annotations to the sharpened slots
        for param in &mut func.parameters {
            if let Some(info) = &param.info {
                let is_inferred = param
                    .type_annotation
                    .as_ref()
                    .map(|a| a.is_inferred)
                    .unwrap_or(info.is_inferred);
                let mut rewritten = annotation::from_type(&info.type_id.borrow());
                rewritten.is_inferred = is_inferred;
                param.type_annotation = Some(rewritten);
            }
        }
        if let Some(info) = &func.info {
            let is_inferred = func
                .return_type
                .as_ref()
                .map(|a| a.is_inferred)
                .unwrap_or(info.is_inferred);
            let mut rewritten = annotation::from_type(&info.type_id.borrow());
            rewritten.is_inferred = is_inferred;
            func.return_type = Some(rewritten);
        }

        Ok(())
    }

    /// Collect coarse constraints for parameters that are still weak from
    /// the way the body uses them: binary comparisons against concrete
    /// operands, container-shaped method calls, `.length`, and indexing.
    /// First writer wins.
    fn apply_parameter_constraints(
        &mut self,
        func: &mut FunctionDeclaration,
        ctx: &mut Context,
    ) -> TypeResult<()> {
        let weak_params: HashSet<String> = func
            .parameters
            .iter()
            .filter(|param| {
                param
                    .info
                    .as_ref()
                    .is_some_and(|info| info.type_id.borrow().is_weak())
            })
            .map(|param| param.name.name.clone())
            .collect();
        if weak_params.is_empty() {
            return Ok(());
        }

        let mut constraints: HashMap<String, Type> = HashMap::new();
        self.collect_constraints_block(&func.body, &weak_params, &mut constraints, ctx)?;

        for param in &func.parameters {
            if let (Some(info), Some(ty)) =
                (&param.info, constraints.get(&param.name.name))
            {
                self.sharpen(&info.type_id, ty);
            }
        }
        Ok(())
    }

    fn collect_constraints_block(
        &mut self,
        block: &Block,
        params: &HashSet<String>,
        constraints: &mut HashMap<String, Type>,
        ctx: &mut Context,
    ) -> TypeResult<()> {
        for statement in &block.statements {
            self.collect_constraints_statement(statement, params, constraints, ctx)?;
        }
        Ok(())
    }

    fn collect_constraints_statement(
        &mut self,
        statement: &Statement,
        params: &HashSet<String>,
        constraints: &mut HashMap<String, Type>,
        ctx: &mut Context,
    ) -> TypeResult<()> {
        match statement {
            Statement::VariableDeclaration(decl) => {
                for declarator in &decl.declarations {
                    self.collect_constraints_expression(
                        &declarator.initializer,
                        params,
                        constraints,
                        ctx,
                    )?;
                }
                Ok(())
            }
            // nested functions have their own parameters
            Statement::FunctionDeclaration(_) => Ok(()),
            Statement::If(if_statement) => {
                self.collect_constraints_expression(
                    &if_statement.condition,
                    params,
                    constraints,
                    ctx,
                )?;
                self.collect_constraints_block(&if_statement.then_branch, params, constraints, ctx)?;
                if let Some(else_branch) = &if_statement.else_branch {
                    self.collect_constraints_block(else_branch, params, constraints, ctx)?;
                }
                Ok(())
            }
            Statement::WhileLoop(while_loop) => {
                self.collect_constraints_expression(
                    &while_loop.condition,
                    params,
                    constraints,
                    ctx,
                )?;
                self.collect_constraints_block(&while_loop.body, params, constraints, ctx)
            }
            Statement::UntilLoop(until_loop) => {
                self.collect_constraints_expression(
                    &until_loop.condition,
                    params,
                    constraints,
                    ctx,
                )?;
                self.collect_constraints_block(&until_loop.body, params, constraints, ctx)
            }
            Statement::ForLoop(for_loop) => {
                self.collect_constraints_expression(&for_loop.iterable, params, constraints, ctx)?;
                self.collect_constraints_block(&for_loop.body, params, constraints, ctx)
            }
            Statement::Return(ret) => {
                if let Some(value) = &ret.value {
                    self.collect_constraints_expression(value, params, constraints, ctx)?;
                }
                Ok(())
            }
            Statement::Block(block) => {
                self.collect_constraints_block(block, params, constraints, ctx)
            }
            Statement::Expression(expression) => {
                self.collect_constraints_expression(expression, params, constraints, ctx)
            }
            Statement::Assignment(assignment) => {
                self.collect_constraints_expression(&assignment.target, params, constraints, ctx)?;
                self.collect_constraints_expression(&assignment.value, params, constraints, ctx)
            }
            Statement::Invariant(invariant) => {
                self.collect_constraints_expression(
                    &invariant.condition,
                    params,
                    constraints,
                    ctx,
                )
            }
            Statement::Assert(assert) => {
                self.collect_constraints_expression(&assert.condition, params, constraints, ctx)
            }
        }
    }

    fn collect_constraints_expression(
        &mut self,
        expr: &Expression,
        params: &HashSet<String>,
        constraints: &mut HashMap<String, Type>,
        ctx: &mut Context,
    ) -> TypeResult<()> {
        match expr {
            Expression::Binary(binary) => {
                self.constrain_from_operands(&binary.left, &binary.right, params, constraints, ctx)?;
                self.constrain_from_operands(&binary.right, &binary.left, params, constraints, ctx)?;
                self.collect_constraints_expression(&binary.left, params, constraints, ctx)?;
                self.collect_constraints_expression(&binary.right, params, constraints, ctx)
            }
            Expression::Prefix(prefix) => {
                self.collect_constraints_expression(&prefix.operand, params, constraints, ctx)
            }
            Expression::Array(array) => {
                for element in &array.elements {
                    self.collect_constraints_expression(element, params, constraints, ctx)?;
                }
                Ok(())
            }
            Expression::Postfix(Postfix::Call {
                expr: callee,
                args,
                ..
            }) => {
                if let Expression::Postfix(Postfix::PropertyAccess {
                    expr: receiver,
                    property,
                    ..
                }) = callee.as_ref()
                {
                    if let Some(id) = receiver.as_id() {
                        if params.contains(&id.name) {
                            if let Some(shape) = builtins::coarse_shape(&property.name, args.len())
                            {
                                constraints.entry(id.name.clone()).or_insert(shape);
                            }
                        }
                    }
                }
                for arg in args {
                    self.collect_constraints_expression(arg, params, constraints, ctx)?;
                }
                Ok(())
            }
            Expression::Postfix(Postfix::Index { expr, index, .. }) => {
                if let Some(id) = expr.as_id() {
                    if params.contains(&id.name) {
                        constraints
                            .entry(id.name.clone())
                            .or_insert(Type::Array(Type::weak_slot()));
                    }
                }
                self.collect_constraints_expression(index, params, constraints, ctx)
            }
            Expression::Postfix(Postfix::PropertyAccess { expr, property, .. }) => {
                if let Some(id) = expr.as_id() {
                    if params.contains(&id.name) && property.name == "length" {
                        constraints
                            .entry(id.name.clone())
                            .or_insert(Type::Array(Type::weak_slot()));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// `param op other`: when the other operand has a concrete type, it
    /// becomes the parameter's constraint.
    fn constrain_from_operands(
        &mut self,
        candidate: &Expression,
        other: &Expression,
        params: &HashSet<String>,
        constraints: &mut HashMap<String, Type>,
        ctx: &mut Context,
    ) -> TypeResult<()> {
        let Some(id) = candidate.as_id() else {
            return Ok(());
        };
        if !params.contains(&id.name) {
            return Ok(());
        }
        let other_type = synth(other, ctx, SynthMode::Refine)?;
        let other_type = other_type.borrow().clone();
        if !other_type.contains_weak() && !matches!(other_type, Type::Void | Type::Dynamic) {
            constraints.entry(id.name.clone()).or_insert(other_type);
        }
        Ok(())
    }

    fn refine_for(&mut self, for_loop: &mut ForLoop, ctx: &mut Context) -> TypeResult<()> {
        self.refine_expression(&for_loop.iterable, ctx)?;
        let iterable = synth(&for_loop.iterable, ctx, SynthMode::Refine)?;
        let variable = loop_variable_slot(&iterable.borrow());

        ctx.scope.enter_scope();
        if !for_loop.variable.is_underscore() {
            ctx.scope
                .add_variable(&for_loop.variable.name, variable, true);
        }
        let result = self.refine_block(&mut for_loop.body, ctx);
        ctx.scope.exit_scope();
        result
    }

    #[cfg(test)]
    fn test_instance() -> Refiner {
        Refiner { changed: false }
    }

    /// Gather the synthesized type of every `return` in a body, without
    /// descending into nested function declarations.
    fn collect_returns(
        &mut self,
        block: &Block,
        ctx: &mut Context,
        collected: &mut Vec<(TypeSlot, Span)>,
    ) -> TypeResult<()> {
        for statement in &block.statements {
            match statement {
                Statement::Return(ret) => {
                    let slot = match &ret.value {
                        Some(value) => synth(value, ctx, SynthMode::Refine)?,
                        None => Type::Void.into_slot(),
                    };
                    collected.push((slot, ret.position.clone()));
                }
                Statement::If(if_statement) => {
                    self.collect_returns(&if_statement.then_branch, ctx, collected)?;
                    if let Some(else_branch) = &if_statement.else_branch {
                        self.collect_returns(else_branch, ctx, collected)?;
                    }
                }
                Statement::WhileLoop(while_loop) => {
                    self.collect_returns(&while_loop.body, ctx, collected)?
                }
                Statement::UntilLoop(until_loop) => {
                    self.collect_returns(&until_loop.body, ctx, collected)?
                }
                Statement::ForLoop(for_loop) => {
                    let iterable = synth(&for_loop.iterable, ctx, SynthMode::Refine)?;
                    let variable = loop_variable_slot(&iterable.borrow());
                    ctx.scope.enter_scope();
                    if !for_loop.variable.is_underscore() {
                        ctx.scope
                            .add_variable(&for_loop.variable.name, variable, true);
                    }
                    let result = self.collect_returns(&for_loop.body, ctx, collected);
                    ctx.scope.exit_scope();
                    result?
                }
                Statement::Block(block) => self.collect_returns(block, ctx, collected)?,
                Statement::FunctionDeclaration(_) => {}
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Refiner;
    use crate::typechecker::types::Type;

    #[test]
    fn test_sharpen_is_monotone() {
        let mut refiner = Refiner::test_instance();

        let slot = Type::weak_slot();
        refiner.sharpen(&slot, &Type::Integer);
        assert_eq!(*slot.borrow(), Type::Integer);
        assert!(refiner.changed);

        // a concrete slot is never regressed
        refiner.sharpen(&slot, &Type::String);
        assert_eq!(*slot.borrow(), Type::Integer);
    }

    #[test]
    fn test_sharpen_ignores_placeholders() {
        let mut refiner = Refiner::test_instance();

        let slot = Type::weak_slot();
        refiner.sharpen(&slot, &Type::Weak);
        refiner.sharpen(&slot, &Type::Poly);

        assert_eq!(*slot.borrow(), Type::Weak);
        assert!(!refiner.changed);
    }

    #[test]
    fn test_sharpen_refuses_self_embedding() {
        let mut refiner = Refiner::test_instance();

        let slot = Type::weak_slot();
        let array_of_slot = Type::Array(slot.clone());
        refiner.sharpen(&slot, &array_of_slot);

        assert_eq!(*slot.borrow(), Type::Weak);
        assert!(!refiner.changed);
    }

    #[test]
    fn test_refine_nested_fills_weak_slots_only() {
        let mut refiner = Refiner::test_instance();

        let key = Type::weak_slot();
        let value = Type::Integer.into_slot();
        let target = Type::Map {
            key: key.clone(),
            value: value.clone(),
        }
        .into_slot();
        let source = Type::Map {
            key: Type::String.into_slot(),
            value: Type::Boolean.into_slot(),
        }
        .into_slot();

        refiner.refine_nested(&target, &source);

        assert_eq!(*key.borrow(), Type::String);
        // the concrete value slot was not regressed to boolean
        assert_eq!(*value.borrow(), Type::Integer);
    }

    #[test]
    fn test_widen_or_sharpen_unions_when_enabled() {
        let mut refiner = Refiner::test_instance();

        let slot = Type::Integer.into_slot();
        refiner.widen_or_sharpen(&slot, &Type::Boolean, true);
        assert_eq!(slot.borrow().to_string(), "int | boolean");
        assert!(refiner.changed);

        // pushing a member of the union again must not count as a change
        refiner.changed = false;
        refiner.widen_or_sharpen(&slot, &Type::Boolean, true);
        assert!(!refiner.changed);
    }

    #[test]
    fn test_widen_or_sharpen_strict_leaves_slot_for_the_checker() {
        let mut refiner = Refiner::test_instance();

        let slot = Type::Integer.into_slot();
        refiner.widen_or_sharpen(&slot, &Type::Boolean, false);

        assert_eq!(*slot.borrow(), Type::Integer);
        assert!(!refiner.changed);
    }
}

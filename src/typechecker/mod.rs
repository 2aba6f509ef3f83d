//! # Type Checker Module
//!
//! Static type system for Mira programs. The checker consumes a fully
//! parsed syntax tree and runs three passes over it:
//!
//! ```text
//! Syntax Tree  →  Inference  →  Refinement  →  Checking
//!   (Parser)      (seed weak)   (fixed point)  (verify)
//! ```
//!
//! ### Pass 1: Inference
//! Fills missing annotations on variable declarations, parameters and
//! function return types from their initializers and bodies, marking them
//! as inferred. Unknowns are seeded as `weak` placeholders. A pre-pass
//! registers every function first so mutual recursion resolves.
//!
//! ### Pass 2: Refinement
//! A bounded fixed point (at most ten passes) that replaces `weak`/`poly`
//! slots with the concrete types observed at use sites: container method
//! calls, index assignments, and function-call argument/return
//! constraints. Slots are shared mutable nodes (`Rc<RefCell<Type>>`), so
//! sharpening one updates every alias — environment entries, enclosing
//! container types, and the annotations on the tree — at once. The pass
//! reports nothing; a slow-to-converge refinement is never observable as
//! an error.
//!
//! ### Pass 3: Checking
//! A final strict walk that rejects any remaining incompatibility:
//! conditions, iterables, call arity and arguments, return types, and
//! assignments against non-inferred annotations. The first error aborts.
//!
//! ## Strict vs union refinement
//!
//! Container slots that observe disagreeing types are a `Type mismatch`
//! by default; with [`TypecheckerOptions::union_widening`] the slot
//! widens to a union instead (`Map<string, int | boolean>`).

mod annotation;
mod builtins;
mod check;
mod context;
mod error;
mod infer;
mod refine;
mod scope;
mod synth;
mod types;

use serde::{Deserialize, Serialize};

use crate::ast::Program;

use self::check::Checker;
use self::infer::Inferencer;
use self::refine::Refiner;

pub use self::check::CheckerState;
pub use self::context::Context;
pub use self::error::TypeCheckError;
pub use self::refine::MAX_REFINEMENT_PASSES;
pub use self::scope::{FunEnv, FunctionSignature, Scope};
pub use self::types::{compatible, Type, TypeEqualityCache, TypeSlot};

pub type TypeResult<T> = Result<T, TypeCheckError>;

/// Resolved type information attached to declaring nodes (variable
/// declarators, parameters, function returns). The slot is shared with
/// the environments, so in-place sharpening during refinement updates
/// every view simultaneously.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeInformation {
    pub type_id: TypeSlot,
    pub is_inferred: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypecheckerOptions {
    /// Widen container slots to union types when use sites disagree,
    /// instead of leaving the mismatch for the checker to reject.
    #[serde(default)]
    pub union_widening: bool,
}

#[derive(Debug, Default)]
pub struct Typechecker {
    options: TypecheckerOptions,
}

impl Typechecker {
    pub fn new() -> Typechecker {
        Typechecker::default()
    }

    pub fn with_options(options: TypecheckerOptions) -> Typechecker {
        Typechecker { options }
    }

    /// Run inference, refinement and checking over the program, mutating
    /// its annotations in place.
    pub fn check(&self, program: &mut Program) -> TypeResult<()> {
        self.check_and_return(program).map(|_| ())
    }

    /// Like [`check`](Typechecker::check), but returns the final
    /// environments for tooling.
    pub fn check_and_return(&self, program: &mut Program) -> TypeResult<CheckerState> {
        let mut ctx = builtins::setup_context(self.options);

        Inferencer::run(program, &mut ctx)?;
        Refiner::run(program, &mut ctx)?;

        ctx.cache.clear();
        Checker::run(program, &mut ctx)
    }
}

/// Convenience entry point with default (strict) options.
pub fn type_check(program: &mut Program) -> TypeResult<()> {
    Typechecker::new().check(program)
}

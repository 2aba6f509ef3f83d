//! Shared state threaded through the three passes: the variable scope,
//! the function environment, the refinement options, and the equality
//! cache. One `Context` lives for the whole pipeline run, so slots
//! registered during inference stay aliased through refinement and
//! checking.

use super::scope::{FunEnv, Scope};
use super::types::TypeEqualityCache;
use super::TypecheckerOptions;

#[derive(Debug, Default)]
pub struct Context {
    pub scope: Scope,
    pub functions: FunEnv,
    pub options: TypecheckerOptions,
    pub cache: TypeEqualityCache,
}

impl Context {
    pub fn with_options(options: TypecheckerOptions) -> Context {
        Context {
            options,
            ..Default::default()
        }
    }
}

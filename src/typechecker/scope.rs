use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use super::types::TypeSlot;

/// Variable metadata held in a frame: the shared type slot (aliasing the
/// annotation on the declaring node) and whether the annotation was
/// inferred. Inferred bindings may widen; explicit ones are strict.
#[derive(Clone, Debug)]
pub struct StoredVariable {
    pub type_id: TypeSlot,
    pub is_inferred: bool,
}

/// A single lexical frame in the scope stack.
#[derive(Clone, Default, Debug)]
struct Frame {
    variables: HashMap<String, StoredVariable>,
}

/// Reference counted mutable pointer to a frame. Cheaply clonable handle;
/// cloning a `Scope` shares its frames.
type StackFrame = Rc<RefCell<Frame>>;

/// Hierarchical lexical scope for variables. The `stacks` vector is
/// innermost-at-the-end; lookups walk from the end backwards. Entries
/// store the same slots as the syntax tree annotations, so sharpening a
/// slot during refinement updates every view at once.
#[derive(Clone, Debug)]
pub struct Scope {
    stacks: Vec<StackFrame>,
}

impl Default for Scope {
    fn default() -> Self {
        Scope {
            stacks: vec![StackFrame::default()],
        }
    }
}

impl Scope {
    pub fn new() -> Scope {
        Self::default()
    }

    /// Push a new empty frame (entering a function body or `for` loop).
    pub fn enter_scope(&mut self) {
        self.stacks.push(StackFrame::default())
    }

    /// Pop the most recent frame.
    pub fn exit_scope(&mut self) {
        self.stacks.pop();
    }

    /// Insert or override a variable binding in the current frame.
    pub fn add_variable(&mut self, name: impl ToString, type_id: TypeSlot, is_inferred: bool) {
        let name = name.to_string();
        if let Some(frame) = self.stacks.last() {
            frame.borrow_mut().variables.insert(
                name,
                StoredVariable {
                    type_id,
                    is_inferred,
                },
            );
        }
    }

    /// Resolve a variable to its shared type slot, walking outward.
    pub fn resolve_name(&self, name: impl ToString) -> Option<TypeSlot> {
        self.resolve_variable(name)
            .map(|StoredVariable { type_id, .. }| type_id)
    }

    /// Resolve a variable binding including its inferredness flag.
    pub fn resolve_variable(&self, name: impl ToString) -> Option<StoredVariable> {
        let name = name.to_string();
        self.stacks
            .iter()
            .rev()
            .find(|frame| frame.borrow().variables.contains_key(&name))
            .and_then(|frame| frame.borrow().variables.get(&name).cloned())
    }
}

/// A registered function signature. The parameter and return slots alias
/// the annotations on the declaring node, so call-site refinement of a
/// parameter is visible inside the function body and vice versa.
#[derive(Clone, Debug)]
pub struct FunctionSignature {
    pub params: Vec<TypeSlot>,
    pub return_type: TypeSlot,
    pub variadic: bool,
}

/// Flat function environment. Functions are registered in a pre-pass so
/// mutual recursion resolves; built-ins are seeded at construction and
/// never refined (they have no declaration in the tree).
#[derive(Clone, Debug, Default)]
pub struct FunEnv {
    functions: HashMap<String, FunctionSignature>,
    declared: HashSet<String>,
}

impl FunEnv {
    pub fn new() -> FunEnv {
        FunEnv::default()
    }

    pub fn add_builtin(&mut self, name: impl ToString, signature: FunctionSignature) {
        self.functions.insert(name.to_string(), signature);
    }

    /// Register a function that has a declaration in the tree. Only these
    /// take part in parameter refinement.
    pub fn add_declared(&mut self, name: impl ToString, signature: FunctionSignature) {
        let name = name.to_string();
        self.declared.insert(name.clone());
        self.functions.insert(name, signature);
    }

    pub fn resolve(&self, name: impl ToString) -> Option<FunctionSignature> {
        self.functions.get(&name.to_string()).cloned()
    }

    pub fn is_declared(&self, name: impl ToString) -> bool {
        self.declared.contains(&name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typechecker::types::Type;

    #[test]
    fn test_new() {
        let scope = Scope::new();
        assert_eq!(scope.stacks.len(), 1);
    }

    #[test]
    fn test_add_variable() {
        let mut scope = Scope::new();
        scope.add_variable("foo", Type::Integer.into_slot(), true);

        let slot = scope.resolve_name("foo").expect("variable not found");
        assert_eq!(*slot.borrow(), Type::Integer);
    }

    #[test]
    fn test_enter_scope() {
        let mut scope = Scope::new();

        scope.enter_scope();
        assert_eq!(scope.stacks.len(), 2);

        scope.add_variable("foo", Type::Integer.into_slot(), true);
        assert!(scope.resolve_name("foo").is_some());

        scope.exit_scope();
        assert!(scope.resolve_name("foo").is_none());
    }

    #[test]
    fn test_shadowing_resolves_innermost() {
        let mut scope = Scope::new();
        scope.add_variable("foo", Type::Integer.into_slot(), true);

        scope.enter_scope();
        scope.add_variable("foo", Type::String.into_slot(), true);
        assert_eq!(
            *scope.resolve_name("foo").unwrap().borrow(),
            Type::String
        );

        scope.exit_scope();
        assert_eq!(
            *scope.resolve_name("foo").unwrap().borrow(),
            Type::Integer
        );
    }

    #[test]
    fn test_shared_slot_values() {
        let mut scope = Scope::new();
        scope.add_variable("foo", Type::weak_slot(), true);

        let first = scope.resolve_name("foo").unwrap();
        let second = scope.resolve_name("foo").unwrap();

        *first.borrow_mut() = Type::Integer;

        assert_eq!(*second.borrow(), Type::Integer);
    }

    #[test]
    fn test_fun_env_declared() {
        let mut env = FunEnv::new();
        env.add_builtin(
            "print",
            FunctionSignature {
                params: vec![Type::Poly.into_slot()],
                return_type: Type::Void.into_slot(),
                variadic: true,
            },
        );
        env.add_declared(
            "add",
            FunctionSignature {
                params: vec![Type::weak_slot(), Type::weak_slot()],
                return_type: Type::weak_slot(),
                variadic: false,
            },
        );

        assert!(env.resolve("print").is_some());
        assert!(!env.is_declared("print"));
        assert!(env.is_declared("add"));
    }
}

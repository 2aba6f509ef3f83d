//! Built-in identifiers and the method tables of the container types.
//!
//! Method signatures are instantiated against the *receiver's* slots:
//! `push` on an `Array<weak>` takes the array's element slot itself as its
//! parameter, so pushing a concrete argument during refinement sharpens
//! the container in place.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::context::Context;
use super::scope::FunctionSignature;
use super::types::{Type, TypeSlot};
use super::TypecheckerOptions;

/// Container kinds reachable through constructor calls (`Map()`,
/// `MinHeap()`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstructorKind {
    Map,
    Set,
    Heap,
    HeapMap,
    Graph,
    BinaryTree,
    AvlTree,
}

static CONSTRUCTORS: Lazy<HashMap<&'static str, ConstructorKind>> = Lazy::new(|| {
    HashMap::from([
        ("Map", ConstructorKind::Map),
        ("Set", ConstructorKind::Set),
        ("MinHeap", ConstructorKind::Heap),
        ("MaxHeap", ConstructorKind::Heap),
        ("MinHeapMap", ConstructorKind::HeapMap),
        ("MaxHeapMap", ConstructorKind::HeapMap),
        ("Graph", ConstructorKind::Graph),
        ("BinaryTree", ConstructorKind::BinaryTree),
        ("AVLTree", ConstructorKind::AvlTree),
    ])
});

pub fn constructor(name: &str) -> Option<ConstructorKind> {
    CONSTRUCTORS.get(name).copied()
}

/// Instantiate the container type a constructor produces, with fresh weak
/// slots for refinement to fill.
pub fn instantiate(kind: ConstructorKind) -> Type {
    match kind {
        ConstructorKind::Map => Type::Map {
            key: Type::weak_slot(),
            value: Type::weak_slot(),
        },
        ConstructorKind::Set => Type::Set(Type::weak_slot()),
        ConstructorKind::Heap => Type::Heap(Type::weak_slot()),
        ConstructorKind::HeapMap => Type::HeapMap {
            key: Type::weak_slot(),
            value: Type::weak_slot(),
        },
        ConstructorKind::Graph => Type::Graph(Type::weak_slot()),
        ConstructorKind::BinaryTree => Type::BinaryTree(Type::weak_slot()),
        ConstructorKind::AvlTree => Type::AvlTree(Type::weak_slot()),
    }
}

fn signature(params: Vec<TypeSlot>, return_type: Type) -> FunctionSignature {
    FunctionSignature {
        params,
        return_type: return_type.into_slot(),
        variadic: false,
    }
}

fn signature_returning_slot(params: Vec<TypeSlot>, return_type: TypeSlot) -> FunctionSignature {
    FunctionSignature {
        params,
        return_type,
        variadic: false,
    }
}

/// Resolve a method on a receiver type. The returned signature shares the
/// receiver's slots wherever the method reads or writes them.
pub fn method_signature(receiver: &Type, method: &str) -> Option<FunctionSignature> {
    match receiver {
        Type::Array(element) => match method {
            "length" => Some(signature(vec![], Type::Integer)),
            "push" => Some(signature(vec![element.clone()], Type::Void)),
            "pop" => Some(signature_returning_slot(vec![], element.clone())),
            _ => None,
        },
        Type::Map { key, value } => match method {
            "size" => Some(signature(vec![], Type::Integer)),
            "get" => Some(signature_returning_slot(vec![key.clone()], value.clone())),
            "set" => Some(signature(vec![key.clone(), value.clone()], Type::Void)),
            "keys" => Some(signature(vec![], Type::Array(key.clone()))),
            "values" => Some(signature(vec![], Type::Array(value.clone()))),
            "entries" => Some(signature(
                vec![],
                Type::Array(Type::Tuple(vec![key.clone(), value.clone()]).into_slot()),
            )),
            "has" => Some(signature(vec![key.clone()], Type::Boolean)),
            "delete" => Some(signature(vec![key.clone()], Type::Void)),
            _ => None,
        },
        Type::Set(element) => match method {
            "size" => Some(signature(vec![], Type::Integer)),
            "add" => Some(signature(vec![element.clone()], Type::Void)),
            "has" => Some(signature(vec![element.clone()], Type::Boolean)),
            "delete" => Some(signature(vec![element.clone()], Type::Void)),
            _ => None,
        },
        Type::Heap(element) => match method {
            "push" => Some(signature(vec![element.clone()], Type::Void)),
            "pop" => Some(signature_returning_slot(vec![], element.clone())),
            "peek" => Some(signature_returning_slot(vec![], element.clone())),
            "size" => Some(signature(vec![], Type::Integer)),
            _ => None,
        },
        Type::HeapMap { key, value } => match method {
            "push" => Some(signature(vec![key.clone(), value.clone()], Type::Void)),
            "pop" => Some(signature_returning_slot(vec![], key.clone())),
            "peek" => Some(signature_returning_slot(vec![], key.clone())),
            "size" => Some(signature(vec![], Type::Integer)),
            _ => None,
        },
        Type::BinaryTree(element) | Type::AvlTree(element) => match method {
            "insert" => Some(signature(vec![element.clone()], Type::Void)),
            "search" => Some(signature(vec![element.clone()], Type::Boolean)),
            "getHeight" => Some(signature(vec![], Type::Integer)),
            _ => None,
        },
        Type::Graph(node) => match method {
            "addVertex" => Some(signature(vec![node.clone()], Type::Void)),
            "addEdge" => Some(signature(
                vec![node.clone(), node.clone(), Type::Integer.into_slot()],
                Type::Void,
            )),
            "getNeighbors" => Some(signature(
                vec![node.clone()],
                Type::Array(
                    Type::Record(vec![
                        ("to".into(), node.clone()),
                        ("weight".into(), Type::Integer.into_slot()),
                    ])
                    .into_slot(),
                ),
            )),
            "hasVertex" => Some(signature(vec![node.clone()], Type::Boolean)),
            "hasEdge" => Some(signature(
                vec![node.clone(), node.clone()],
                Type::Boolean,
            )),
            "size" => Some(signature(vec![], Type::Integer)),
            "isDirected" => Some(signature(vec![], Type::Boolean)),
            "getEdges" => Some(signature(
                vec![],
                Type::Array(
                    Type::Record(vec![
                        ("from".into(), node.clone()),
                        ("to".into(), node.clone()),
                        ("weight".into(), Type::Integer.into_slot()),
                    ])
                    .into_slot(),
                ),
            )),
            "getVertices" => Some(signature(vec![], Type::Array(node.clone()))),
            _ => None,
        },
        _ => None,
    }
}

/// Coarse container shape a method name implies for a receiver whose type
/// is still unknown; used while collecting parameter constraints from
/// function bodies.
pub fn coarse_shape(method: &str, argc: usize) -> Option<Type> {
    match method {
        "addVertex" | "addEdge" | "getNeighbors" | "hasVertex" | "hasEdge" | "isDirected"
        | "getEdges" | "getVertices" => Some(Type::Graph(Type::weak_slot())),
        "set" | "get" | "entries" | "keys" | "values" => Some(Type::Map {
            key: Type::weak_slot(),
            value: Type::weak_slot(),
        }),
        "add" | "has" | "delete" => Some(Type::Set(Type::weak_slot())),
        "push" if argc == 2 => Some(Type::HeapMap {
            key: Type::weak_slot(),
            value: Type::weak_slot(),
        }),
        _ => None,
    }
}

/// Initial environments: the variadic `print`, and the numeric tower
/// constant `inf` typed `int & float` so it participates in arithmetic of
/// either kind.
pub fn setup_context(options: TypecheckerOptions) -> Context {
    let mut ctx = Context::with_options(options);

    ctx.functions.add_builtin(
        "print",
        FunctionSignature {
            params: vec![Type::Poly.into_slot()],
            return_type: Type::Void.into_slot(),
            variadic: true,
        },
    );

    ctx.scope.add_variable(
        "inf",
        Type::Intersection(vec![Type::Integer.into_slot(), Type::Float.into_slot()]).into_slot(),
        false,
    );

    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_lookup() {
        assert_eq!(constructor("Map"), Some(ConstructorKind::Map));
        assert_eq!(constructor("MinHeapMap"), Some(ConstructorKind::HeapMap));
        assert_eq!(constructor("lowercase"), None);
    }

    #[test]
    fn test_push_parameter_aliases_element_slot() {
        let array = instantiate_array();
        let Type::Array(element) = &array else {
            unreachable!()
        };

        let push = method_signature(&array, "push").expect("push not found");
        *push.params[0].borrow_mut() = Type::Integer;

        assert_eq!(*element.borrow(), Type::Integer);
    }

    fn instantiate_array() -> Type {
        Type::Array(Type::weak_slot())
    }

    #[test]
    fn test_heapmap_pop_returns_key() {
        let heapmap = instantiate(ConstructorKind::HeapMap);
        let Type::HeapMap { key, .. } = &heapmap else {
            unreachable!()
        };
        *key.borrow_mut() = Type::Integer;

        let pop = method_signature(&heapmap, "pop").expect("pop not found");
        assert_eq!(*pop.return_type.borrow(), Type::Integer);
    }

    #[test]
    fn test_get_neighbors_shares_node_slot() {
        let graph = instantiate(ConstructorKind::Graph);
        let Type::Graph(node) = &graph else {
            unreachable!()
        };

        let neighbors = method_signature(&graph, "getNeighbors").expect("getNeighbors not found");
        *node.borrow_mut() = Type::String;

        assert_eq!(
            neighbors.return_type.borrow().to_string(),
            "Array<{ to: string, weight: int }>"
        );
    }

    #[test]
    fn test_setup_context_seeds() {
        let ctx = setup_context(TypecheckerOptions::default());
        assert!(ctx.functions.resolve("print").is_some());
        let inf = ctx.scope.resolve_name("inf").expect("inf not seeded");
        assert_eq!(inf.borrow().to_string(), "int & float");
    }
}

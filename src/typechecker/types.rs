//! Semantic type representation. Every child position of a structured
//! type (container element/key/value slots, tuple members, record fields,
//! function parameters and returns, union/intersection members) is a
//! shared mutable [`TypeSlot`]. The refinement pass sharpens a slot by
//! writing through the handle, so every alias of that slot — other types,
//! environment entries, annotations on the syntax tree — observes the
//! update at once without being rewritten itself.

use std::{cell::RefCell, collections::HashMap, fmt::Display, rc::Rc};

/// Shared mutable handle to a type. Cheap to clone; cloning shares the
/// underlying node.
pub type TypeSlot = Rc<RefCell<Type>>;

#[derive(Clone)]
pub enum Type {
    /// 64-bit signed integer primitive
    Integer,
    /// 64-bit IEEE 754 floating point primitive
    Float,
    /// Immutable string value
    String,
    /// Boolean truth value primitive
    Boolean,
    /// Unit type of functions that do not return a value; not a value type
    Void,
    /// Unknown placeholder; unifies with any concrete type on first observation
    Weak,
    /// Polymorphic placeholder used in built-in signatures, refined like `Weak`
    Poly,
    /// Statically unknown; admits any operation and defers to the runtime
    Dynamic,
    /// Infinite integer range iterable
    Range,
    /// Opaque refinement-predicate value
    Predicate,
    /// Ordered homogeneous sequence
    Array(TypeSlot),
    /// Unordered collection of unique elements
    Set(TypeSlot),
    /// Priority queue
    Heap(TypeSlot),
    /// Binary search tree
    BinaryTree(TypeSlot),
    /// Self-balancing binary search tree
    AvlTree(TypeSlot),
    /// Graph over vertices of the node type; edge weights are `int`
    Graph(TypeSlot),
    /// Unique keys, no ordering
    Map { key: TypeSlot, value: TypeSlot },
    /// Priority queue where the key is the priority and the value the payload
    HeapMap { key: TypeSlot, value: TypeSlot },
    /// Positional product type
    Tuple(Vec<TypeSlot>),
    /// Named fields in declaration order; order is not part of equality
    Record(Vec<(String, TypeSlot)>),
    /// Function signature
    Function {
        params: Vec<TypeSlot>,
        return_type: TypeSlot,
        variadic: bool,
    },
    /// Inclusive disjunction; member order is not semantic
    Union(Vec<TypeSlot>),
    /// Conjunction; member order is not semantic
    Intersection(Vec<TypeSlot>),
}

impl Type {
    pub fn into_slot(self) -> TypeSlot {
        Rc::new(RefCell::new(self))
    }

    pub fn weak_slot() -> TypeSlot {
        Type::Weak.into_slot()
    }

    /// True for the unresolved placeholders that refinement may overwrite.
    pub fn is_weak(&self) -> bool {
        matches!(self, Type::Weak | Type::Poly)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Integer | Type::Float)
    }

    /// The weakness test used by the checker: a `weak`/`poly` anywhere
    /// inside the type, including union members and nested slots, makes
    /// the whole type weak.
    pub fn contains_weak(&self) -> bool {
        match self {
            Type::Weak | Type::Poly => true,
            _ => self
                .child_slots()
                .iter()
                .any(|slot| slot.borrow().contains_weak()),
        }
    }

    /// All directly embedded slots of this type.
    pub(crate) fn child_slots(&self) -> Vec<TypeSlot> {
        match self {
            Type::Array(inner)
            | Type::Set(inner)
            | Type::Heap(inner)
            | Type::BinaryTree(inner)
            | Type::AvlTree(inner)
            | Type::Graph(inner) => vec![inner.clone()],
            Type::Map { key, value } | Type::HeapMap { key, value } => {
                vec![key.clone(), value.clone()]
            }
            Type::Tuple(members) => members.clone(),
            Type::Record(fields) => fields.iter().map(|(_, slot)| slot.clone()).collect(),
            Type::Function {
                params,
                return_type,
                ..
            } => {
                let mut slots = params.clone();
                slots.push(return_type.clone());
                slots
            }
            Type::Union(members) | Type::Intersection(members) => members.clone(),
            _ => vec![],
        }
    }

    /// Union members with directly nested unions flattened out.
    pub(crate) fn union_members(members: &[TypeSlot]) -> Vec<Type> {
        let mut flattened = vec![];
        for member in members {
            match &*member.borrow() {
                Type::Union(inner) => flattened.extend(Self::union_members(inner)),
                other => flattened.push(other.clone()),
            }
        }
        flattened
    }

    fn intersection_members(members: &[TypeSlot]) -> Vec<Type> {
        let mut flattened = vec![];
        for member in members {
            match &*member.borrow() {
                Type::Intersection(inner) => flattened.extend(Self::intersection_members(inner)),
                other => flattened.push(other.clone()),
            }
        }
        flattened
    }

    /// Structural semantic equality.
    ///
    /// - union/intersection members compare as multisets after flattening
    ///   directly nested unions (resp. intersections)
    /// - record fields compare by name, ignoring declaration order
    /// - everything else compares structurally through its slots
    pub fn does_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Array(l), Type::Array(r))
            | (Type::Set(l), Type::Set(r))
            | (Type::Heap(l), Type::Heap(r))
            | (Type::BinaryTree(l), Type::BinaryTree(r))
            | (Type::AvlTree(l), Type::AvlTree(r))
            | (Type::Graph(l), Type::Graph(r)) => slot_eq(l, r),
            (
                Type::Map {
                    key: lk,
                    value: lv,
                },
                Type::Map {
                    key: rk,
                    value: rv,
                },
            )
            | (
                Type::HeapMap {
                    key: lk,
                    value: lv,
                },
                Type::HeapMap {
                    key: rk,
                    value: rv,
                },
            ) => slot_eq(lk, rk) && slot_eq(lv, rv),
            (Type::Tuple(l), Type::Tuple(r)) => {
                l.len() == r.len() && l.iter().zip(r.iter()).all(|(a, b)| slot_eq(a, b))
            }
            (Type::Record(l), Type::Record(r)) => {
                l.len() == r.len()
                    && l.iter().all(|(name, slot)| {
                        r.iter()
                            .any(|(other_name, other_slot)| {
                                name == other_name && slot_eq(slot, other_slot)
                            })
                    })
            }
            (
                Type::Function {
                    params: l_params,
                    return_type: l_return,
                    variadic: l_variadic,
                },
                Type::Function {
                    params: r_params,
                    return_type: r_return,
                    variadic: r_variadic,
                },
            ) => {
                l_variadic == r_variadic
                    && l_params.len() == r_params.len()
                    && l_params
                        .iter()
                        .zip(r_params.iter())
                        .all(|(a, b)| slot_eq(a, b))
                    && slot_eq(l_return, r_return)
            }
            (Type::Union(l), Type::Union(r)) => {
                same_members(&Type::union_members(l), &Type::union_members(r))
            }
            (Type::Intersection(l), Type::Intersection(r)) => {
                same_members(&Type::intersection_members(l), &Type::intersection_members(r))
            }
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }

    /// Canonical rendering used as an equality cache key: like `Display`,
    /// but with union/intersection members sorted so permutations map to
    /// the same key.
    pub fn canonical_key(&self) -> String {
        match self {
            Type::Union(members) => {
                let mut keys: Vec<String> = Type::union_members(members)
                    .iter()
                    .map(Type::canonical_key)
                    .collect();
                keys.sort();
                keys.dedup();
                keys.join(" | ")
            }
            Type::Intersection(members) => {
                let mut keys: Vec<String> = Type::intersection_members(members)
                    .iter()
                    .map(Type::canonical_key)
                    .collect();
                keys.sort();
                keys.dedup();
                keys.join(" & ")
            }
            Type::Array(inner) => format!("Array<{}>", inner.borrow().canonical_key()),
            Type::Set(inner) => format!("Set<{}>", inner.borrow().canonical_key()),
            Type::Heap(inner) => format!("Heap<{}>", inner.borrow().canonical_key()),
            Type::BinaryTree(inner) => format!("BinaryTree<{}>", inner.borrow().canonical_key()),
            Type::AvlTree(inner) => format!("AVLTree<{}>", inner.borrow().canonical_key()),
            Type::Graph(inner) => format!("Graph<{}>", inner.borrow().canonical_key()),
            Type::Map { key, value } => format!(
                "Map<{}, {}>",
                key.borrow().canonical_key(),
                value.borrow().canonical_key()
            ),
            Type::HeapMap { key, value } => format!(
                "HeapMap<{}, {}>",
                key.borrow().canonical_key(),
                value.borrow().canonical_key()
            ),
            Type::Tuple(members) => format!(
                "Tuple<{}>",
                members
                    .iter()
                    .map(|member| member.borrow().canonical_key())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Type::Record(fields) => {
                let mut rendered: Vec<String> = fields
                    .iter()
                    .map(|(name, slot)| format!("{name}: {}", slot.borrow().canonical_key()))
                    .collect();
                rendered.sort();
                format!("{{ {} }}", rendered.join(", "))
            }
            Type::Function {
                params,
                return_type,
                variadic,
            } => format!(
                "({}{}) -> {}",
                params
                    .iter()
                    .map(|param| param.borrow().canonical_key())
                    .collect::<Vec<_>>()
                    .join(", "),
                if *variadic { ", ..." } else { "" },
                return_type.borrow().canonical_key()
            ),
            other => other.to_string(),
        }
    }
}

fn slot_eq(left: &TypeSlot, right: &TypeSlot) -> bool {
    Rc::ptr_eq(left, right) || left.borrow().does_eq(&right.borrow())
}

/// Multiset comparison: every member of each side must have an equal
/// counterpart on the other. Duplicates collapse, so `{int, int}` and
/// `{int}` compare equal.
fn same_members(left: &[Type], right: &[Type]) -> bool {
    left.iter().all(|l| right.iter().any(|r| l.does_eq(r)))
        && right.iter().all(|r| left.iter().any(|l| r.does_eq(l)))
}

/// Whether `ty` embeds `slot` anywhere. Sharpening guards on this so a
/// slot is never written into itself.
pub(crate) fn occurs_in(slot: &TypeSlot, ty: &Type) -> bool {
    ty.child_slots().iter().any(|child| {
        Rc::ptr_eq(child, slot) || occurs_in(slot, &child.borrow())
    })
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.does_eq(other)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Integer => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::String => write!(f, "string"),
            Type::Boolean => write!(f, "boolean"),
            Type::Void => write!(f, "void"),
            Type::Weak => write!(f, "weak"),
            Type::Poly => write!(f, "poly"),
            Type::Dynamic => write!(f, "dynamic"),
            Type::Range => write!(f, "range"),
            Type::Predicate => write!(f, "predicate"),
            Type::Array(inner) => write!(f, "Array<{}>", inner.borrow()),
            Type::Set(inner) => write!(f, "Set<{}>", inner.borrow()),
            Type::Heap(inner) => write!(f, "Heap<{}>", inner.borrow()),
            Type::BinaryTree(inner) => write!(f, "BinaryTree<{}>", inner.borrow()),
            Type::AvlTree(inner) => write!(f, "AVLTree<{}>", inner.borrow()),
            Type::Graph(inner) => write!(f, "Graph<{}>", inner.borrow()),
            Type::Map { key, value } => write!(f, "Map<{}, {}>", key.borrow(), value.borrow()),
            Type::HeapMap { key, value } => {
                write!(f, "HeapMap<{}, {}>", key.borrow(), value.borrow())
            }
            Type::Tuple(members) => write!(
                f,
                "Tuple<{}>",
                members
                    .iter()
                    .map(|member| member.borrow().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Type::Record(fields) => write!(
                f,
                "{{ {} }}",
                fields
                    .iter()
                    .map(|(name, slot)| format!("{name}: {}", slot.borrow()))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Type::Function {
                params,
                return_type,
                variadic,
            } => write!(
                f,
                "({}{}) -> {}",
                params
                    .iter()
                    .map(|param| param.borrow().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
                if *variadic { ", ..." } else { "" },
                return_type.borrow()
            ),
            Type::Union(members) => write!(
                f,
                "{}",
                Type::union_members(members)
                    .iter()
                    .map(Type::to_string)
                    .collect::<Vec<_>>()
                    .join(" | ")
            ),
            Type::Intersection(members) => write!(
                f,
                "{}",
                members
                    .iter()
                    .map(|member| member.borrow().to_string())
                    .collect::<Vec<_>>()
                    .join(" & ")
            ),
        }
    }
}

impl std::fmt::Debug for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// Memoized structural equality. Keys are the canonical renderings of
/// both operands; the cache must be cleared at every refinement pass
/// boundary because slot mutation changes equality outcomes.
#[derive(Debug, Default)]
pub struct TypeEqualityCache {
    entries: HashMap<(String, String), bool>,
}

impl TypeEqualityCache {
    pub fn new() -> TypeEqualityCache {
        TypeEqualityCache::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn equal(&mut self, left: &Type, right: &Type) -> bool {
        let key = (left.canonical_key(), right.canonical_key());
        if let Some(known) = self.entries.get(&key) {
            return *known;
        }
        let result = left.does_eq(right);
        self.entries.insert(key, result);
        result
    }
}

/// Assignment compatibility: structural equality widened by the lattice
/// affordances the checker grants.
///
/// - `dynamic` is compatible in either direction
/// - a type still containing `weak`/`poly` is compatible with anything
///   (unresolved slots mean no use site ever constrained them)
/// - a value of a member type may flow into a declared union
/// - an intersection value may flow wherever one of its members may
pub fn compatible(cache: &mut TypeEqualityCache, expected: &Type, actual: &Type) -> bool {
    if cache.equal(expected, actual) {
        return true;
    }
    if matches!(expected, Type::Dynamic) || matches!(actual, Type::Dynamic) {
        return true;
    }
    if expected.contains_weak() || actual.contains_weak() {
        return true;
    }
    if let Type::Union(members) = expected {
        if Type::union_members(members)
            .iter()
            .any(|member| compatible(cache, member, actual))
        {
            return true;
        }
    }
    if let Type::Intersection(members) = actual {
        if members
            .iter()
            .any(|member| compatible(cache, expected, &member.borrow()))
        {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_equality() {
        assert_eq!(Type::Integer, Type::Integer);
        assert_ne!(Type::Integer, Type::Float);
        assert_ne!(Type::Weak, Type::Integer);
        assert_eq!(Type::Weak, Type::Weak);
    }

    #[test]
    fn test_container_equality() {
        assert_eq!(
            Type::Array(Type::Integer.into_slot()),
            Type::Array(Type::Integer.into_slot())
        );
        assert_ne!(
            Type::Array(Type::Integer.into_slot()),
            Type::Set(Type::Integer.into_slot())
        );
        assert_ne!(
            Type::Map {
                key: Type::String.into_slot(),
                value: Type::Integer.into_slot()
            },
            Type::Map {
                key: Type::String.into_slot(),
                value: Type::Boolean.into_slot()
            }
        );
    }

    #[test]
    fn test_union_permutation_equality() {
        let left = Type::Union(vec![Type::Integer.into_slot(), Type::Boolean.into_slot()]);
        let right = Type::Union(vec![Type::Boolean.into_slot(), Type::Integer.into_slot()]);
        assert_eq!(left, right);
    }

    #[test]
    fn test_nested_union_flattening() {
        let nested = Type::Union(vec![
            Type::Integer.into_slot(),
            Type::Union(vec![Type::Boolean.into_slot(), Type::String.into_slot()]).into_slot(),
        ]);
        let flat = Type::Union(vec![
            Type::String.into_slot(),
            Type::Boolean.into_slot(),
            Type::Integer.into_slot(),
        ]);
        assert_eq!(nested, flat);
    }

    #[test]
    fn test_record_field_order_irrelevant() {
        let left = Type::Record(vec![
            ("to".into(), Type::Integer.into_slot()),
            ("weight".into(), Type::Integer.into_slot()),
        ]);
        let right = Type::Record(vec![
            ("weight".into(), Type::Integer.into_slot()),
            ("to".into(), Type::Integer.into_slot()),
        ]);
        assert_eq!(left, right);
    }

    #[test]
    fn test_sharpening_updates_aliases() {
        let element = Type::weak_slot();
        let array = Type::Array(element.clone());
        assert!(array.contains_weak());

        *element.borrow_mut() = Type::Integer;

        assert!(!array.contains_weak());
        assert_eq!(array, Type::Array(Type::Integer.into_slot()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::Array(Type::Integer.into_slot()).to_string(), "Array<int>");
        assert_eq!(
            Type::Map {
                key: Type::String.into_slot(),
                value: Type::Union(vec![
                    Type::Integer.into_slot(),
                    Type::Boolean.into_slot()
                ])
                .into_slot(),
            }
            .to_string(),
            "Map<string, int | boolean>"
        );
        assert_eq!(
            Type::Function {
                params: vec![Type::Poly.into_slot()],
                return_type: Type::Void.into_slot(),
                variadic: true,
            }
            .to_string(),
            "(poly, ...) -> void"
        );
    }

    #[test]
    fn test_canonical_key_sorts_members() {
        let left = Type::Union(vec![Type::Integer.into_slot(), Type::Boolean.into_slot()]);
        let right = Type::Union(vec![Type::Boolean.into_slot(), Type::Integer.into_slot()]);
        assert_eq!(left.canonical_key(), right.canonical_key());
    }

    #[test]
    fn test_cache_tracks_mutation_between_clears() {
        let mut cache = TypeEqualityCache::new();
        let element = Type::weak_slot();
        let array = Type::Array(element.clone());

        assert!(!cache.equal(&array, &Type::Array(Type::Integer.into_slot())));

        *element.borrow_mut() = Type::Integer;
        cache.clear();

        assert!(cache.equal(&array, &Type::Array(Type::Integer.into_slot())));
    }

    #[test]
    fn test_compatibility() {
        let mut cache = TypeEqualityCache::new();

        // weak accepts anything
        assert!(compatible(&mut cache, &Type::Weak, &Type::Integer));
        assert!(compatible(
            &mut cache,
            &Type::Array(Type::weak_slot()),
            &Type::Array(Type::Integer.into_slot())
        ));

        // unions accept their members
        let union = Type::Union(vec![Type::Integer.into_slot(), Type::Boolean.into_slot()]);
        assert!(compatible(&mut cache, &union, &Type::Boolean));
        assert!(!compatible(&mut cache, &union, &Type::String));

        // the numeric tower flows into both of its members
        let inf = Type::Intersection(vec![Type::Integer.into_slot(), Type::Float.into_slot()]);
        assert!(compatible(&mut cache, &Type::Integer, &inf));
        assert!(compatible(&mut cache, &Type::Float, &inf));

        assert!(!compatible(&mut cache, &Type::Integer, &Type::Float));
    }
}

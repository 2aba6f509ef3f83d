//! Conversion between syntactic [`TypeAnnotation`] trees and semantic
//! [`Type`]s. Resolution builds fresh slots; the reverse direction is used
//! by the refiner to write sharpened types back onto declaring nodes.

use crate::ast::{AnnotationKind, Span, TypeAnnotation};

use super::error::{AnnotationError, TypeCheckError, UndefinedType};
use super::types::Type;

/// Resolve an annotation into a type with fresh slots. `position` is the
/// declaring node's span, used for unknown-name errors; the container
/// arity messages are fixed strings without coordinates.
pub fn resolve(annotation: &TypeAnnotation, position: &Span) -> Result<Type, TypeCheckError> {
    match &annotation.kind {
        AnnotationKind::Simple { name } => match name.as_str() {
            "int" => Ok(Type::Integer),
            "float" => Ok(Type::Float),
            "string" => Ok(Type::String),
            "boolean" => Ok(Type::Boolean),
            "void" => Ok(Type::Void),
            "range" => Ok(Type::Range),
            "dynamic" => Ok(Type::Dynamic),
            "predicate" => Ok(Type::Predicate),
            "weak" => Ok(Type::Weak),
            "poly" => Ok(Type::Poly),
            name => Err(TypeCheckError::UndefinedType(
                UndefinedType {
                    type_name: name.to_string(),
                },
                position.clone(),
            )),
        },
        AnnotationKind::Generic { name, parameters } => {
            resolve_generic(name, parameters, position)
        }
        AnnotationKind::Union { types } => {
            let mut members = vec![];
            for member in types {
                members.push(resolve(member, position)?.into_slot());
            }
            Ok(Type::Union(members))
        }
        AnnotationKind::Intersection { types } => {
            let mut members = vec![];
            for member in types {
                members.push(resolve(member, position)?.into_slot());
            }
            Ok(Type::Intersection(members))
        }
        AnnotationKind::Record { fields } => {
            let mut resolved = vec![];
            for (name, field) in fields {
                resolved.push((name.clone(), resolve(field, position)?.into_slot()));
            }
            Ok(Type::Record(resolved))
        }
    }
}

fn resolve_generic(
    name: &str,
    parameters: &[TypeAnnotation],
    position: &Span,
) -> Result<Type, TypeCheckError> {
    let arity = |expected: usize, message: &str| -> Result<(), TypeCheckError> {
        if parameters.len() != expected {
            return Err(TypeCheckError::Annotation(AnnotationError {
                message: message.to_string(),
            }));
        }
        Ok(())
    };

    match name {
        "Array" => {
            arity(1, "Array type requires exactly one type parameter")?;
            Ok(Type::Array(resolve(&parameters[0], position)?.into_slot()))
        }
        "Set" => {
            arity(1, "Set type requires exactly one type parameter")?;
            Ok(Type::Set(resolve(&parameters[0], position)?.into_slot()))
        }
        "Map" => {
            arity(2, "Map type requires exactly two type parameters")?;
            Ok(Type::Map {
                key: resolve(&parameters[0], position)?.into_slot(),
                value: resolve(&parameters[1], position)?.into_slot(),
            })
        }
        "Heap" | "MinHeap" | "MaxHeap" => {
            arity(1, "Heap type requires exactly one type parameter")?;
            Ok(Type::Heap(resolve(&parameters[0], position)?.into_slot()))
        }
        "HeapMap" | "MinHeapMap" | "MaxHeapMap" => {
            arity(2, "HeapMap type requires exactly two type parameters")?;
            Ok(Type::HeapMap {
                key: resolve(&parameters[0], position)?.into_slot(),
                value: resolve(&parameters[1], position)?.into_slot(),
            })
        }
        "Graph" => {
            arity(1, "Graph type requires exactly one type parameter")?;
            Ok(Type::Graph(resolve(&parameters[0], position)?.into_slot()))
        }
        "BinaryTree" => {
            arity(1, "BinaryTree type requires exactly one type parameter")?;
            Ok(Type::BinaryTree(
                resolve(&parameters[0], position)?.into_slot(),
            ))
        }
        "AVLTree" => {
            arity(1, "AVLTree type requires exactly one type parameter")?;
            Ok(Type::AvlTree(resolve(&parameters[0], position)?.into_slot()))
        }
        "Tuple" => {
            let mut members = vec![];
            for member in parameters {
                members.push(resolve(member, position)?.into_slot());
            }
            Ok(Type::Tuple(members))
        }
        name => Err(TypeCheckError::UndefinedType(
            UndefinedType {
                type_name: name.to_string(),
            },
            position.clone(),
        )),
    }
}

/// Render a semantic type back into annotation syntax. Inverse of
/// [`resolve`] for every type that can legally appear on a declaring node.
pub fn from_type(ty: &Type) -> TypeAnnotation {
    match ty {
        Type::Integer => TypeAnnotation::simple("int"),
        Type::Float => TypeAnnotation::simple("float"),
        Type::String => TypeAnnotation::simple("string"),
        Type::Boolean => TypeAnnotation::simple("boolean"),
        Type::Void => TypeAnnotation::simple("void"),
        Type::Range => TypeAnnotation::simple("range"),
        Type::Dynamic => TypeAnnotation::simple("dynamic"),
        Type::Predicate => TypeAnnotation::simple("predicate"),
        Type::Weak => TypeAnnotation::simple("weak"),
        Type::Poly => TypeAnnotation::simple("poly"),
        Type::Array(inner) => TypeAnnotation::generic("Array", vec![from_type(&inner.borrow())]),
        Type::Set(inner) => TypeAnnotation::generic("Set", vec![from_type(&inner.borrow())]),
        Type::Heap(inner) => TypeAnnotation::generic("Heap", vec![from_type(&inner.borrow())]),
        Type::BinaryTree(inner) => {
            TypeAnnotation::generic("BinaryTree", vec![from_type(&inner.borrow())])
        }
        Type::AvlTree(inner) => {
            TypeAnnotation::generic("AVLTree", vec![from_type(&inner.borrow())])
        }
        Type::Graph(inner) => TypeAnnotation::generic("Graph", vec![from_type(&inner.borrow())]),
        Type::Map { key, value } => TypeAnnotation::generic(
            "Map",
            vec![from_type(&key.borrow()), from_type(&value.borrow())],
        ),
        Type::HeapMap { key, value } => TypeAnnotation::generic(
            "HeapMap",
            vec![from_type(&key.borrow()), from_type(&value.borrow())],
        ),
        Type::Tuple(members) => TypeAnnotation::generic(
            "Tuple",
            members
                .iter()
                .map(|member| from_type(&member.borrow()))
                .collect(),
        ),
        Type::Record(fields) => TypeAnnotation {
            kind: AnnotationKind::Record {
                fields: fields
                    .iter()
                    .map(|(name, slot)| (name.clone(), from_type(&slot.borrow())))
                    .collect(),
            },
            is_inferred: false,
        },
        Type::Union(members) => TypeAnnotation::union(
            Type::union_members(members).iter().map(from_type).collect(),
        ),
        Type::Intersection(members) => TypeAnnotation {
            kind: AnnotationKind::Intersection {
                types: members
                    .iter()
                    .map(|member| from_type(&member.borrow()))
                    .collect(),
            },
            is_inferred: false,
        },
        // function values cannot be named in annotation syntax
        Type::Function { .. } => TypeAnnotation::simple("weak"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_resolution() {
        let annotation = TypeAnnotation::simple("int");
        assert_eq!(
            resolve(&annotation, &Span::default()),
            Ok(Type::Integer)
        );
    }

    #[test]
    fn test_generic_resolution() {
        let annotation = TypeAnnotation::generic(
            "Map",
            vec![TypeAnnotation::simple("string"), TypeAnnotation::simple("int")],
        );
        let resolved = resolve(&annotation, &Span::default()).unwrap();
        assert_eq!(resolved.to_string(), "Map<string, int>");
    }

    #[test]
    fn test_heapmap_arity_message_is_exact() {
        let annotation = TypeAnnotation::generic("MinHeapMap", vec![TypeAnnotation::simple("int")]);
        let error = resolve(&annotation, &Span::default()).unwrap_err();
        assert_eq!(
            error.to_string(),
            "HeapMap type requires exactly two type parameters"
        );
    }

    #[test]
    fn test_heap_and_graph_arity_messages() {
        let heap = TypeAnnotation::generic("MinHeap", vec![]);
        assert_eq!(
            resolve(&heap, &Span::default()).unwrap_err().to_string(),
            "Heap type requires exactly one type parameter"
        );

        let graph = TypeAnnotation::generic(
            "Graph",
            vec![TypeAnnotation::simple("int"), TypeAnnotation::simple("int")],
        );
        assert_eq!(
            resolve(&graph, &Span::default()).unwrap_err().to_string(),
            "Graph type requires exactly one type parameter"
        );
    }

    #[test]
    fn test_unknown_type_name() {
        let annotation = TypeAnnotation::simple("Foo");
        let error = resolve(&annotation, &Span::default()).unwrap_err();
        assert!(error.to_string().starts_with("Type checking: undefined type 'Foo'"));
    }

    #[test]
    fn test_union_round_trip() {
        let annotation = TypeAnnotation::union(vec![
            TypeAnnotation::simple("int"),
            TypeAnnotation::simple("boolean"),
        ]);
        let resolved = resolve(&annotation, &Span::default()).unwrap();
        assert_eq!(from_type(&resolved), annotation);
    }
}

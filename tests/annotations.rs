//! Annotation resolution, strictness, and the JSON program interface.

use std::error::Error;

use mira_lang::ast::{Program, TypeAnnotation};
use mira_lang::typechecker::Typechecker;
use serde_json::json;
use test_utils::*;

#[test]
fn heapmap_annotation_arity_message_is_exact() {
    // let m: MinHeapMap<int> = MinHeapMap()
    let mut program = program(vec![let_annotated(
        "m",
        TypeAnnotation::generic("MinHeapMap", vec![TypeAnnotation::simple("int")]),
        call("MinHeapMap", vec![]),
    )]);

    let error = Typechecker::new().check(&mut program).unwrap_err();
    assert_eq!(
        error.to_string(),
        "HeapMap type requires exactly two type parameters"
    );
}

#[test]
fn heap_and_graph_annotation_arity_messages_are_exact() {
    let mut heap = program(vec![let_annotated(
        "h",
        TypeAnnotation::generic("MinHeap", vec![]),
        call("MinHeap", vec![]),
    )]);
    assert_eq!(
        Typechecker::new().check(&mut heap).unwrap_err().to_string(),
        "Heap type requires exactly one type parameter"
    );

    let mut graph = program(vec![let_annotated(
        "g",
        TypeAnnotation::generic(
            "Graph",
            vec![TypeAnnotation::simple("int"), TypeAnnotation::simple("int")],
        ),
        call("Graph", vec![boolean(true)]),
    )]);
    assert_eq!(
        Typechecker::new().check(&mut graph).unwrap_err().to_string(),
        "Graph type requires exactly one type parameter"
    );
}

#[test]
fn float_does_not_flow_into_int() {
    // let x: int = 1.5
    let mut program = program(vec![let_annotated(
        "x",
        TypeAnnotation::simple("int"),
        float(1.5),
    )]);

    let error = Typechecker::new().check(&mut program).unwrap_err();
    assert!(error.to_string().starts_with("Type mismatch"));
}

#[test]
fn strict_annotation_gates_later_assignments() {
    // let x: int = 1; x = 2.5
    let mut program = program(vec![
        let_annotated("x", TypeAnnotation::simple("int"), int(1)),
        assign(ident("x"), float(2.5)),
    ]);

    let error = Typechecker::new().check(&mut program).unwrap_err();
    assert!(error.to_string().starts_with("Type mismatch"));
}

#[test]
fn inferred_bindings_accept_matching_assignments() -> Result<(), Box<dyn Error>> {
    let mut program = program(vec![
        let_stmt("x", int(1)),
        assign(ident("x"), int(2)),
    ]);

    Typechecker::new().check(&mut program)?;
    Ok(())
}

#[test]
fn union_annotation_accepts_members() -> Result<(), Box<dyn Error>> {
    // let x: int | boolean = 1; x = true
    let mut program = program(vec![
        let_annotated(
            "x",
            TypeAnnotation::union(vec![
                TypeAnnotation::simple("int"),
                TypeAnnotation::simple("boolean"),
            ]),
            int(1),
        ),
        assign(ident("x"), boolean(true)),
    ]);

    Typechecker::new().check(&mut program)?;
    Ok(())
}

#[test]
fn inf_flows_into_both_numeric_types() -> Result<(), Box<dyn Error>> {
    // let best: int = inf; let eps: float = inf
    let mut program = program(vec![
        let_annotated("best", TypeAnnotation::simple("int"), ident("inf")),
        let_annotated("eps", TypeAnnotation::simple("float"), ident("inf")),
    ]);

    Typechecker::new().check(&mut program)?;
    Ok(())
}

#[test]
fn unknown_type_name_is_rejected() {
    let mut program = program(vec![let_annotated(
        "x",
        TypeAnnotation::simple("Foo"),
        int(1),
    )]);

    let error = Typechecker::new().check(&mut program).unwrap_err();
    assert!(error
        .to_string()
        .starts_with("Type checking: undefined type 'Foo'"));
}

#[test]
fn programs_round_trip_through_json() -> Result<(), Box<dyn Error>> {
    let span = json!({ "start": [0, 0], "end": [0, 0] });
    let tree = json!({
        "statements": [
            {
                "VariableDeclaration": {
                    "declarations": [
                        {
                            "name": { "name": "x", "position": span },
                            "typeAnnotation": { "kind": "simple", "name": "int" },
                            "initializer": { "Num": { "Integer": [42, span] } },
                            "position": span
                        }
                    ],
                    "position": span
                }
            }
        ]
    });

    let mut program: Program = serde_json::from_value(tree)?;
    Typechecker::new().check(&mut program)?;

    // inferred annotations written by the checker survive serialization
    let dumped = serde_json::to_string(&program)?;
    let reparsed: Program = serde_json::from_str(&dumped)?;
    assert_eq!(dumped, serde_json::to_string(&reparsed)?);

    Ok(())
}

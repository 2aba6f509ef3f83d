//! Container slot refinement: strict mismatches vs union widening.

use std::error::Error;

use mira_lang::ast::TypeAnnotation;
use mira_lang::typechecker::{Typechecker, TypecheckerOptions};
use test_utils::*;

fn union_checker() -> Typechecker {
    Typechecker::with_options(TypecheckerOptions {
        union_widening: true,
    })
}

#[test]
fn map_slots_fill_from_first_insertion() -> Result<(), Box<dyn Error>> {
    let mut program = program(vec![
        let_stmt("m", call("Map", vec![])),
        expr_stmt(method_call(ident("m"), "set", vec![string("a"), int(1)])),
    ]);

    Typechecker::new().check(&mut program)?;

    assert_eq!(declared_type(&program.statements[0]), "Map<string, int>");
    Ok(())
}

#[test]
fn strict_mode_rejects_heterogeneous_insertions() {
    // m.set("a", 1); m.set("b", "x") — the value slot stays int and the
    // second insertion is a mismatch
    let mut program = program(vec![
        let_stmt("m", call("Map", vec![])),
        expr_stmt(method_call(ident("m"), "set", vec![string("a"), int(1)])),
        expr_stmt(method_call(ident("m"), "set", vec![string("b"), string("x")])),
    ]);

    let error = Typechecker::new().check(&mut program).unwrap_err();
    assert!(error.to_string().starts_with("Type mismatch"));
}

#[test]
fn union_mode_widens_disagreeing_value_slot() -> Result<(), Box<dyn Error>> {
    let mut program = program(vec![
        let_stmt("m", call("Map", vec![])),
        expr_stmt(method_call(ident("m"), "set", vec![string("a"), int(1)])),
        expr_stmt(method_call(ident("m"), "set", vec![string("b"), boolean(true)])),
    ]);

    union_checker().check(&mut program)?;

    assert_eq!(
        declared_type(&program.statements[0]),
        "Map<string, int | boolean>"
    );
    Ok(())
}

#[test]
fn annotated_map_rejects_wrong_key() {
    // let m: Map<string, int> = Map(); m.set(1, 2)
    let mut program = program(vec![
        let_annotated(
            "m",
            TypeAnnotation::generic(
                "Map",
                vec![
                    TypeAnnotation::simple("string"),
                    TypeAnnotation::simple("int"),
                ],
            ),
            call("Map", vec![]),
        ),
        expr_stmt(method_call(ident("m"), "set", vec![int(1), int(2)])),
    ]);

    let error = Typechecker::new().check(&mut program).unwrap_err();
    assert!(error.to_string().starts_with("Type mismatch"));
}

#[test]
fn heapmap_priority_is_the_key() -> Result<(), Box<dyn Error>> {
    // hm.push(3, "task"); let next = hm.pop() — pop returns the key
    let mut program = program(vec![
        let_stmt("hm", call("MinHeapMap", vec![])),
        expr_stmt(method_call(ident("hm"), "push", vec![int(3), string("task")])),
        let_stmt("next", method_call(ident("hm"), "pop", vec![])),
    ]);

    Typechecker::new().check(&mut program)?;

    assert_eq!(declared_type(&program.statements[0]), "HeapMap<int, string>");
    assert_eq!(declared_type(&program.statements[2]), "int");
    Ok(())
}

#[test]
fn set_and_tree_elements_refine() -> Result<(), Box<dyn Error>> {
    let mut program = program(vec![
        let_stmt("s", call("Set", vec![])),
        expr_stmt(method_call(ident("s"), "add", vec![float(2.5)])),
        let_stmt("t", call("AVLTree", vec![])),
        expr_stmt(method_call(ident("t"), "insert", vec![int(7)])),
        let_stmt("has", method_call(ident("s"), "has", vec![float(2.5)])),
    ]);

    Typechecker::new().check(&mut program)?;

    assert_eq!(declared_type(&program.statements[0]), "Set<float>");
    assert_eq!(declared_type(&program.statements[2]), "AVLTree<int>");
    assert_eq!(declared_type(&program.statements[4]), "boolean");
    Ok(())
}

#[test]
fn graph_nodes_refine_through_add_vertex() -> Result<(), Box<dyn Error>> {
    let mut program = program(vec![
        let_stmt("g", call("Graph", vec![boolean(true)])),
        expr_stmt(method_call(ident("g"), "addVertex", vec![string("a")])),
        expr_stmt(method_call(
            ident("g"),
            "addEdge",
            vec![string("a"), string("b"), int(4)],
        )),
        let_stmt("ns", method_call(ident("g"), "getNeighbors", vec![string("a")])),
    ]);

    Typechecker::new().check(&mut program)?;

    assert_eq!(declared_type(&program.statements[0]), "Graph<string>");
    assert_eq!(
        declared_type(&program.statements[3]),
        "Array<{ to: string, weight: int }>"
    );
    Ok(())
}

#[test]
fn graph_edge_weight_must_be_int() {
    let mut program = program(vec![
        let_stmt("g", call("Graph", vec![boolean(false)])),
        expr_stmt(method_call(ident("g"), "addVertex", vec![string("a")])),
        expr_stmt(method_call(
            ident("g"),
            "addEdge",
            vec![string("a"), string("b"), string("heavy")],
        )),
    ]);

    let error = Typechecker::new().check(&mut program).unwrap_err();
    assert!(error.to_string().starts_with("Type mismatch"));
}

#[test]
fn index_assignment_widens_inferred_arrays() -> Result<(), Box<dyn Error>> {
    // let arr = [1]; arr[0] = true — inferred binding widens in union mode
    let mut program = program(vec![
        let_stmt("arr", array(vec![int(1)])),
        assign(index(ident("arr"), int(0)), boolean(true)),
    ]);

    union_checker().check(&mut program)?;

    assert_eq!(declared_type(&program.statements[0]), "Array<int | boolean>");
    Ok(())
}

#[test]
fn index_assignment_respects_strict_annotations() {
    // let arr: Array<int> = [1]; arr[0] = true
    let mut program = program(vec![
        let_annotated(
            "arr",
            TypeAnnotation::generic("Array", vec![TypeAnnotation::simple("int")]),
            array(vec![int(1)]),
        ),
        assign(index(ident("arr"), int(0)), boolean(true)),
    ]);

    let error = Typechecker::new().check(&mut program).unwrap_err();
    assert!(error.to_string().starts_with("Type mismatch"));
}

//! Integration tests for scoped lookup, templates and paths

#[path = "common/mod.rs"]
mod common;
use common::{evaluator, run, run_lines, value, Primitive};

#[test]
fn test_lookup_prefers_local_then_template_then_enclosing() {
    let mut eval = evaluator();
    run_lines(
        &mut eval,
        &[
            "create speed, 30",
            "create ac, 10",
            "create npc.goblin.ac, 15",
            "create npc.goblin.speed, 25",
            "create npc.boss._template, ..goblin",
            "create npc.boss.ac, 17",
        ],
    );
    // local
    assert_eq!(value(&mut eval, "npc.boss.ac"), Primitive::Int(17));
    // template
    assert_eq!(value(&mut eval, "npc.boss.speed"), Primitive::Int(25));
    // enclosing, past the template
    run_lines(&mut eval, &["create npc.boss.hp, 40", "create hp, 1"]);
    assert_eq!(value(&mut eval, "npc.goblin.hp"), Primitive::Int(1));
    assert_eq!(value(&mut eval, "npc.boss.hp"), Primitive::Int(40));
}

#[test]
fn test_template_chain_and_cycle() {
    let mut eval = evaluator();
    run_lines(
        &mut eval,
        &[
            "create base.str, 8",
            "create mid._template, :base",
            "create top._template, :mid",
            "create a._template, :b",
            "create b._template, :a",
            "create str, 0",
        ],
    );
    assert_eq!(value(&mut eval, "top.str"), Primitive::Int(8));
    // A cycle stops the template search and falls back to the enclosing container
    assert_eq!(value(&mut eval, "a.str"), Primitive::Int(0));
}

#[test]
fn test_relative_paths() {
    let mut eval = evaluator();
    run_lines(
        &mut eval,
        &[
            "create x, 1",
            "create a.x, 2",
            "create a.b.x, 3",
            "environment a.b",
        ],
    );
    assert_eq!(value(&mut eval, "x"), Primitive::Int(3));
    assert_eq!(value(&mut eval, ".x"), Primitive::Int(3));
    assert_eq!(value(&mut eval, "..x"), Primitive::Int(2));
    assert_eq!(value(&mut eval, "...x"), Primitive::Int(1));
    // Climbing stops at the top level
    assert_eq!(value(&mut eval, "......x"), Primitive::Int(1));
    assert_eq!(value(&mut eval, ":a.b.x"), Primitive::Int(3));
    assert_eq!(value(&mut eval, ":x"), Primitive::Int(1));
}

#[test]
fn test_create_path_is_idempotent() {
    let mut eval = evaluator();
    let out = run_lines(
        &mut eval,
        &["create a.b.c", "create a.b.c", "list a, $TRUE"],
    );
    assert_eq!(
        out,
        vec![
            "Variable ':a.b.c' created.",
            "Variable ':a.b.c' created.",
            "b:",
            "   c: ()",
        ]
    );
}

#[test]
fn test_create_wraps_scalars() {
    let mut eval = evaluator();
    run_lines(&mut eval, &["create hp, 12", "create hp.max, 20"]);
    assert_eq!(value(&mut eval, "hp"), Primitive::Int(12));
    assert_eq!(value(&mut eval, "hp.max"), Primitive::Int(20));
    assert_eq!(value(&mut eval, "hp + 1"), Primitive::Int(13));
}

#[test]
fn test_set_requires_existing_variable() {
    let out = run(&["set hp, 5", "set hp, 5, $TRUE", "hp"]);
    assert_eq!(
        out,
        vec![
            "Error: No variable 'hp' exists in ':'.",
            "Value of ':hp' set to '5'.",
            "Result: 5",
        ]
    );
}

#[test]
fn test_set_on_boxed_collection_sets_value() {
    let mut eval = evaluator();
    run_lines(&mut eval, &["create pc, 5", "create pc.hp, 7", "set pc, 3"]);
    assert_eq!(value(&mut eval, "pc"), Primitive::Int(3));
    assert_eq!(value(&mut eval, "pc.hp"), Primitive::Int(7));
}

#[test]
fn test_set_on_plain_collection_replaces_it() {
    let mut eval = evaluator();
    let out = run_lines(&mut eval, &["create pc, {a=1}", "set pc, {b=2}", "pc.b", "pc.a"]);
    assert_eq!(out[2], "Value of ':pc' set to '{b=2}'.");
    assert_eq!(out[3], "Result: 2");
    assert_eq!(out[4], "Error: No variable 'a' exists in ':pc'.");

    run_lines(&mut eval, &["create orc.hp, 7", "set orc, 3"]);
    assert_eq!(value(&mut eval, "orc"), Primitive::Int(3));
}

#[test]
fn test_copy_then_remove() {
    let mut eval = evaluator();
    let out = run_lines(
        &mut eval,
        &[
            "create orc.hp, 15",
            "create orc.gear.axe, \"great\"",
            "copy orc, orc2",
            "remove orc",
            "orc2.gear.axe",
            "orc",
        ],
    );
    assert_eq!(out[4], "Variable ':orc' copied to ':orc2'.");
    assert_eq!(out[5], "Variable :orc removed.");
    assert_eq!(out[6], "great");
    assert_eq!(out[7], "Error: No variable 'orc' exists in ':'.");
    assert_eq!(value(&mut eval, "orc2.hp"), Primitive::Int(15));
}

#[test]
fn test_copy_is_independent() {
    let mut eval = evaluator();
    run_lines(
        &mut eval,
        &["create a.hp, 1", "copy a, b", "set b.hp, 2"],
    );
    assert_eq!(value(&mut eval, "a.hp"), Primitive::Int(1));
    assert_eq!(value(&mut eval, "b.hp"), Primitive::Int(2));
}

#[test]
fn test_copy_into_current_environment() {
    let mut eval = evaluator();
    let out = run_lines(
        &mut eval,
        &[
            "create templates.orc.hp, 15",
            "create encounter.x",
            "environment encounter",
            "copy :templates.orc",
            "orc.hp",
            "copy :templates.orc",
        ],
    );
    assert_eq!(out[4], "Variable ':templates.orc' copied to ':encounter.orc'.");
    assert_eq!(out[5], "Result: 15");
    assert_eq!(out[6], "Error: A variable orc already exists.");
}

#[test]
fn test_move() {
    let mut eval = evaluator();
    let out = run_lines(
        &mut eval,
        &["create a.hp, 4", "move a, party.a", "a", "party.a.hp"],
    );
    assert_eq!(out[2], "Variable ':a' moved to ':party.a'.");
    assert_eq!(out[3], "Error: No variable 'a' exists in ':'.");
    assert_eq!(out[4], "Result: 4");
}

#[test]
fn test_paths_from_interpretation() {
    let mut eval = evaluator();
    run_lines(
        &mut eval,
        &["create name, \"goblin\"", "create <name>.hp, 7"],
    );
    assert_eq!(value(&mut eval, "goblin.hp"), Primitive::Int(7));
}

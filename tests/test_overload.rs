//! Integration tests for hidden bindings: `_value`, operator hooks,
//! `_toString`, `_type` and `_template`

#[path = "common/mod.rs"]
mod common;
use common::{evaluator, last, run_lines, value, Primitive};

#[test]
fn test_add_hook_receives_self_and_other() {
    let mut eval = evaluator();
    run_lines(
        &mut eval,
        &[
            "create wallet, {gold=10, _add=[[set(#1.gold, [#1.gold + #2])]]}",
            "wallet + 5",
        ],
    );
    assert_eq!(value(&mut eval, "wallet.gold"), Primitive::Int(15));
}

#[test]
fn test_hooks_per_operator() {
    let mut eval = evaluator();
    run_lines(
        &mut eval,
        &[
            "create m, {_value=10, _subtract=(_value - #2 * 2), _divide=\"halved\"}",
        ],
    );
    assert_eq!(value(&mut eval, "m - 3"), Primitive::Int(4));
    assert_eq!(value(&mut eval, "m / 2"), Primitive::Text("halved".into()));
    assert_eq!(value(&mut eval, "m + 1"), Primitive::Int(11));
    // Only the left operand's hook is consulted
    let err = eval.evaluate("1 - m", &mut Vec::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Can not subtract values of type 'integer' and 'collection'."
    );
}

#[test]
fn test_hook_with_empty_operand() {
    let mut eval = evaluator();
    run_lines(&mut eval, &["create m, {_value=1, _add=99}"]);
    assert_eq!(value(&mut eval, "m + 2"), Primitive::Int(99));
    assert!(matches!(value(&mut eval, "m + ()"), Primitive::Container(_)));
}

#[test]
fn test_templates_provide_hooks() {
    let mut eval = evaluator();
    run_lines(
        &mut eval,
        &[
            "create kinds.coin._add, (_value + #2)",
            "create purse._template, :kinds.coin",
            "create purse._value, 4",
        ],
    );
    assert_eq!(value(&mut eval, "purse + 3"), Primitive::Int(7));
}

#[test]
fn test_to_string_hook() {
    assert_eq!(
        last(&[
            "create pc, {name=\"Ayla\", hp=7, _toString=(name + \" (\" + text([[hp]]) + \")\")}",
            "pc",
        ]),
        "Result: Ayla (7)"
    );
}

#[test]
fn test_failing_to_string_falls_back() {
    let out = last_lines(&["create pc, {hp=7, _toString=missing}", "pc"]);
    assert_eq!(
        out,
        vec![
            "Error: No variable 'missing' exists in ':pc'.",
            "Result: {hp=7}"
        ]
    );
}

fn last_lines(lines: &[&str]) -> Vec<String> {
    let out = common::run(lines);
    out[out.len() - 2..].to_vec()
}

#[test]
fn test_type_name_override() {
    assert_eq!(
        last(&["create m, {_type=\"monster\"}", "m / 2"]),
        "Error: A value of type 'monster' can not be part of a division."
    );
}

#[test]
fn test_plain_collection_is_not_an_operand() {
    assert_eq!(
        last(&["{a=1} + 1"]),
        "Error: A value of type 'collection' can not be part of an addition."
    );
}

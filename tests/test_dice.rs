//! Integration tests for dice rolls

#[path = "common/mod.rs"]
mod common;
use common::{evaluator, fixed_rolls, last, run_lines, value, Primitive};
use tracker::MAX_ROLLS;

#[test]
fn test_keep_lowest_with_fixed_rolls() {
    let mut eval = fixed_rolls(&[5, 1, 3]);
    let out = run_lines(&mut eval, &["3d6L2"]);
    assert_eq!(out, vec!["Dice roll (3D6L2): 1 3 (5)", "Result: 4"]);
}

#[test]
fn test_keep_highest_with_fixed_rolls() {
    let mut eval = fixed_rolls(&[2, 6, 4, 1]);
    let out = run_lines(&mut eval, &["4d6h3"]);
    assert_eq!(out, vec!["Dice roll (4D6H3): (1) 2 4 6", "Result: 12"]);
}

#[test]
fn test_dice_in_expressions() {
    let mut eval = fixed_rolls(&[4, 2]);
    let out = run_lines(&mut eval, &["create bonus, 3", "2d6 + bonus"]);
    assert_eq!(out[2..], ["Dice roll (2D6): 2 4", "Result: 9"]);

    let mut eval = fixed_rolls(&[6]);
    let out = run_lines(&mut eval, &["create n, 2", "(n - 1)d(n * 4)"]);
    assert_eq!(out[2..], ["Dice roll (1D8): 6", "Result: 6"]);
}

#[test]
fn test_letter_must_touch_operand() {
    // `d6` after whitespace is a separate argument, not a roll
    let out = run_lines(&mut fixed_rolls(&[1]), &["print 2 d6"]);
    assert_eq!(out, vec!["2", "Error: No variable 'd6' exists in ':'."]);
}

#[test]
fn test_zero_dice_is_empty() {
    let mut eval = fixed_rolls(&[3]);
    let out = run_lines(&mut eval, &["0d6 + 5"]);
    assert_eq!(out, vec!["Dice roll (0D6): ", "Result: 5"]);
}

#[test]
fn test_random_rolls_stay_in_range() {
    let mut eval = evaluator();
    for _ in 0..200 {
        match value(&mut eval, "3d6L2") {
            Primitive::Int(total) => assert!((2..=12).contains(&total), "{total}"),
            other => panic!("unexpected {other:?}"),
        }
    }
}

#[test]
fn test_invalid_rolls() {
    assert_eq!(last(&["-1d6"]), "Error: Can not roll -1 number of dice.");
    assert_eq!(last(&["2d0"]), "Error: Can not roll a dice of size 0.");
    assert_eq!(last(&["2d6L3"]), "Error: Can not keep the lowest 3 dice rolls.");
    assert_eq!(
        last(&["\"two\"d6"]),
        "Error: Can not perform a dice roll with text."
    );
}

#[test]
fn test_roll_count_is_limited() {
    assert_eq!(
        last(&["2147483647d6"]),
        "Error: Can not roll 2147483647 number of dice."
    );
    let too_many = format!("{}d6", MAX_ROLLS + 1);
    assert_eq!(
        last(&[too_many.as_str()]),
        format!("Error: Can not roll {} number of dice.", MAX_ROLLS + 1)
    );

    let mut eval = fixed_rolls(&[1]);
    let most = format!("{}d6", MAX_ROLLS);
    assert_eq!(value(&mut eval, &most), Primitive::Int(MAX_ROLLS));
}

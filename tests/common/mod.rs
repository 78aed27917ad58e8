//! Common test utilities for tracker integration tests

pub use tracker::{Config, Evaluator, MemoryFileSystem, Primitive, SequenceRoller};

#[allow(dead_code)]
/// An evaluator with default configuration, independent of the environment
pub fn evaluator() -> Evaluator {
    Evaluator::new().with_config(Config::default())
}

/// An evaluator whose dice replay `rolls`
#[allow(dead_code)]
pub fn fixed_rolls(rolls: &[u32]) -> Evaluator {
    evaluator().with_roller(SequenceRoller::new(rolls))
}

#[allow(dead_code)]
/// Dispatch every line on a fresh evaluator and return the output
pub fn run(lines: &[&str]) -> Vec<String> {
    run_lines(&mut evaluator(), lines)
}

#[allow(dead_code)]
/// Dispatch every line on `eval` and return the output
pub fn run_lines(eval: &mut Evaluator, lines: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for line in lines {
        eval.dispatch(line, &mut out);
    }
    out
}

/// The last line written by a fresh evaluator
#[allow(dead_code)]
pub fn last(lines: &[&str]) -> String {
    run(lines).pop().unwrap_or_default()
}

/// Full evaluation of `text` in the current container
#[allow(dead_code)]
pub fn value(eval: &mut Evaluator, text: &str) -> Primitive {
    eval.evaluate(text, &mut Vec::new())
        .unwrap_or_else(|e| panic!("{text}: {e}"))
}

//! tracker - an expression engine for tabletop bookkeeping
//!
//! # Overview
//!
//! tracker keeps characters, monsters and anything else a game master
//! wants to count in a tree of named variables, and evaluates a compact
//! notation against that tree. A line of input is a statement: a value,
//! optionally followed by arguments, that is reduced in the current
//! container.
//!
//! # Core Concepts
//!
//! ## Containers and paths
//!
//! ```text
//! create goblin.hp, 7        # :goblin is a container, :goblin.hp holds 7
//! goblin.hp                  # Result: 7
//! goblin..hp                 # looks up hp one level above goblin
//! :goblin.hp                 # absolute, from the top-level container
//! ```
//!
//! ## Deferred values and commands
//!
//! ```text
//! set heal, (hp + #1)        # stored unevaluated, #1 is the first argument
//! set hp, heal(3)            # evaluated when hp is read
//! set hp, [heal(3)]          # evaluated once, when the statement runs
//! 3d6H2                      # roll three dice and keep the highest two
//! ```
//!
//! ## Hidden bindings
//!
//! Names starting with `_` are hidden. `_value` boxes a scalar inside a
//! container, `_template` delegates lookups, `_add`, `_subtract`,
//! `_product` and `_divide` overload operators and `_toString` controls
//! how a container is shown.
//!
//! # Example
//!
//! ```rust
//! use tracker::{Evaluator, Primitive};
//!
//! let mut eval = Evaluator::new();
//! let mut output: Vec<String> = Vec::new();
//! eval.dispatch("create goblin.hp, 7", &mut output);
//! let hp = eval.evaluate("goblin.hp * 2", &mut output).unwrap();
//! assert_eq!(hp, Primitive::Int(14));
//! ```

pub mod ast;
pub mod command;
pub mod config;
pub mod env;
pub mod eval;
pub mod io;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, Keep, Primitive, Value};
pub use command::{Command, MAX_LOOPS};
pub use config::Config;
pub use env::{BindingId, ContainerId, Path, Store};
pub use eval::{
    DiceRoller, ErrorKind, EvalError, Evaluator, Mode, RandomRoller, SequenceRoller, MAX_ROLLS,
};
pub use io::{DiskFileSystem, FileSystem, MemoryFileSystem, Sink};
pub use parser::{parse_statement, parse_value, ParseError, Statement, MAX_NESTING};

/// Dispatch each line with a fresh evaluator and collect everything written
pub fn run<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut eval = Evaluator::new();
    let mut output = Vec::new();
    for line in lines {
        eval.dispatch(line, &mut output);
        if eval.quit_requested() {
            break;
        }
    }
    output
}

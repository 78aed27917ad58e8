//! Built-in commands
//!
//! Every command is a protected binding in the top-level container whose
//! value is a [`Command`]. Commands receive their arguments unevaluated and
//! decide themselves which ones to evaluate, which to read as paths and
//! which to store as they are.

mod collection;
mod control;
mod mutation;
mod persistence;
mod utility;

pub use control::MAX_LOOPS;

use tracing::debug;

use crate::ast::{Primitive, Value};
use crate::env::{ContainerId, Store};
use crate::eval::{EvalError, Evaluator, Mode};
use crate::io::Sink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Set,
    Copy,
    Move,
    Create,
    Remove,
    If,
    While,
    For,
    Sort,
    List,
    Load,
    Save,
    Run,
    Print,
    Text,
    Void,
    Environment,
    Clear,
    Quit,
}

impl Command {
    pub const ALL: [Command; 19] = [
        Command::Set,
        Command::Copy,
        Command::Move,
        Command::Create,
        Command::Remove,
        Command::If,
        Command::While,
        Command::For,
        Command::Sort,
        Command::List,
        Command::Load,
        Command::Save,
        Command::Run,
        Command::Print,
        Command::Text,
        Command::Void,
        Command::Environment,
        Command::Clear,
        Command::Quit,
    ];

    /// The word the command is bound to
    pub fn name(self) -> &'static str {
        match self {
            Command::Set => "set",
            Command::Copy => "copy",
            Command::Move => "move",
            Command::Create => "create",
            Command::Remove => "remove",
            Command::If => "if",
            Command::While => "while",
            Command::For => "for",
            Command::Sort => "sort",
            Command::List => "list",
            Command::Load => "load",
            Command::Save => "save",
            Command::Run => "run",
            Command::Print => "print",
            Command::Text => "text",
            Command::Void => "void",
            Command::Environment => "environment",
            Command::Clear => "clear",
            Command::Quit => "quit",
        }
    }

    pub fn usage(self) -> &'static str {
        match self {
            Command::Set => "set <variable> <value> [createPath?]",
            Command::Copy => "copy <variable> [destination] [createPath?]",
            Command::Move => "move <variable> [destination]",
            Command::Create => "create <path> [value]",
            Command::Remove => "remove <variable>",
            Command::If => "if <condition> <value when true> [value when false]",
            Command::While => "while <condition> <value evaluated while true>",
            Command::For => "for <collection> <value evaluated per variable> [include hidden?]",
            Command::Sort => "sort <collection> [variable]",
            Command::List => "list [collection] [listSubCollections?] [listHiddenVariables?]",
            Command::Load => "load <fileName> <variable>",
            Command::Save => "save <fileName> [variable]",
            Command::Run => "run <fileName>",
            Command::Print => "print [val1] [val2] ...",
            Command::Text => "text <value>",
            Command::Void => "void [args]",
            Command::Environment => "environment [collection]",
            Command::Clear => "clear",
            Command::Quit => "quit",
        }
    }

    /// Minimum number of arguments
    fn arity(self) -> usize {
        match self {
            Command::Set | Command::If | Command::While | Command::For | Command::Load => 2,
            Command::Copy
            | Command::Move
            | Command::Create
            | Command::Remove
            | Command::Sort
            | Command::Save
            | Command::Run
            | Command::Text => 1,
            Command::List
            | Command::Print
            | Command::Void
            | Command::Environment
            | Command::Clear
            | Command::Quit => 0,
        }
    }
}

/// Bind every command in the top-level container
pub(crate) fn install(store: &mut Store) {
    let root = store.root();
    for command in Command::ALL {
        store.add_command(root, command.name(), Value::Command(command));
    }
}

impl Evaluator {
    pub(crate) fn run_command(
        &mut self,
        command: Command,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        debug!(command = command.name(), args = args.len(), "running command");
        if args.len() < command.arity() {
            return Err(EvalError::Type(format!(
                "The command '{}' needs at least {} argument{} to work: {}",
                command.name(),
                command.arity(),
                if command.arity() == 1 { "" } else { "s" },
                command.usage()
            )));
        }
        match command {
            Command::Set => self.set(env, args, sink),
            Command::Copy => self.copy(env, args, sink),
            Command::Move => self.move_variable(env, args, sink),
            Command::Create => self.create(env, args, sink),
            Command::Remove => self.remove(env, args, sink),
            Command::If => self.if_command(env, args, sink),
            Command::While => self.while_command(env, args, sink),
            Command::For => self.for_command(env, args, sink),
            Command::Sort => self.sort(env, args, sink),
            Command::List => self.list(env, args, sink),
            Command::Load => self.load(env, args, sink),
            Command::Save => self.save(env, args, sink),
            Command::Run => self.run_script(env, args, sink),
            Command::Print => self.print(env, args, sink),
            Command::Text => self.text(args, sink),
            Command::Void => self.void(env, args, sink),
            Command::Environment => self.environment(env, args, sink),
            Command::Clear => {
                sink.clear_screen();
                Ok(Primitive::Void)
            }
            Command::Quit => {
                sink.quit();
                self.quit_requested = true;
                Ok(Primitive::Void)
            }
        }
    }

    /// Evaluate an argument the way commands do: fully, without arguments
    pub(crate) fn argument(
        &mut self,
        value: &Value,
        env: ContainerId,
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        self.reduce(value, env, &[], Mode::Full, sink)
    }

    /// An optional yes/no argument
    pub(crate) fn flag(
        &mut self,
        args: &[Value],
        index: usize,
        default: bool,
        env: ContainerId,
        sink: &mut dyn Sink,
    ) -> Result<bool, EvalError> {
        match args.get(index) {
            Some(value) => Ok(self.argument(value, env, sink)?.is_truthy()),
            None => Ok(default),
        }
    }
}

fn system_command(name: &str) -> EvalError {
    EvalError::Type(format!(
        "Can not manipulate {} as it is a system command.",
        name
    ))
}

/// Append `.extension` unless the name's last dot is followed by one to four characters
pub fn with_default_extension(name: &str, extension: &str) -> String {
    let has_extension = name
        .rsplit_once('.')
        .map_or(false, |(_, ext)| (1..=4).contains(&ext.chars().count()));
    if has_extension {
        name.to_string()
    } else {
        format!("{}.{}", name, extension)
    }
}

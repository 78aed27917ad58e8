//! Evaluator for tracker statements
//!
//! The evaluator owns the variable store and reduces expression trees
//! against it:
//! - Literals reduce to themselves
//! - Names are looked up through the scope chain and their value reduced
//! - Operators reduce their operands in a partial mode first, so a
//!   container can stand in for its `_value` or overload the operator
//! - Commands run with their unevaluated arguments and mutate the store
//!
//! Output never goes to stdout directly; everything a statement prints is
//! written to a [`Sink`](crate::io::Sink).

mod arithmetic;
mod dice;
mod dispatch;
mod paths;
mod reduce;
mod render;

pub use dice::{DiceRoller, RandomRoller, SequenceRoller, MAX_ROLLS};
pub use reduce::Mode;

use crate::ast::Primitive;
use crate::config::Config;
use crate::env::{ContainerId, Path, Store};
use crate::io::{DiskFileSystem, FileSystem, Sink};
use crate::parser::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error(transparent)]
    Syntax(#[from] ParseError),
    #[error("{0}")]
    Lookup(String),
    #[error("{0}")]
    Type(String),
    #[error("{0}")]
    Arithmetic(String),
    #[error("{0}")]
    Guard(String),
    #[error("Problem occurred with file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("{message}, since: {source}")]
    Context {
        message: String,
        source: Box<EvalError>,
    },
}

/// Category of an [`EvalError`], looking through any added context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Lookup,
    Type,
    Arithmetic,
    Io,
    Guard,
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::Syntax(_) => ErrorKind::Syntax,
            EvalError::Lookup(_) => ErrorKind::Lookup,
            EvalError::Type(_) => ErrorKind::Type,
            EvalError::Arithmetic(_) => ErrorKind::Arithmetic,
            EvalError::Guard(_) => ErrorKind::Guard,
            EvalError::Io { .. } => ErrorKind::Io,
            EvalError::Context { source, .. } => source.kind(),
        }
    }

    /// Wrap this error in a message explaining what was being attempted
    pub fn context(self, message: impl Into<String>) -> EvalError {
        EvalError::Context {
            message: message.into(),
            source: Box::new(self),
        }
    }
}

/// The evaluator holds the store and everything a statement may touch
pub struct Evaluator {
    /// Containers and bindings
    pub(crate) store: Store,
    /// Container statements are evaluated in (changed by `environment`)
    pub(crate) current: ContainerId,
    /// Source of dice rolls
    pub(crate) roller: Box<dyn DiceRoller>,
    /// Files read by `load`/`run` and written by `save`
    pub(crate) files: Box<dyn FileSystem>,
    pub(crate) config: Config,
    /// Current evaluation depth, checked against `config.max_depth`
    pub(crate) depth: usize,
    /// Dispatch calls in progress; `run` dispatches from inside a statement
    pub(crate) nesting: usize,
    /// Set once `quit` was evaluated
    pub(crate) quit_requested: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        let mut store = Store::new();
        crate::command::install(&mut store);
        let current = store.root();
        Evaluator {
            store,
            current,
            roller: Box::new(RandomRoller),
            files: Box::new(DiskFileSystem),
            config: Config::from_env(),
            depth: 0,
            nesting: 0,
            quit_requested: false,
        }
    }

    pub fn with_roller(mut self, roller: impl DiceRoller + 'static) -> Self {
        self.roller = Box::new(roller);
        self
    }

    pub fn with_file_system(mut self, files: impl FileSystem + 'static) -> Self {
        self.files = Box::new(files);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn current(&self) -> ContainerId {
        self.current
    }

    pub fn current_path(&self) -> Path {
        self.store.path_of(self.current)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Names a statement typed now could refer to, for completion
    pub fn visible_names(&self) -> Vec<String> {
        self.store.visible_names(self.current)
    }

    /// Evaluate a single value in the current container without
    /// going through the dispatcher's output formatting
    pub fn evaluate(&mut self, text: &str, sink: &mut dyn Sink) -> Result<Primitive, EvalError> {
        let value = crate::parser::parse_value(text)?;
        let env = self.current;
        self.reduce(&value, env, &[], Mode::Full, sink)
    }
}

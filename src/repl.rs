use std::borrow::Cow;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper, Result as RlResult};
use tracker::{Config, Evaluator};

use crate::rcfile::load_rc;
use crate::terminal::{execute_line, TerminalSink};

const PROMPT: &str = "> ";

/// Helper struct for rustyline with completion over variable names
struct TrackerHelper {
    /// Names visible from the current container, refreshed after every line
    names: Vec<String>,
}

impl Helper for TrackerHelper {}

impl Completer for TrackerHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = word_start(line, pos);
        let prefix = &line[start..pos];

        if prefix.is_empty() {
            return Ok((start, Vec::new()));
        }

        let mut completions: Vec<&String> = self
            .names
            .iter()
            .filter(|name| name.starts_with(prefix))
            .collect();
        completions.sort();
        completions.dedup();

        let pairs = completions
            .into_iter()
            .map(|c| Pair {
                display: c.clone(),
                replacement: c.clone(),
            })
            .collect();

        Ok((start, pairs))
    }
}

/// Byte offset where the identifier ending at `pos` begins
fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .char_indices()
        .rev()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0)
}

impl Hinter for TrackerHelper {
    type Hint = String;
}

impl Highlighter for TrackerHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for TrackerHelper {}

/// Run the interactive loop until `quit`, Ctrl-D or a terminal error
pub(crate) fn run_repl() -> RlResult<()> {
    let config = Config::from_env();
    let mut eval = Evaluator::new().with_config(config.clone());

    let mut rl: Editor<TrackerHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(TrackerHelper {
        names: eval.visible_names(),
    }));

    if let Some(ref path) = config.history_file {
        let _ = rl.load_history(path);
    }

    load_rc(&mut eval, &config);

    let mut sink = TerminalSink::default();
    while !eval.quit_requested() {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());
                execute_line(&mut eval, &line, &mut sink);
                if let Some(helper) = rl.helper_mut() {
                    helper.names = eval.visible_names();
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C - drop the line and continue
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D - exit
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(ref path) = config.history_file {
        let _ = rl.save_history(path);
    }

    Ok(())
}

use std::io::Write;

use tracker::{Evaluator, Sink};

/// Writes statement output to stdout and remembers whether an error was printed
#[derive(Debug, Default)]
pub(crate) struct TerminalSink {
    pub(crate) errors: usize,
}

impl Sink for TerminalSink {
    fn write_line(&mut self, line: &str) {
        if line.starts_with("Error: ") {
            self.errors += 1;
        }
        println!("{}", line);
    }

    fn clear_screen(&mut self) {
        print!("\x1b[2J\x1b[H");
        let _ = std::io::stdout().flush();
    }

    fn quit(&mut self) {
        let _ = std::io::stdout().flush();
    }
}

/// Execute a single line of tracker input.
/// Returns true when the line produced an error.
pub(crate) fn execute_line(eval: &mut Evaluator, input: &str, sink: &mut TerminalSink) -> bool {
    let before = sink.errors;
    eval.dispatch(input, sink);
    sink.errors > before
}

/// Lines that carry a statement: not blank and not a `#` comment
pub(crate) fn is_statement(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

use std::fs;

use tracker::{Config, Evaluator, Sink};

use crate::terminal::is_statement;

/// Collects what an rc line printed so failures can be reported as warnings
#[derive(Default)]
struct RcSink {
    errors: Vec<String>,
}

impl Sink for RcSink {
    fn write_line(&mut self, line: &str) {
        if let Some(error) = line.strip_prefix("Error: ") {
            self.errors.push(error.to_string());
        }
    }
}

/// Dispatch the startup file, if there is one and it is not disabled
pub(crate) fn load_rc(eval: &mut Evaluator, config: &Config) {
    if config.skip_rc {
        return;
    }
    let rc_path = match &config.rc_file {
        Some(path) => path,
        None => return,
    };
    let content = match fs::read_to_string(rc_path) {
        Ok(c) => c,
        Err(_) => return,
    };
    tracing::info!(path = %rc_path.display(), "loading rc file");

    for (line_num, line) in content.lines().enumerate() {
        if !is_statement(line) {
            continue;
        }
        let mut sink = RcSink::default();
        eval.dispatch(line.trim(), &mut sink);
        for e in sink.errors {
            eprintln!("Warning: {} line {}: {}", rc_path.display(), line_num + 1, e);
        }
        if eval.quit_requested() {
            break;
        }
    }
}

use std::fs;
use std::process::ExitCode;

use tracker::Evaluator;

use crate::terminal::{execute_line, is_statement, TerminalSink};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parsed command-line arguments
pub(crate) struct CliArgs {
    pub(crate) command: Option<String>,
    pub(crate) script: Option<String>,
    pub(crate) help: bool,
    pub(crate) version: bool,
}

/// Parse command-line arguments
pub(crate) fn parse_args(args: &[String]) -> CliArgs {
    let mut cli = CliArgs {
        command: None,
        script: None,
        help: false,
        version: false,
    };

    let mut i = 1; // Skip program name
    while i < args.len() {
        match args[i].as_str() {
            "-c" => {
                // Everything after -c is the statement
                if i + 1 < args.len() {
                    cli.command = Some(args[i + 1..].join(" "));
                    break;
                }
            }
            "--help" | "-h" => {
                cli.help = true;
            }
            "--version" | "-V" => {
                cli.version = true;
            }
            path => {
                if !path.starts_with('-') {
                    cli.script = Some(path.to_string());
                }
            }
        }
        i += 1;
    }

    cli
}

pub(crate) fn print_help() {
    println!(
        r#"tracker-{} - Expression engine for tabletop bookkeeping

USAGE:
    tracker                 Start interactive REPL
    tracker -c <statement>  Evaluate a single statement
    tracker <script>        Evaluate every line of a script file
    tracker --help          Show this help message
    tracker --version       Show version

STARTUP:
    ~/.trackerrc            Evaluated on REPL startup (if exists)
    TRACKER_RC=<file>       Use another startup file
    TRACKER_NO_RC=1         Skip the startup file
    TRACKER_HISTORY=<file>  REPL history file (default ~/.tracker_history)
    TRACKER_MAX_DEPTH=<n>   Deepest evaluation nesting (default 256)
    RUST_LOG=debug          Log to stderr

SYNTAX:
    42  -3  "text"  $TRUE   Literals
    ()                      Empty value
    {{hp=7, ac=12}}           Collection
    hp  :a.b  .b  a..b      Variables and paths (.. goes up a level)
    (a + b)  (a = b)        Arithmetic and comparison
    3d6  4d6H3  2d20L1      Dice, keeping the highest/lowest
    f(1, 2)  #1             Call with arguments, argument placeholder
    [v]  [[v]]              Evaluate once when the statement runs
    <v>                     Interpret a number as _n, a text as a value

COMMANDS:
    set <variable> <value> [createPath?]
    copy <variable> [destination] [createPath?]
    move <variable> [destination]
    create <path> [value]
    remove <variable>
    if <condition> <value when true> [value when false]
    while <condition> <value evaluated while true>
    for <collection> <value evaluated per variable> [include hidden?]
    sort <collection> [variable]
    list [collection] [listSubCollections?] [listHiddenVariables?]
    load <fileName> <variable>
    save <fileName> [variable]
    run <fileName>
    print [val1] [val2] ...
    text <value>
    void [args]
    environment [collection]
    clear
    quit

HIDDEN VARIABLES:
    _value                  Value of a collection used as a scalar
    _template               Path of a collection to inherit variables from
    _add _subtract          Operator overloads, called with #1 = self, #2 = other
    _product _divide
    _toString               How a collection is displayed
    _type                   Type name a collection reports"#,
        VERSION
    );
}

pub(crate) fn print_version() {
    println!("tracker {}", VERSION);
}

/// Evaluate a single statement
pub(crate) fn execute_command(cmd: &str) -> ExitCode {
    let mut eval = Evaluator::new();
    let mut sink = TerminalSink::default();

    if execute_line(&mut eval, cmd, &mut sink) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Evaluate a script file line by line
pub(crate) fn execute_script(path: &str) -> ExitCode {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let mut eval = Evaluator::new();
    let mut sink = TerminalSink::default();
    let mut failed = false;

    for (line_num, line) in content.lines().enumerate() {
        if !is_statement(line) {
            continue;
        }
        if execute_line(&mut eval, line.trim(), &mut sink) {
            eprintln!("Error at line {}", line_num + 1);
            failed = true;
        }
        if eval.quit_requested() {
            break;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_command() {
        let cli = parse_args(&args(&["tracker", "-c", "set", "hp,", "5"]));
        assert_eq!(cli.command.as_deref(), Some("set hp, 5"));
        assert!(cli.script.is_none());
    }

    #[test]
    fn test_parse_script_and_flags() {
        let cli = parse_args(&args(&["tracker", "--version", "party.scr"]));
        assert!(cli.version);
        assert!(!cli.help);
        assert_eq!(cli.script.as_deref(), Some("party.scr"));
    }

    #[test]
    fn test_parse_nothing() {
        let cli = parse_args(&args(&["tracker"]));
        assert!(cli.command.is_none() && cli.script.is_none());
    }
}

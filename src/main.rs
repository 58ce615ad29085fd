use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use minipascal::diagnostics::{format_diagnostic, format_plain_diagnostic, format_report};
use minipascal::{
    evaluate, parse_expression, parse_program, printer, run, starts_program, Error, Options,
    SemanticCheck,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Interpreter for a small Pascal subset: BEGIN/END blocks, assignments and
/// integer/real arithmetic.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Program file to run. Without a file or --expr a prompt is started.
    file: Option<PathBuf>,

    /// Evaluates a single bare expression.
    #[arg(short, long, conflicts_with = "file")]
    expr: Option<String>,

    /// Prints the syntax tree instead of running.
    #[arg(long, conflicts_with = "dot")]
    ast: bool,

    /// Prints the syntax tree as a Graphviz digraph instead of running.
    #[arg(long)]
    dot: bool,

    /// When to check variable references against the VAR section.
    #[arg(long, value_enum, default_value = "auto")]
    check: SemanticCheck,

    /// Renders errors with miette's graphical report handler.
    #[arg(long)]
    fancy: bool,

    /// Raises log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Run,
    Tree,
    Dot,
}

struct Session {
    options: Options,
    output: Output,
    fancy: bool,
    color: bool,
}

impl Session {
    fn new(args: &Args) -> Self {
        let output = if args.ast {
            Output::Tree
        } else if args.dot {
            Output::Dot
        } else {
            Output::Run
        };

        Self {
            options: Options {
                semantic_check: args.check,
            },
            output,
            fancy: args.fancy,
            color: std::io::stderr().is_terminal(),
        }
    }

    fn report(&self, error: &Error, filename: &str, source: &str) {
        let text = if self.fancy {
            format_report(error, filename, source)
        } else if self.color {
            format_diagnostic(error, filename, source)
        } else {
            format_plain_diagnostic(error, filename, source)
        };
        eprint!("{text}");
    }

    fn run_program(&self, source: &str, filename: &str) -> bool {
        let result = match self.output {
            Output::Run => run(source, &self.options).map(|scope| scope.to_string()),
            Output::Tree => parse_program(source).map(|p| printer::render_tree(&p)),
            Output::Dot => parse_program(source).map(|p| printer::render_dot(&p)),
        };
        self.finish(result, filename, source)
    }

    fn run_expression(&self, source: &str, filename: &str) -> bool {
        let result = match self.output {
            Output::Run => evaluate(source).map(|value| format!("{value}\n")),
            Output::Tree => parse_expression(source).map(|e| printer::render_expression_tree(&e)),
            Output::Dot => parse_expression(source).map(|e| printer::render_expression_dot(&e)),
        };
        self.finish(result, filename, source)
    }

    fn finish(&self, result: Result<String, Error>, filename: &str, source: &str) -> bool {
        match result {
            Ok(text) => {
                print!("{text}");
                true
            }
            Err(error) => {
                debug!(stage = error.stage(), "run failed");
                self.report(&error, filename, source);
                false
            }
        }
    }
}

fn interpret_from_file(session: &Session, path: &Path) -> bool {
    match std::fs::read_to_string(path) {
        Ok(source) => session.run_program(&source, &path.display().to_string()),
        Err(error) => {
            eprintln!("error reading file '{}': {}", path.display(), error);
            false
        }
    }
}

fn interpret_from_prompt(session: &Session) -> bool {
    let stdin = std::io::stdin();
    let mut input = String::new();

    loop {
        print!("minipascal> ");
        if std::io::stdout().flush().is_err() {
            return false;
        }

        // clear previous input
        input.clear();

        match stdin.read_line(&mut input) {
            Ok(0) => return true, // EOF
            Ok(_) => {}
            Err(error) => {
                eprintln!("error reading line: {}", error);
                return false;
            }
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            return true;
        }

        // every line starts over with an empty scope
        if starts_program(line) {
            session.run_program(line, "<stdin>");
        } else {
            session.run_expression(line, "<stdin>");
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let session = Session::new(&args);

    let ok = match (&args.expr, &args.file) {
        (Some(expr), _) => session.run_expression(expr, "<expr>"),
        (None, Some(path)) => interpret_from_file(&session, path),
        (None, None) => interpret_from_prompt(&session),
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

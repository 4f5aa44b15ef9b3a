mod ast;
mod config;
mod error;
mod eval;
mod host;
mod lexer;
mod parser;
mod scope;
mod source;
mod stdlib;
mod value;

use clap::Parser;
use config::LoopBudget;
use error::InterpreterError;
use scope::Scope;
use std::path::PathBuf;
use std::process::ExitCode;

/// A tree-walking interpreter for a small dynamically-typed scripting language.
#[derive(Parser, Debug)]
#[command(name = "amta")]
#[command(version = config::VERSION)]
#[command(about = "Runs a source file through the interpreter")]
struct CliArgs {
    /// Source file to execute
    #[arg(value_name = "FILE")]
    source_file: PathBuf,

    /// Maximum while-loop iterations per run; -1 disables the budget
    #[arg(long = "max_while_loops", value_name = "N", default_value_t = 10_000)]
    max_while_loops: i64,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let loop_budget = match LoopBudget::from_cli_arg(args.max_while_loops) {
        Ok(budget) => budget,
        Err(message) => {
            eprintln!("usage error: {message}");
            return ExitCode::from(1);
        }
    };

    let source = match std::fs::read_to_string(&args.source_file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!(
                "io error: cannot read {}: {e}",
                args.source_file.display()
            );
            return ExitCode::from(1);
        }
    };

    match run(&source, loop_budget) {
        Ok(result) => {
            println!("---");
            println!("{result}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(source: &str, loop_budget: LoopBudget) -> Result<value::Value, InterpreterError> {
    let cleaned = source::clean(source);
    let tokens = lexer::tokenize(&cleaned)?;
    let program = parser::parse(tokens)?;

    let global = Scope::new_global(loop_budget);
    stdlib::register_all(&global);

    eval::eval_program(&global, &program)
}

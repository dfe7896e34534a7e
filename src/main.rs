use std::fs::read_to_string;
use std::io::{BufRead, Write};
use std::path::Path;
use std::process::exit;
use std::{env, io};

use thiserror::Error;

use crate::parser::Parser;
use crate::printer::{AstPrinter, RpnPrinter};
use crate::repl::PromptInput;
use crate::scanner::tokenize;

mod ast;
mod parser;
mod printer;
mod repl;
mod scanner;
#[cfg(test)]
mod test_helpers;
mod token;

#[derive(Debug, Error)]
enum CLIError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("file does not seem to exist {0}")]
    FileDoesNotExist(String),
}

/// what `run` writes besides the rendered expressions.
#[derive(Debug, Default, Clone, Copy)]
struct RunOptions {
    dump_tokens: bool,
}

fn main() -> Result<(), color_eyre::eyre::Error> {
    color_eyre::install()?;

    let mut options = RunOptions::default();
    let mut args: Vec<String> = env::args().skip(1).collect();
    args.retain(|arg| {
        if arg == "--tokens" {
            options.dump_tokens = true;
            return false;
        }
        true
    });
    if args.len() > 1 {
        println!("Too many arguments received ({})", args.len());
        println!("Usage: lox_expr [--tokens] [script]");
        exit(64);
    }
    match args.first() {
        Some(file_path) => run_file(file_path, options)?,
        None => run_prompt(options)?,
    }
    Ok(())
}

fn run_file(path_string: &str, options: RunOptions) -> Result<(), CLIError> {
    let path = Path::new(path_string);
    if !path.try_exists()? {
        return Err(CLIError::FileDoesNotExist(path_string.to_string()));
    }
    let source = read_to_string(path)?;
    if !run(&source, options, &mut io::stdout().lock())? {
        exit(65);
    }
    Ok(())
}

fn run_prompt(options: RunOptions) -> Result<(), CLIError> {
    fn prompt() -> Result<(), CLIError> {
        print!("> ");
        io::stdout().flush()?;
        Ok(())
    }

    prompt()?;
    for line in PromptInput::new(io::stdin().lock().lines()) {
        // every line starts with a clean error state
        run(&line?, options, &mut io::stdout().lock())?;
        prompt()?;
    }
    Ok(())
}

/// Scan and parse `source`, then write each expression to `out` in prefix and postfix form,
/// preceded by the token stream when `options.dump_tokens` is set.
/// Diagnostics go to stderr. Returns false if any lexical or parse error was reported.
fn run<W: Write>(source: &str, options: RunOptions, out: &mut W) -> Result<bool, io::Error> {
    let mut had_error = false;
    let tokens = tokenize(source, |err| {
        report(err.line(), "", &err.to_string());
        had_error = true;
    });

    if options.dump_tokens {
        for token in &tokens {
            writeln!(out, "{token}")?;
        }
    }

    match Parser::new(tokens).parse_program() {
        Ok(expressions) => {
            for expr in expressions {
                writeln!(out, "{}", AstPrinter.print(&expr))?;
                writeln!(out, "{}", RpnPrinter.print(&expr))?;
            }
        }
        Err(errors) => {
            for error in errors {
                eprintln!("{error}");
            }
            had_error = true;
        }
    }
    Ok(!had_error)
}

fn report(line: usize, location: &str, message: &str) {
    eprintln!("[line {line}] Error{location}: {message}")
}

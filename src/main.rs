use anyhow::Context;
use clap::{Parser, Subcommand};
use rlox::{ExitStatus, Session};
use std::io::{stderr, stdout};
use std::path::PathBuf;

/// A tree-walking interpreter for the Lox language.
#[derive(Parser, Debug)]
#[command(name = "rlox", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the token stream of a source file, one token per line
    Tokenize { path: PathBuf },
    /// Print the parenthesised form of a single expression
    Parse { path: PathBuf },
    /// Evaluate a single expression and print its value
    Evaluate { path: PathBuf },
    /// Execute a Lox program
    Run { path: PathBuf },
}

impl Command {
    fn path(&self) -> &PathBuf {
        match self {
            Command::Tokenize { path }
            | Command::Parse { path }
            | Command::Evaluate { path }
            | Command::Run { path } => path,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let status = execute(&cli.command)?;
    std::process::exit(status.code());
}

fn execute(command: &Command) -> anyhow::Result<ExitStatus> {
    let path = command.path();
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut session = Session::new(stdout(), stderr());
    let status = match command {
        Command::Tokenize { .. } => session.tokenize(&source)?,
        Command::Parse { .. } => session.parse(&source)?,
        Command::Evaluate { .. } => session.evaluate(&source)?,
        Command::Run { .. } => session.run(&source)?,
    };
    Ok(status)
}

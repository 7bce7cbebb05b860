use std::{fs::read_to_string, path::PathBuf, process::ExitCode, rc::Rc, time::Instant};

use clap::{Parser, Subcommand};
use remc::{
    errors::diagnostics::{render_diagnostics, render_error},
    lexer::lexer::tokenize,
    parser::parser::parse,
    solver::solver::SolverConfig,
    type_checker::type_checker::TypeChecker,
};
use tracing::{debug, error, info};

#[derive(Parser)]
#[command(name = "remc")]
#[command(about = "Semantic checker for rem programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Type check a source file
    Check {
        file: PathBuf,

        /// Upper bound on rule executions
        #[arg(long, default_value_t = SolverConfig::default().max_rule_runs)]
        max_rule_runs: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {}", err);
    }

    match cli.command {
        Command::Check {
            file,
            max_rule_runs,
        } => check(file, SolverConfig { max_rule_runs }),
    }
}

fn check(path: PathBuf, config: SolverConfig) -> ExitCode {
    let display_path = path.to_string_lossy().to_string();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| display_path.clone());

    let source = match read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            error!(file = %display_path, "failed to read file: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();

    let tokens = match tokenize(source.clone(), Some(file_name.clone())) {
        Ok(tokens) => tokens,
        Err(err) => {
            println!("{}", render_error(&err, &source, &display_path));
            return ExitCode::FAILURE;
        }
    };
    debug!(tokens = tokens.len(), elapsed = ?start.elapsed(), "tokenized");

    let parse_start = Instant::now();
    let (_, parsed) = parse(tokens, Rc::new(file_name));
    let root = match parsed {
        Ok(root) => root,
        Err(err) => {
            println!("{}", render_error(&err, &source, &display_path));
            return ExitCode::FAILURE;
        }
    };
    debug!(elapsed = ?parse_start.elapsed(), "parsed");

    let check_start = Instant::now();
    let mut checker = TypeChecker::with_config(config);
    checker.analyze(&root);
    debug!(elapsed = ?check_start.elapsed(), "type checked");

    let diagnostics = checker.diagnostics();
    if !diagnostics.is_empty() {
        println!("{}", render_diagnostics(diagnostics, &source, &display_path));
        info!(
            errors = diagnostics.len(),
            elapsed = ?start.elapsed(),
            "check failed"
        );
        return ExitCode::FAILURE;
    }

    println!("{}: ok", display_path);
    info!(elapsed = ?start.elapsed(), "check finished");
    ExitCode::SUCCESS
}

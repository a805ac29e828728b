use clap::Parser;
use owo_colors::OwoColorize;
use slox::cli::{generate_completions, Args, Commands};
use slox::config::{AppConfig, Mode};
use slox::diagnostic::{DiagnosticRenderer, Diagnostics};
use slox::format::{print_slot, tokens_to_json};
use slox::interpreter::Interpreter;
use std::io::{self, BufRead, Stdout, Write};
use std::path::Path;
use std::process::ExitCode;

/// A lexical, syntax or runtime error occurred while running a script.
const EXIT_DATA_ERROR: u8 = 65;
/// The script could not be read.
const EXIT_IO_ERROR: u8 = 74;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return ExitCode::SUCCESS;
    }

    let config = AppConfig::from_args(&args);
    init_tracing(&config);

    match &args.script {
        Some(path) => run_file(path, &config),
        None => run_prompt(&config),
    }
}

/// `--verbose` turns on debug logs for this crate; otherwise `RUST_LOG` decides and logging
/// stays off when it is unset.
fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if config.verbose {
        EnvFilter::new("slox=debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        return;
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true)
                .with_ansi(config.color_enabled),
        )
        .with(filter)
        .init();
}

fn run_file(path: &Path, config: &AppConfig) -> ExitCode {
    tracing::debug!(path = %path.display(), "reading script");
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            error_message(config, &format!("Could not read {}: {}", path.display(), e));
            return ExitCode::from(EXIT_IO_ERROR);
        }
    };

    let mut interpreter = Interpreter::new(io::stdout());
    let mut diagnostics = reporting_diagnostics(config);
    submit(&source, &mut interpreter, &mut diagnostics, config);

    if diagnostics.had_error() || diagnostics.had_runtime_error() {
        ExitCode::from(EXIT_DATA_ERROR)
    } else {
        ExitCode::SUCCESS
    }
}

fn run_prompt(config: &AppConfig) -> ExitCode {
    tracing::debug!("entering interactive mode");
    let mut interpreter = Interpreter::new(io::stdout());
    let mut diagnostics = reporting_diagnostics(config);
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        print!("> ");
        if let Err(e) = io::stdout().flush() {
            error_message(config, &format!("Error writing prompt: {}", e));
            break;
        }

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                submit(&line, &mut interpreter, &mut diagnostics, config);
                diagnostics.reset();
            }
            Err(e) => {
                error_message(config, &format!("Error reading input: {}", e));
                break;
            }
        }
    }

    ExitCode::SUCCESS
}

/// Handle one independent submission according to the configured mode.
fn submit(source: &str, interpreter: &mut Interpreter<Stdout>, diagnostics: &mut Diagnostics, config: &AppConfig) {
    match config.mode {
        Mode::Run => {
            slox::run(source, interpreter, diagnostics);
            tracing::debug!(globals = ?interpreter.environment().bindings(), "submission finished");
        }
        Mode::Tokens => {
            let tokens = slox::tokenize(source, diagnostics);
            let json = tokens_to_json(&tokens);
            match serde_json::to_string_pretty(&json) {
                Ok(text) => println!("{}", text),
                Err(e) => error_message(config, &format!("Error serializing tokens: {}", e)),
            }
        }
        Mode::Ast => {
            let tokens = slox::tokenize(source, diagnostics);
            for slot in slox::parse(tokens, diagnostics) {
                println!("{}", print_slot(&slot));
            }
        }
    }
}

fn reporting_diagnostics(config: &AppConfig) -> Diagnostics {
    let renderer = DiagnosticRenderer::new(config.color_enabled);
    Diagnostics::with_reporter(move |diagnostic| eprintln!("{}", renderer.render(diagnostic)))
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}

//! Vela CLI.
//!
//! Front-end driver around the scanner: `vela tokens <file>` dumps the
//! positioned token stream, `vela check <file>` reports scan-time
//! diagnostics. The exit code reflects the presence of error tokens, so
//! both commands work in CI pipelines.

use std::process::ExitCode;

use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    match args[1].as_str() {
        "tokens" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: vela tokens <file.vela>");
                return ExitCode::FAILURE;
            };
            tokens_file(path)
        }
        "check" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: vela check <file.vela>");
                return ExitCode::FAILURE;
            };
            check_file(path)
        }
        other => {
            eprintln!("error: unknown command `{other}`");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!("Vela compiler front end");
    eprintln!();
    eprintln!("Usage: vela <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  tokens <file>   Dump the token stream");
    eprintln!("  check <file>    Scan and report diagnostics");
}

fn read_file(path: &str) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })
}

/// Scan a file and display the token stream.
fn tokens_file(path: &str) -> ExitCode {
    let source = match read_file(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let tokens = vela_lexer::lex(&source);
    debug!(count = tokens.len(), path, "scanned");

    println!("Tokens for '{}' ({} tokens):", path, tokens.len());
    for tok in &tokens {
        println!(
            "  {:>8}  {:<16} {:<6} {:?}",
            tok.pos.to_string(),
            tok.kind.name(),
            tok.state.to_string(),
            tok.text(&source),
        );
    }

    report_errors(path, &tokens, &source)
}

/// Scan a file and report diagnostics only.
fn check_file(path: &str) -> ExitCode {
    let source = match read_file(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let tokens = vela_lexer::lex(&source);
    if !tokens.has_errors() {
        println!("{}: ok ({} tokens)", path, tokens.len());
        return ExitCode::SUCCESS;
    }
    report_errors(path, &tokens, &source)
}

fn report_errors(path: &str, tokens: &vela_ir::TokenList, source: &str) -> ExitCode {
    let mut failed = false;
    for err in tokens.errors() {
        failed = true;
        let message = err
            .diagnostic
            .as_deref()
            .map_or("scan error", |d| d.message.as_str());
        eprintln!("{}:{}: error: {}", path, err.pos, message);
        let text = err.text(source);
        if !text.is_empty() {
            eprintln!("    offending text: {text:?}");
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

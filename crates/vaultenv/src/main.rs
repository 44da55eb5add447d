//! vaultenv CLI entry point

// CLI binary needs to output to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use vaultenv::cli::{Cli, CliError, EXIT_FATAL, EXIT_OK, OkEnvelope, render_error};
use vaultenv::credentials::CredentialStore;
use vaultenv::picker::FuzzyPicker;
use vaultenv::pull::{self, PullSummary};
use vaultenv::tracing::init_tracing;

fn main() {
    // Tracing may be unusable during a panic, so write directly.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = Cli::parse();

    // A bad filter leaves logging off; the pull itself still runs.
    if let Err(e) = init_tracing(cli.tracing_config()) {
        eprintln!("Warning: logging disabled: {e}");
    }

    std::process::exit(run_with_tokio(&cli));
}

/// Single-threaded runtime; every step is awaited in order.
fn run_with_tokio(cli: &Cli) -> i32 {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            render_error(
                &CliError::io(format!("Failed to create tokio runtime: {e}")),
                cli.json,
            );
            return EXIT_FATAL;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(summary) => {
            if cli.json {
                match serde_json::to_string(&OkEnvelope::new(&summary)) {
                    Ok(json) => println!("{json}"),
                    Err(_) => eprintln!("Error serializing result"),
                }
            } else {
                eprintln!("{summary}");
            }
            EXIT_OK
        }
        Err(err) => {
            tracing::debug!(code = err.code(), "Pull failed");
            render_error(&err, cli.json);
            EXIT_FATAL
        }
    }
}

async fn run(cli: &Cli) -> Result<PullSummary, CliError> {
    let store = match &cli.config {
        Some(path) => CredentialStore::new(path),
        None => CredentialStore::in_home_dir()?,
    }
    .with_prompt_stream(cli.prompt_stream());
    tracing::debug!(config = %store.path().display(), "Using credential file");

    let mut picker = FuzzyPicker::new();
    pull::run(&cli.pull_options(), &store, &mut picker).await
}

mod app;
mod output;

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use clap::Parser;
use crc_crack::{ConstraintBuilder, Enumerator, SearchOutcome};
use crc_crack_solver::create_session;
use tracing_subscriber::EnvFilter;

use crate::app::Cli;
use crate::output::Reporter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.search_config();
    for issue in config.validate() {
        tracing::warn!("{issue}; no string can match");
    }
    let constraints = ConstraintBuilder::new(&config).build();

    if cli.emit_smt {
        print!("{}", constraints.to_script());
        return Ok(());
    }

    // First Ctrl+C stops before the next check; a second one exits at once.
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            eprintln!("\nCancelled.");
            std::process::exit(130);
        }
    })
    .context("failed to set Ctrl+C handler")?;

    let session = create_session(cli.solver, cli.solver_path.clone(), cli.timeout)
        .with_context(|| format!("failed to start {}", cli.solver))?;
    let mut enumerator = Enumerator::new(session, constraints)?.with_cancel(Arc::clone(&cancel));

    let stdout = io::stdout();
    let interactive = stdout.is_terminal();
    let mut reporter = Reporter::new(stdout.lock(), interactive, config.plaintext.is_none());
    reporter.cracking(config.target);

    let outcome = enumerator.search(&cli.stop_policy(), |c| reporter.candidate(c));

    if let Some(e) = reporter.take_error()
        && e.kind() != io::ErrorKind::BrokenPipe
    {
        return Err(e).context("failed to write candidate");
    }

    match outcome {
        Ok(SearchOutcome::Found(candidate)) => reporter.success(&candidate),
        Ok(SearchOutcome::Exhausted { .. }) => reporter.done(),
        Ok(SearchOutcome::LimitReached { emitted }) => reporter.limit_reached(emitted),
        Ok(SearchOutcome::Cancelled { emitted }) => reporter.cancelled(emitted),
        // Ctrl+C also interrupts the solver subprocess, which then fails.
        Err(e) if cancel.load(Ordering::SeqCst) => {
            tracing::debug!("solver stopped by cancellation: {e}");
            reporter.cancelled(enumerator.emitted());
        }
        Err(e) => return Err(e).context("search failed"),
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    // RUST_LOG overrides; --verbose raises our crates to debug.
    let default = if verbose {
        "warn,crc_crack=debug,crc_crack_solver=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

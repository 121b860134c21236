//! Structured logging setup for the acp CLI.

use std::io::IsTerminal;

use tracing::{Level, span};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Returns true if colored output should be used: stdout is a TTY and
/// `NO_COLOR` is unset.
#[must_use]
pub fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Initialize the global tracing subscriber.
///
/// `verbose` selects a more detailed compact format with targets enabled;
/// otherwise the format is a terse, human-readable line per event. Honors
/// `RUST_LOG` when set.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("acp=debug,info")
        } else {
            EnvFilter::new("acp=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_thread_ids(false)
                .with_line_number(false)
                .with_ansi(use_color())
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// A span carrying the run id and phase name, attached to every node
/// execution so logs can be correlated across a run.
#[must_use]
pub fn run_span(run_id: &str, phase: &str) -> tracing::Span {
    span!(Level::INFO, "phase_execution", run_id = %run_id, phase = %phase)
}

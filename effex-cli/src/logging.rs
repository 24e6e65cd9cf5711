//! Logging setup
//!
//! Diagnostics go to stderr so the generated-file listing on stdout stays
//! clean. `RUST_LOG` takes precedence over the verbosity flag, and
//! `EFFEX_LOG_FORMAT=json` selects structured output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable selecting the log format
pub const LOG_FORMAT_ENV: &str = "EFFEX_LOG_FORMAT";

/// Initialize the tracing subscriber
///
/// Repeated calls are harmless; only the first one installs a subscriber.
///
/// # Example
///
/// ```rust,no_run
/// # fn main() -> anyhow::Result<()> {
/// effex_cli::logging::init(false)?;
/// tracing::warn!("visible by default");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if `RUST_LOG` holds an invalid filter directive.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let env_filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)?,
        _ => EnvFilter::new(default_directive(verbose)),
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if json_requested(std::env::var(LOG_FORMAT_ENV).ok().as_deref()) {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

const fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

fn json_requested(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}

//! Diagnostic tracing for the dispatcher.
//!
//! The harness inherits stdout and stderr untouched; dispatcher events go to
//! stderr only and stay silent below `warn` unless `RUST_LOG` asks for more.
//!
//! | level | events |
//! |-------|--------|
//! | error | harness missing, not executable, or failed to spawn |
//! | warn  | harness killed on timeout, arguments after the target ignored |
//! | info  | dispatch finished with its exit code |
//! | debug | resolved script, dispatch context, planned invocation, harness exit |

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "warn";

/// Build the event filter from a raw `RUST_LOG` value.
pub fn filter_from(raw: Option<&str>) -> EnvFilter {
    raw.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the stderr subscriber.
///
/// ```bash
/// RUST_LOG=dispatcher=debug ./mxs585.py smoke
/// ```
pub fn init() {
    let raw = std::env::var("RUST_LOG").ok();
    tracing_subscriber::registry()
        .with(filter_from(raw.as_deref()))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

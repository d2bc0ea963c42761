use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Target prefixes of the workspace crates whose events this layer renders.
pub const TARGET_PREFIXES: [&str; 4] = ["ai_llm_service", "rag_store", "contextor", "rag_query"];

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

fn is_workspace_target(target: &str) -> bool {
    TARGET_PREFIXES.iter().any(|p| target.starts_with(p))
}

/// Build a formatting layer that renders ONLY events emitted by the workspace crates.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with `file:line` and target
/// - Span close events (duration of instrumented calls)
/// - Writes to stderr; ANSI colors only when stderr is a terminal
///
/// Stdout stays reserved for the final answer.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stderr().is_terminal();

    let only_workspace = filter::filter_fn(|meta| is_workspace_target(meta.target()));

    fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(
            fmt::format()
                .compact()
                .with_timer(ChronoRfc3339Utc)
                .with_level(true)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with_filter(only_workspace)
}

/// Level directives for every workspace crate, e.g. `contextor=debug`.
///
/// # Errors
/// Never fails for the built-in prefixes; the `Result` mirrors `Directive::from_str`.
pub fn level_directives(level: Level) -> Result<Vec<Directive>, ParseError> {
    let lvl = level.as_str().to_lowercase();
    TARGET_PREFIXES
        .iter()
        .map(|p| Directive::from_str(&format!("{p}={lvl}")))
        .collect()
}

/// Create an `EnvFilter` from `RUST_LOG` or the fallback `default`, then apply a
/// level for the workspace crates only.
///
/// `RUST_LOG` wins when it is set: the per-crate directives are only added on
/// the fallback path.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return from_env;
    }
    let mut base = EnvFilter::new(default);
    if let Ok(directives) = level_directives(level) {
        for d in directives {
            base = base.add_directive(d);
        }
    }
    base
}

//! Tracing setup shared by the backend binary.
//!
//! Events are rendered on a single line with RFC3339 UTC timestamps. The
//! filter comes from `RUST_LOG`, falling back to the given default, and the
//! workspace crates can be raised to a different level than dependencies.

use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Targets of the workspace crates, used for per-crate level directives.
pub const WORKSPACE_TARGETS: &[&str] = &[
    "classybot_backend",
    "ai_llm_service",
    "knowledge_base",
    "chat_history",
    "answer_engine",
    "api",
];

/// RFC3339 UTC timer, e.g. `2025-09-12T10:20:30Z`.
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let s = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Compact formatting layer with target, `file:line`, and span close timings.
///
/// ANSI colors are used only when stdout is a terminal.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(io::stdout().is_terminal())
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .compact()
}

/// Builds `<target>=<level>` directives for every workspace crate.
pub fn workspace_directives(level: Level) -> Vec<Directive> {
    let lvl = level.as_str().to_lowercase();
    WORKSPACE_TARGETS
        .iter()
        .filter_map(|t| format!("{t}={lvl}").parse().ok())
        .collect()
}

/// `RUST_LOG` (or `default`) plus workspace crates at `level`.
///
/// Explicit `RUST_LOG` wins: the workspace directives are only added when the
/// variable is unset.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => workspace_directives(level)
            .into_iter()
            .fold(EnvFilter::new(default), EnvFilter::add_directive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_every_workspace_crate() {
        let d = workspace_directives(Level::DEBUG);
        assert_eq!(d.len(), WORKSPACE_TARGETS.len());
        assert!(d.iter().any(|d| d.to_string() == "answer_engine=debug"));
    }
}

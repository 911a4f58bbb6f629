use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Crate target prefix used to filter only library-originated logs.
pub const TARGET_PREFIX: &str = "ai_llm_service";

/// RFC3339 UTC timer, e.g. `2025-09-12T10:20:30Z`.
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        w.write_str(&now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }
}

/// Returns true when an event or span originates from this crate.
pub fn is_own_target(target: &str) -> bool {
    target.starts_with(TARGET_PREFIX)
}

/// Library-scoped formatting layer that renders ONLY events emitted by this crate.
///
/// Compact single-line output with `file:line`, span-close durations (so every
/// `#[instrument]`ed generation call logs its latency), and ANSI colors only on
/// a terminal. Compose it next to the application's own fmt layer, which should
/// exclude [`TARGET_PREFIX`] to avoid duplicate lines.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let only_this_crate = filter::filter_fn(|meta| is_own_target(meta.target()));

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(io::stdout().is_terminal())
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_this_crate)
}

/// EnvFilter from `RUST_LOG` or `default`, with `level` applied to this crate.
///
/// `env_filter_with_level("info", Level::DEBUG)` shows INFO globally and
/// DEBUG for `ai_llm_service`.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    let own = format!("{TARGET_PREFIX}={}", level.as_str().to_lowercase());
    EnvFilter::try_new(format!("{base},{own}")).unwrap_or_else(|_| EnvFilter::new(own))
}

//! Logging helpers shared by the binary and the library crates.
//!
//! The bot's own crates log through a compact, RFC3339-stamped layer; third
//! party crates (hyper, reqwest, ...) only pass through the global filter.

use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Log targets (crate names) that belong to the bot.
pub const BOT_TARGETS: &[&str] = &[
    "mse_advisor_bot",
    "api",
    "advisor",
    "doc_store",
    "messenger",
    "ai_llm_service",
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

fn is_bot_target(target: &str) -> bool {
    BOT_TARGETS
        .iter()
        .any(|t| target == *t || target.starts_with(&format!("{t}::")))
}

/// Formatting layer for events emitted by the bot's crates.
///
/// Compact single line, `file:line`, span close timings, ANSI only on a tty.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let only_bot = filter::filter_fn(|meta| is_bot_target(meta.target()));

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(io::stdout().is_terminal())
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_bot)
}

/// Plain layer for everything else (warnings from hyper, reqwest, ...).
pub fn external_layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_ansi(io::stdout().is_terminal())
        .compact()
        .with_filter(filter::filter_fn(|meta| !is_bot_target(meta.target())))
}

/// Directives raising every bot crate to `level`.
pub fn bot_directives(level: Level) -> Vec<Directive> {
    BOT_TARGETS
        .iter()
        .filter_map(|t| format!("{t}={}", level.as_str().to_lowercase()).parse().ok())
        .collect()
}

/// `RUST_LOG` when set, otherwise `default`, with the bot crates at `level`.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .parse_lossy(default)
    });
    bot_directives(level)
        .into_iter()
        .fold(base, |f, d| f.add_directive(d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_targets_match_module_paths() {
        assert!(is_bot_target("doc_store::index"));
        assert!(is_bot_target("api"));
        assert!(!is_bot_target("hyper::proto"));
        assert!(!is_bot_target("apistuff"));
    }

    #[test]
    fn directives_cover_every_crate() {
        let d = bot_directives(Level::DEBUG);
        assert_eq!(d.len(), BOT_TARGETS.len());
        assert!(d.iter().any(|d| d.to_string() == "doc_store=debug"));
    }
}

//! Stderr logger for the `chessfen` tools.
//!
//! Records from `chessfen*` targets are shown down to the configured level;
//! everything else (image decoders, etc.) is capped at `warn`. Lines look like
//! `[  0.012s DEBUG pipeline] message`, with the crate prefix dropped from the
//! target. Library code only uses the `log` macros and never installs a logger.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

const OWN_PREFIX: &str = "chessfen";

struct StderrLogger {
    own: LevelFilter,
    foreign: LevelFilter,
    started: Instant,
}

impl StderrLogger {
    fn limit_for(&self, target: &str) -> LevelFilter {
        if target.starts_with(OWN_PREFIX) {
            self.own
        } else {
            self.foreign
        }
    }
}

fn short_target(target: &str) -> &str {
    match target.split_once("::") {
        Some((krate, rest)) if krate.starts_with(OWN_PREFIX) => rest,
        _ => target,
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.limit_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let t = self.started.elapsed().as_secs_f64();
        let _ = writeln!(
            std::io::stderr().lock(),
            "[{t:7.3}s {:>5} {}] {}",
            record.level(),
            short_target(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger; `chessfen` records pass at `level`, others at `warn` at most.
///
/// Only the first call installs anything; later calls return `Ok(())`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| StderrLogger {
        own: level,
        foreign: level.min(LevelFilter::Warn),
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Map a `-v` count to a level: 0 → warn, 1 → info, 2 → debug, 3+ → trace.
pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    [Level::Warn, Level::Info, Level::Debug, Level::Trace]
        .get(usize::from(verbose))
        .copied()
        .unwrap_or(Level::Trace)
        .to_level_filter()
}

/// Install a `tracing-subscriber` fmt subscriber on stderr.
///
/// `RUST_LOG` wins when set; the fallback shows `chessfen` spans at `info`
/// and other crates at `warn`. With `json` each event is one flattened object.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,chessfen=info,chessfen_core=info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

use std::{
    env,
    io::Write,
    sync::atomic::{AtomicBool, Ordering},
};

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    fmt::{
        format::{Format, Writer},
        MakeWriter,
    },
    EnvFilter,
};

static SHUTTING_DOWN: Lazy<AtomicBool> = Lazy::new(|| AtomicBool::new(false));

/// Crates that log every rpc round trip. The relay loop polls each node every interval, so they
/// stay at `warn` unless `RUST_LOG` names them.
const RPC_TRANSPORT_TARGETS: &[&str] =
    &["hyper", "hyper_util", "reqwest", "alloy_transport_http", "alloy_rpc_client"];

/// Stdout writer that buffers while the networks are running and writes straight through once
/// teardown has started, so the node and proxy shutdown lines are not lost on exit.
struct LocalnetWriter {
    buffer: std::io::BufWriter<std::io::Stdout>,
}

impl LocalnetWriter {
    fn new() -> Self {
        Self { buffer: std::io::BufWriter::new(std::io::stdout()) }
    }
}

impl Write for LocalnetWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if SHUTTING_DOWN.load(Ordering::Relaxed) {
            std::io::stdout().lock().write(buf)
        } else {
            self.buffer.write(buf)
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if SHUTTING_DOWN.load(Ordering::Relaxed) {
            std::io::stdout().lock().flush()
        } else {
            self.buffer.flush()
        }
    }
}

struct LocalnetWriterMaker;

impl<'a> MakeWriter<'a> for LocalnetWriterMaker {
    type Writer = LocalnetWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LocalnetWriter::new()
    }
}

fn format_timestamp(now: NaiveDateTime, shutting_down: bool) -> String {
    if shutting_down {
        now.format("%H:%M:%S").to_string()
    } else {
        format!("{} - {}", now.format("%d %B"), now.format("%H:%M:%S%.6f"))
    }
}

struct LocalnetTimer;

impl tracing_subscriber::fmt::time::FormatTime for LocalnetTimer {
    fn format_time(&self, writer: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now().naive_local();
        write!(writer, "{}", format_timestamp(now, SHUTTING_DOWN.load(Ordering::Relaxed)))
    }
}

/// `log_level` for everything, the rpc transport crates capped at `warn`, then any `RUST_LOG`
/// directives.
fn log_directives(log_level: LevelFilter, rust_log: Option<&str>) -> String {
    let mut directives = vec![log_level.to_string().to_lowercase()];
    directives.extend(RPC_TRANSPORT_TARGETS.iter().map(|target| format!("{}=warn", target)));
    if let Some(rust_log) = rust_log.map(str::trim).filter(|rust_log| !rust_log.is_empty()) {
        directives.push(rust_log.to_string());
    }
    directives.join(",")
}

/// Installs the global tracing subscriber.
///
/// A `RUST_LOG` that does not parse is ignored. Calling this more than once is a no-op, which
/// lets both the CLI and embedding test harnesses call it freely.
pub fn setup_logger(log_level: LevelFilter) {
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::try_new(log_directives(log_level, rust_log.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(log_directives(log_level, None)));

    let format = Format::default().with_timer(LocalnetTimer).with_level(true).with_target(false);

    let subscriber = tracing_subscriber::fmt()
        .with_writer(LocalnetWriterMaker)
        .with_env_filter(filter)
        .event_format(format)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub fn setup_info_logger() {
    setup_logger(LevelFilter::INFO);
}

/// Switches logging to unbuffered output with the short timestamp format.
pub fn mark_shutdown_started() {
    SHUTTING_DOWN.store(true, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn timestamps_shorten_once_shutdown_starts() {
        let now =
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_micro_opt(9, 4, 2, 17).unwrap();

        assert_eq!(format_timestamp(now, false), "05 March - 09:04:02.000017");
        assert_eq!(format_timestamp(now, true), "09:04:02");
    }

    #[test]
    fn rpc_transport_noise_is_capped_below_the_level() {
        let directives = log_directives(LevelFilter::DEBUG, None);

        assert!(directives.starts_with("debug,"));
        assert!(directives.contains("alloy_transport_http=warn"));
        assert!(directives.contains("hyper=warn"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn rust_log_directives_come_last() {
        let directives = log_directives(LevelFilter::INFO, Some(" reqwest=debug "));
        assert!(directives.ends_with(",reqwest=debug"));

        assert_eq!(
            log_directives(LevelFilter::INFO, Some("")),
            log_directives(LevelFilter::INFO, None)
        );
    }
}

//! Logging setup.
//!
//! Two sinks:
//! - a daily-rolling file of one-line JSON events (always)
//! - coloured human-readable stdout (debug builds only)
//!
//! Every JSON line carries timestamp, level, target, pid, tid, file/line,
//! message, structured fields and the crate version. `log` macros are bridged
//! into `tracing` so both styles end up in the same place.

use log::LevelFilter;
use std::path::Path;
use std::sync::OnceLock;
use tracing::Level;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

const LOG_FILE_PREFIX: &str = "loyalty.log";

static LOGGER_READY: OnceLock<()> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. Calling it again is a no-op.
pub fn init_logger(log_dir: &Path) -> anyhow::Result<()> {
    if LOGGER_READY.get().is_some() {
        return Ok(());
    }

    std::fs::create_dir_all(log_dir)?;

    let _ = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init();

    let file_appender = rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // Dropping the guard would stop the background writer
    let _ = FILE_GUARD.set(guard);

    let json_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(JsonFormatter::new())
        .with_filter(default_filter());

    let stdout_layer = if cfg!(debug_assertions) {
        Some(
            fmt::layer()
                .with_writer(std::io::stdout)
                .event_format(HumanReadableFormatter::new())
                .with_filter(default_filter()),
        )
    } else {
        None
    };

    let subscriber = Registry::default().with(json_layer).with(stdout_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    let _ = LOGGER_READY.set(());

    tracing::info!(
        target: "loyalty::logging",
        log_dir = %log_dir.display(),
        version = env!("CARGO_PKG_VERSION"),
        profile = if cfg!(debug_assertions) { "debug" } else { "release" },
        "Logger initialized"
    );

    Ok(())
}

/// `RUST_LOG` wins; otherwise debug builds are chattier for our own crates.
fn default_filter() -> EnvFilter {
    let default_directives = if cfg!(debug_assertions) {
        "info,loyalty=debug,loyalty_lib=debug,loyalty_infrastructure=debug"
    } else {
        "info"
    };

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

struct JsonFormatter {
    pid: u32,
    version: &'static str,
}

impl JsonFormatter {
    fn new() -> Self {
        Self {
            pid: std::process::id(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let line = render_json_line(event, self.pid, self.version);
        writeln!(writer, "{}", line)
    }
}

fn render_json_line(event: &Event<'_>, pid: u32, version: &str) -> String {
    let metadata = event.metadata();
    let timestamp = chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        .to_string();

    let mut json = serde_json::json!({
        "timestamp": timestamp,
        "level": metadata.level().to_string(),
        "pid": pid,
        "tid": format!("{:?}", std::thread::current().id()),
        "target": metadata.target(),
        "version": version,
    });

    if let Some(file) = metadata.file() {
        json["file"] = serde_json::json!(file);
    }
    if let Some(line) = metadata.line() {
        json["line"] = serde_json::json!(line);
    }

    let mut visitor = JsonVisitor::new();
    event.record(&mut visitor);

    if let Some(message) = visitor.fields.remove("message") {
        json["message"] = message;
    }
    if !visitor.fields.is_empty() {
        json["fields"] = serde_json::Value::Object(visitor.fields);
    }

    serde_json::to_string(&json).unwrap_or_default()
}

/// `2024-03-01 10:32:15.123 [INFO] (loyalty::http) pid=1 tid=ThreadId(7) wallet=0xabc - message (src/x.rs:12)`
struct HumanReadableFormatter {
    pid: u32,
}

impl HumanReadableFormatter {
    fn new() -> Self {
        Self {
            pid: std::process::id(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for HumanReadableFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        let level = match *metadata.level() {
            Level::ERROR => "\x1b[31mERROR\x1b[0m",
            Level::WARN => "\x1b[33mWARN\x1b[0m",
            Level::INFO => "\x1b[32mINFO\x1b[0m",
            Level::DEBUG => "\x1b[36mDEBUG\x1b[0m",
            Level::TRACE => "\x1b[35mTRACE\x1b[0m",
        };

        let mut visitor = JsonVisitor::new();
        event.record(&mut visitor);

        let message = visitor
            .fields
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let fields: String = visitor
            .fields
            .iter()
            .map(|(key, value)| format!(" {}={}", key, value))
            .collect();

        let location = match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => format!(" ({}:{})", file, line),
            _ => String::new(),
        };

        writeln!(
            writer,
            "{} [{}] ({}) pid={} tid={:?}{} - {}{}",
            timestamp,
            level,
            metadata.target(),
            self.pid,
            std::thread::current().id(),
            fields,
            message,
            location
        )
    }
}

/// Collects event fields into a JSON map
struct JsonVisitor {
    fields: serde_json::Map<String, serde_json::Value>,
}

impl JsonVisitor {
    fn new() -> Self {
        Self {
            fields: serde_json::Map::new(),
        }
    }

    fn insert(&mut self, field: &tracing::field::Field, value: serde_json::Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl tracing::field::Visit for JsonVisitor {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.insert(field, serde_json::json!(format!("{:?}", value)));
    }
}

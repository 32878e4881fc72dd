//! Structured logging on top of `tracing-subscriber`.
//!
//! Every event becomes a single JSON object on its own line:
//!
//! ```text
//! {"timestamp":"2024-05-01T10:00:00.123Z","level":"info","service":"api","message":"..."}
//! ```
//!
//! Event fields other than the message are appended as extra keys. Fields
//! clashing with the fixed keys are written as `field.<name>`.

use std::{fmt, io};

use serde::Serialize;
use serde_json::{Map, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{
    field::{Field, Visit},
    Event, Subscriber,
};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields, MakeWriter},
    layer::SubscriberExt as _,
    registry::LookupSpan,
    util::{SubscriberInitExt as _, TryInitError},
    Layer,
};

#[derive(Clone, Debug)]
pub struct Config {
    pub level: LevelFilter,
    /// Label attached to every line as `service`.
    pub service: String,
}

/// Installs the global subscriber writing to stdout.
///
/// Fails if a global subscriber has already been set.
pub fn init(config: &Config) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(layer(config, io::stdout))
        .try_init()
}

pub fn layer<S, W>(config: &Config, make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer::<S>()
        .event_format(JsonLines {
            service: config.service.clone(),
        })
        .with_writer(make_writer)
        .with_filter(config.level)
}

struct JsonLines {
    service: String,
}

#[derive(Serialize)]
struct Line<'a> {
    timestamp: String,
    level: String,
    service: &'a str,
    message: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl<S, N> FormatEvent<S, N> for JsonLines
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|_| fmt::Error)?;

        let mut fields = Fields::default();
        event.record(&mut fields);

        let line = Line {
            timestamp,
            level: event.metadata().level().as_str().to_ascii_lowercase(),
            service: &self.service,
            message: fields.message,
            fields: fields.rest,
        };
        let line = serde_json::to_string(&line).map_err(|_| fmt::Error)?;

        writeln!(writer, "{line}")
    }
}

const RESERVED: [&str; 3] = ["timestamp", "level", "service"];

#[derive(Default)]
struct Fields {
    message: String,
    rest: Map<String, Value>,
}

impl Fields {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = match value {
                Value::String(s) => s,
                v => v.to_string(),
            };
        } else if RESERVED.contains(&field.name()) {
            self.rest.insert(format!("field.{}", field.name()), value);
        } else {
            self.rest.insert(field.name().to_owned(), value);
        }
    }
}

impl Visit for Fields {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}

//! Helpers for capturing log output in unit tests.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use serde_json::Value;
use tracing::Subscriber;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt as _};

use crate::logger;

/// In-memory sink for [`logger::layer`].
#[derive(Clone, Default)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    /// Subscriber writing JSON lines for `service` into this buffer.
    pub fn subscriber(
        &self,
        level: LevelFilter,
        service: &str,
    ) -> impl Subscriber + Send + Sync {
        let writer = self.clone();
        let config = logger::Config {
            level,
            service: service.to_owned(),
        };
        tracing_subscriber::registry()
            .with(logger::layer(&config, move || writer.clone()))
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<Value> {
        self.text()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

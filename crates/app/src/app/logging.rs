use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

const MAX_LOG_LINES: usize = 500;

/// Events from crates outside the workspace are capped at this level.
const FOREIGN_LEVEL: Level = Level::WARN;

#[derive(Clone)]
pub(crate) struct ConsoleBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl ConsoleBuffer {
    pub(crate) fn new() -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub(crate) fn push_line(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push_back(line);
            while lines.len() > MAX_LOG_LINES {
                lines.pop_front();
            }
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.iter().cloned().collect())
            .unwrap_or_default()
    }
}

struct ConsoleMakeWriter {
    buffer: ConsoleBuffer,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            buffer: self.buffer.clone(),
        }
    }
}

struct ConsoleWriter {
    buffer: ConsoleBuffer,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        for line in text.lines() {
            self.buffer.push_line(line.to_string());
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = io::stdout().write_all(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        #[cfg(not(target_arch = "wasm32"))]
        let _ = io::stdout().flush();
        Ok(())
    }
}

pub(crate) fn setup_tracing() -> (ConsoleBuffer, Arc<AtomicU8>) {
    let console = ConsoleBuffer::new();
    let log_level_state = Arc::new(AtomicU8::new(level_filter_to_u8(LevelFilter::INFO)));
    let filter_state = log_level_state.clone();
    let filter_layer = tracing_subscriber::filter::filter_fn(move |metadata| {
        let level = level_from_u8(filter_state.load(Ordering::Relaxed));
        let effective_level = if is_holoview_target(metadata.target()) {
            level
        } else {
            FOREIGN_LEVEL
        };
        metadata.level() <= &effective_level
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(ConsoleMakeWriter {
            buffer: console.clone(),
        });
    #[cfg(target_arch = "wasm32")]
    let fmt_layer = fmt_layer.without_time();

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter_layer))
        .init();

    (console, log_level_state)
}

fn is_holoview_target(target: &str) -> bool {
    target.starts_with("holoview")
}

pub(crate) fn level_filter_to_u8(level: LevelFilter) -> u8 {
    match level {
        LevelFilter::OFF => 0,
        LevelFilter::ERROR => 1,
        LevelFilter::WARN => 2,
        LevelFilter::INFO => 3,
        LevelFilter::DEBUG => 4,
        LevelFilter::TRACE => 5,
    }
}

fn level_from_u8(value: u8) -> Level {
    match value {
        0 | 1 => Level::ERROR,
        2 => Level::WARN,
        3 => Level::INFO,
        4 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

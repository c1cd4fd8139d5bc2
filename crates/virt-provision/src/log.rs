//! Console and transcript logging.

use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;

/// Current timestamp in RFC3339 format with milliseconds.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

struct Rfc3339;

impl FormatTime for Rfc3339 {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "[{}]", timestamp())
    }
}

/// Open the transcript for appending, creating it owner-only (0600).
pub fn open_transcript(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600)
        .open(path)
}

/// Install the global subscriber.
///
/// The console honours `RUST_LOG` (default `info`); the transcript always
/// records debug. If the transcript cannot be opened, only the console logs.
pub fn init(transcript: &Path) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = tracing_subscriber::fmt::layer()
        .with_timer(Rfc3339)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .with_filter(console_filter);

    let (file_layer, open_error) = match open_transcript(transcript) {
        Ok(file) => {
            let layer = tracing_subscriber::fmt::layer()
                .with_timer(Rfc3339)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::DEBUG);
            (Some(layer), None)
        }
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();

    match open_error {
        Some(e) => tracing::warn!(
            "cannot open log file {}: {e}; logging to console only",
            transcript.display()
        ),
        None => tracing::debug!(path = %transcript.display(), "transcript opened"),
    }
}
